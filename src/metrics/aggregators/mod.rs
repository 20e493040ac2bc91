//! Metric aggregation algorithms.

use crate::metrics::export::MetricData;
use crate::metrics::{
    Descriptor, InstrumentKind, LabelSet, MetricsError, Number, NumberKind, Result,
};
use crate::Context;

mod last_value;
mod min_max_sum_count;
mod sum;

pub use last_value::{last_value, LastValueAggregator};
pub use min_max_sum_count::{min_max_sum_count, MinMaxSumCountAggregator};
pub use sum::{sum, SumAggregator};

/// RangeTest is a common routine for testing for valid input values. This
/// rejects NaN values. This rejects negative values when the metric
/// instrument does not support negative values, which includes the
/// monotonic instruments: counters and sum observers.
pub fn range_test(number: &Number, descriptor: &Descriptor) -> Result<()> {
    if descriptor.number_kind() == &NumberKind::F64 && number.is_nan() {
        return Err(MetricsError::NaNInput);
    }

    if descriptor.instrument_kind().monotonic() && number.is_negative(descriptor.number_kind()) {
        return Err(MetricsError::NegativeInput);
    }
    Ok(())
}

/// Aggregator implements a specific aggregation behavior, i.e., a behavior
/// to track a sequence of updates to an instrument. Sum-only instruments
/// commonly use a simple Sum aggregator, the distribution instruments
/// (Measure, ValueObserver) track min-max-sum-count, and sum-style
/// observers keep the total most recently reported by their callback.
///
/// The variant is selected once, at instrument creation, from the
/// instrument's declared kind. Update calls may be made concurrently.
#[derive(Debug)]
pub enum Aggregator {
    /// Tracks the running total of recorded values.
    Sum(SumAggregator),
    /// Keeps the most recent observation.
    LastValue(LastValueAggregator),
    /// Tracks sum, count, min, and max of recorded values together.
    MinMaxSumCount(MinMaxSumCountAggregator),
}

impl Aggregator {
    /// The aggregator for instruments of the given kind.
    pub fn for_kind(kind: &InstrumentKind) -> Aggregator {
        match kind {
            InstrumentKind::Counter => Aggregator::Sum(sum()),
            InstrumentKind::SumObserver => Aggregator::LastValue(last_value()),
            InstrumentKind::Measure | InstrumentKind::ValueObserver => {
                Aggregator::MinMaxSumCount(min_max_sum_count())
            }
        }
    }

    /// Update receives a new measured value and incorporates it into the
    /// aggregation. The correlation token is accepted for pass-through only.
    pub fn update_with_context(
        &self,
        cx: &Context,
        number: &Number,
        descriptor: &Descriptor,
    ) -> Result<()> {
        match self {
            Aggregator::Sum(agg) => agg.update_with_context(cx, number, descriptor),
            Aggregator::LastValue(agg) => agg.update_with_context(cx, number, descriptor),
            Aggregator::MinMaxSumCount(agg) => agg.update_with_context(cx, number, descriptor),
        }
    }

    /// Update without an explicit correlation token.
    pub fn update(&self, number: &Number, descriptor: &Descriptor) -> Result<()> {
        self.update_with_context(&Context::new(), number, descriptor)
    }

    /// The series data for this aggregator, or `None` when no update has
    /// ever been received.
    pub fn snapshot(&self, labels: &LabelSet) -> Result<Option<MetricData>> {
        match self {
            Aggregator::Sum(agg) => Ok(agg.snapshot(labels)),
            Aggregator::LastValue(agg) => agg.snapshot(labels),
            Aggregator::MinMaxSumCount(agg) => agg.snapshot(labels),
        }
    }
}
