use crate::metrics::export::MetricData;
use crate::metrics::{AtomicNumber, Descriptor, LabelSet, Number, Result};
use crate::Context;
use std::sync::atomic::{AtomicBool, Ordering};

/// Create a new sum aggregator.
pub fn sum() -> SumAggregator {
    SumAggregator::default()
}

/// An aggregator for counter-style instruments that maintains the running
/// total of recorded values as a single atomic word.
#[derive(Debug, Default)]
pub struct SumAggregator {
    value: AtomicNumber,
    updated: AtomicBool,
}

impl SumAggregator {
    /// The running total recorded so far.
    pub fn sum(&self) -> Result<Number> {
        Ok(self.value.load())
    }

    pub(crate) fn update_with_context(
        &self,
        _cx: &Context,
        number: &Number,
        descriptor: &Descriptor,
    ) -> Result<()> {
        self.value.fetch_add(descriptor.number_kind(), number);
        self.updated.store(true, Ordering::Release);
        Ok(())
    }

    pub(crate) fn snapshot(&self, labels: &LabelSet) -> Option<MetricData> {
        if !self.updated.load(Ordering::Acquire) {
            return None;
        }
        Some(MetricData::Sum {
            labels: labels.clone(),
            sum: self.value.load(),
        })
    }
}
