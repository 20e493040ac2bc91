use crate::metrics::aggregators::{self, Aggregator};
use crate::metrics::export::Metric;
use crate::metrics::{Descriptor, LabelSet, Number, Result};
use crate::Context;
use dashmap::DashMap;
use std::sync::Arc;

/// The shared state behind every instrument handle: the instrument's
/// description plus one aggregator per distinct label set.
#[derive(Debug)]
pub(crate) struct InstrumentCore {
    descriptor: Descriptor,
    series: DashMap<LabelSet, Arc<Aggregator>>,
}

impl InstrumentCore {
    pub(crate) fn new(descriptor: Descriptor) -> Self {
        InstrumentCore {
            descriptor,
            series: DashMap::new(),
        }
    }

    pub(crate) fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The aggregator tracking `labels`, created on first use. When two
    /// threads race to create a series, the first insert wins and both
    /// receive the same aggregator.
    pub(crate) fn aggregator_for(&self, labels: &LabelSet) -> Arc<Aggregator> {
        if let Some(existing) = self.series.get(labels) {
            return existing.value().clone();
        }

        self.series
            .entry(labels.clone())
            .or_insert_with(|| Arc::new(Aggregator::for_kind(self.descriptor.instrument_kind())))
            .value()
            .clone()
    }

    /// Validate and record one value against the series for `labels`.
    pub(crate) fn record_one(&self, cx: &Context, number: Number, labels: &LabelSet) -> Result<()> {
        self.record_to(cx, number, &self.aggregator_for(labels))
    }

    /// Validate and record one value against an already-bound aggregator.
    pub(crate) fn record_to(
        &self,
        cx: &Context,
        number: Number,
        aggregator: &Aggregator,
    ) -> Result<()> {
        aggregators::range_test(&number, &self.descriptor)?;
        aggregator.update_with_context(cx, &number, &self.descriptor)
    }

    /// Snapshot every series that has received at least one update, or
    /// `None` when the instrument has nothing to report this cycle.
    pub(crate) fn snapshot(&self) -> Result<Option<Metric>> {
        let mut data = Vec::new();
        for entry in self.series.iter() {
            if let Some(point) = entry.value().snapshot(entry.key())? {
                data.push(point);
            }
        }

        if data.is_empty() {
            return Ok(None);
        }
        Ok(Some(Metric::new(self.descriptor.clone(), data)))
    }
}

/// A value staged for [`Meter::record_batch`](crate::metrics::Meter::record_batch),
/// pairing an instrument with the number to record against it.
#[derive(Debug)]
pub struct Measurement {
    instrument: Arc<InstrumentCore>,
    number: Number,
}

impl Measurement {
    pub(crate) fn new(instrument: Arc<InstrumentCore>, number: Number) -> Self {
        Measurement { instrument, number }
    }

    pub(crate) fn into_parts(self) -> (Arc<InstrumentCore>, Number) {
        (self.instrument, self.number)
    }
}
