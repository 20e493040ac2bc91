//! Metrics export types.

use crate::metrics::{Descriptor, LabelSet, Number, Result};
use std::fmt;

/// MetricProcessor receives the batch of aggregated metric data produced by
/// a meter's collection cycle.
///
/// Implementations forward, transform, or store the batch. A processor is
/// called exactly once per collected meter, even when that meter produced
/// no data, and must be safe to call from multiple threads.
pub trait MetricProcessor: fmt::Debug + Send + Sync {
    /// Process the batch for one collection cycle of one meter.
    fn process(&self, batch: Vec<Metric>) -> Result<()>;
}

/// A collected metric: one instrument's descriptor together with the data
/// for every label set recorded against it.
#[derive(Clone, Debug)]
pub struct Metric {
    descriptor: Descriptor,
    data: Vec<MetricData>,
}

impl Metric {
    pub(crate) fn new(descriptor: Descriptor, data: Vec<MetricData>) -> Self {
        Metric { descriptor, data }
    }

    /// The instrument name.
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// The name of the meter that produced this metric.
    pub fn namespace(&self) -> &str {
        self.descriptor.namespace()
    }

    /// The full instrument description.
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Aggregated data, one entry per label set.
    pub fn data(&self) -> &[MetricData] {
        &self.data
    }
}

/// The aggregated value of one series, determined by the kind of aggregator
/// the instrument uses.
#[derive(Clone, Debug)]
pub enum MetricData {
    /// A running total, produced by counters and sum-style observers.
    Sum {
        /// The label set identifying this series.
        labels: LabelSet,
        /// The cumulative total recorded since the instrument was created.
        sum: Number,
    },
    /// A value distribution, produced by measures and value observers.
    Summary {
        /// The label set identifying this series.
        labels: LabelSet,
        /// The number of recorded values.
        count: u64,
        /// The total of all recorded values.
        sum: Number,
        /// The smallest recorded value.
        min: Number,
        /// The largest recorded value.
        max: Number,
    },
}

impl MetricData {
    /// The label set identifying this series.
    pub fn labels(&self) -> &LabelSet {
        match self {
            MetricData::Sum { labels, .. } => labels,
            MetricData::Summary { labels, .. } => labels,
        }
    }
}
