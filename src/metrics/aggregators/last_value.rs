use crate::metrics::export::MetricData;
use crate::metrics::{Descriptor, LabelSet, Number, Result};
use crate::Context;
use std::sync::Mutex;

/// Create a new last-value aggregator.
pub fn last_value() -> LastValueAggregator {
    LastValueAggregator::default()
}

/// An aggregator that summarizes a set of updates as the last one made.
///
/// Sum-style observer callbacks report the current cumulative total on
/// every collection cycle, so the most recent observation is the value of
/// the series and earlier observations within a cycle are superseded.
#[derive(Debug, Default)]
pub struct LastValueAggregator {
    inner: Mutex<Option<Number>>,
}

impl LastValueAggregator {
    pub(crate) fn update_with_context(
        &self,
        _cx: &Context,
        number: &Number,
        _descriptor: &Descriptor,
    ) -> Result<()> {
        self.inner
            .lock()
            .and_then(|mut inner| {
                *inner = Some(number.clone());
                Ok(())
            })
            .map_err(From::from)
    }

    pub(crate) fn snapshot(&self, labels: &LabelSet) -> Result<Option<MetricData>> {
        self.inner
            .lock()
            .map(|inner| {
                inner.as_ref().map(|value| MetricData::Sum {
                    labels: labels.clone(),
                    sum: value.clone(),
                })
            })
            .map_err(From::from)
    }
}
