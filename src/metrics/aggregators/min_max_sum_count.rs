use crate::metrics::export::MetricData;
use crate::metrics::{Descriptor, LabelSet, Number, Result};
use crate::Context;
use std::cmp::Ordering;
use std::sync::Mutex;

/// Create a new min-max-sum-count aggregator.
pub fn min_max_sum_count() -> MinMaxSumCountAggregator {
    MinMaxSumCountAggregator::default()
}

/// An aggregator for distribution-style instruments that tracks the sum,
/// count, minimum, and maximum of recorded values as one synchronized
/// state, so a snapshot never mixes fields from different updates.
#[derive(Debug, Default)]
pub struct MinMaxSumCountAggregator {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    state: Option<State>,
}

#[derive(Debug)]
struct State {
    count: u64,
    sum: Number,
    min: Number,
    max: Number,
}

impl MinMaxSumCountAggregator {
    pub(crate) fn update_with_context(
        &self,
        _cx: &Context,
        number: &Number,
        descriptor: &Descriptor,
    ) -> Result<()> {
        self.inner
            .lock()
            .and_then(|mut inner| {
                if let Some(state) = &mut inner.state {
                    let kind = descriptor.number_kind();

                    state.count = state.count.saturating_add(1);
                    state.sum = state.sum.saturating_add(kind, number);
                    if number.partial_cmp(kind, &state.min) == Some(Ordering::Less) {
                        state.min = number.clone();
                    }
                    if number.partial_cmp(kind, &state.max) == Some(Ordering::Greater) {
                        state.max = number.clone();
                    }
                } else {
                    inner.state = Some(State {
                        count: 1,
                        sum: number.clone(),
                        min: number.clone(),
                        max: number.clone(),
                    })
                }

                Ok(())
            })
            .map_err(From::from)
    }

    pub(crate) fn snapshot(&self, labels: &LabelSet) -> Result<Option<MetricData>> {
        self.inner
            .lock()
            .map(|inner| {
                inner.state.as_ref().map(|state| MetricData::Summary {
                    labels: labels.clone(),
                    count: state.count,
                    sum: state.sum.clone(),
                    min: state.min.clone(),
                    max: state.max.clone(),
                })
            })
            .map_err(From::from)
    }
}
