use crate::metrics::aggregators::Aggregator;
use crate::metrics::sync_instrument::InstrumentCore;
use crate::metrics::{
    Descriptor, InstrumentKind, LabelSet, Measurement, Meter, Number, NumberKind, Result, Unit,
};
use crate::Context;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A monotonic instrument that accumulates positive increments into a
/// running total per label set.
#[derive(Clone)]
pub struct Counter<T> {
    instrument: Arc<InstrumentCore>,
    _marker: PhantomData<T>,
}

impl<T> Counter<T>
where
    T: Into<Number>,
{
    pub(crate) fn new(instrument: Arc<InstrumentCore>) -> Self {
        Counter {
            instrument,
            _marker: PhantomData,
        }
    }

    /// Add `value` to the series identified by `labels`.
    ///
    /// Negative values are rejected with
    /// [`NegativeInput`](crate::metrics::MetricsError::NegativeInput) and
    /// leave the series unchanged.
    pub fn add(&self, cx: &Context, value: T, labels: &LabelSet) -> Result<()> {
        self.instrument.record_one(cx, value.into(), labels)
    }

    /// Bind this counter to one label set, resolving the series once so
    /// repeated additions skip the lookup.
    pub fn bind(&self, labels: &LabelSet) -> BoundCounter<T> {
        BoundCounter {
            aggregator: self.instrument.aggregator_for(labels),
            instrument: self.instrument.clone(),
            _marker: PhantomData,
        }
    }

    /// Stage `value` for [`Meter::record_batch`].
    pub fn measurement(&self, value: T) -> Measurement {
        Measurement::new(self.instrument.clone(), value.into())
    }
}

impl<T> fmt::Debug for Counter<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("Counter<{}>", std::any::type_name::<T>()))
    }
}

/// A counter bound to one label set.
///
/// The handle keeps its series alive, so the series continues to export on
/// cycles where no additions occur.
#[derive(Clone)]
pub struct BoundCounter<T> {
    instrument: Arc<InstrumentCore>,
    aggregator: Arc<Aggregator>,
    _marker: PhantomData<T>,
}

impl<T> BoundCounter<T>
where
    T: Into<Number>,
{
    /// Add `value` to the bound series.
    pub fn add(&self, cx: &Context, value: T) -> Result<()> {
        self.instrument
            .record_to(cx, value.into(), &self.aggregator)
    }
}

impl<T> fmt::Debug for BoundCounter<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "BoundCounter<{}>",
            std::any::type_name::<T>()
        ))
    }
}

/// Configuration for building a counter.
#[derive(Debug)]
pub struct CounterBuilder<'a, T> {
    meter: &'a Meter,
    descriptor: Descriptor,
    _marker: PhantomData<T>,
}

impl<'a, T> CounterBuilder<'a, T>
where
    T: Into<Number>,
{
    pub(crate) fn new(meter: &'a Meter, name: String, number_kind: NumberKind) -> Self {
        CounterBuilder {
            meter,
            descriptor: Descriptor::new(
                name,
                meter.namespace().to_string(),
                InstrumentKind::Counter,
                number_kind,
            ),
            _marker: PhantomData,
        }
    }

    /// Set the description of this counter.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.descriptor.set_description(description.into());
        self
    }

    /// Set the unit of this counter.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.descriptor.set_unit(unit);
        self
    }

    /// Create the counter, registering it with the meter.
    pub fn try_init(self) -> Result<Counter<T>> {
        self.meter
            .new_sync_instrument(self.descriptor)
            .map(Counter::new)
    }

    /// Create the counter, registering it with the meter.
    ///
    /// # Panics
    ///
    /// Panics if registration fails, e.g. when the name is invalid or
    /// already taken by an instrument of a different kind. Use
    /// [`try_init`](CounterBuilder::try_init) to handle the error instead.
    pub fn init(self) -> Counter<T> {
        self.try_init().unwrap()
    }
}
