use crate::metrics::aggregators::Aggregator;
use crate::metrics::sync_instrument::InstrumentCore;
use crate::metrics::{
    Descriptor, InstrumentKind, LabelSet, Measurement, Meter, Number, NumberKind, Result, Unit,
};
use crate::Context;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A distribution instrument that records individual values, positive or
/// negative, and aggregates them as a min-max-sum-count summary per label
/// set.
#[derive(Clone)]
pub struct Measure<T> {
    instrument: Arc<InstrumentCore>,
    _marker: PhantomData<T>,
}

impl<T> Measure<T>
where
    T: Into<Number>,
{
    pub(crate) fn new(instrument: Arc<InstrumentCore>) -> Self {
        Measure {
            instrument,
            _marker: PhantomData,
        }
    }

    /// Record `value` against the series identified by `labels`.
    pub fn record(&self, cx: &Context, value: T, labels: &LabelSet) -> Result<()> {
        self.instrument.record_one(cx, value.into(), labels)
    }

    /// Bind this measure to one label set, resolving the series once so
    /// repeated recordings skip the lookup.
    pub fn bind(&self, labels: &LabelSet) -> BoundMeasure<T> {
        BoundMeasure {
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

impl<T> fmt::Debug for Measure<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!("Measure<{}>", std::any::type_name::<T>()))
    }
}

/// A measure bound to one label set.
///
/// The handle keeps its series alive, so the series continues to export on
/// cycles where no recordings occur.
#[derive(Clone)]
pub struct BoundMeasure<T> {
    instrument: Arc<InstrumentCore>,
    aggregator: Arc<Aggregator>,
    _marker: PhantomData<T>,
}

impl<T> BoundMeasure<T>
where
    T: Into<Number>,
{
    /// Record `value` against the bound series.
    pub fn record(&self, cx: &Context, value: T) -> Result<()> {
        self.instrument
            .record_to(cx, value.into(), &self.aggregator)
    }
}

impl<T> fmt::Debug for BoundMeasure<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "BoundMeasure<{}>",
            std::any::type_name::<T>()
        ))
    }
}

/// Configuration for building a measure.
#[derive(Debug)]
pub struct MeasureBuilder<'a, T> {
    meter: &'a Meter,
    descriptor: Descriptor,
    _marker: PhantomData<T>,
}

impl<'a, T> MeasureBuilder<'a, T>
where
    T: Into<Number>,
{
    pub(crate) fn new(meter: &'a Meter, name: String, number_kind: NumberKind) -> Self {
        MeasureBuilder {
            meter,
            descriptor: Descriptor::new(
                name,
                meter.namespace().to_string(),
                InstrumentKind::Measure,
                number_kind,
            ),
            _marker: PhantomData,
        }
    }

    /// Set the description of this measure.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.descriptor.set_description(description.into());
        self
    }

    /// Set the unit of this measure.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.descriptor.set_unit(unit);
        self
    }

    /// Create the measure, registering it with the meter.
    pub fn try_init(self) -> Result<Measure<T>> {
        self.meter
            .new_sync_instrument(self.descriptor)
            .map(Measure::new)
    }

    /// Create the measure, registering it with the meter.
    ///
    /// # Panics
    ///
    /// Panics if registration fails, e.g. when the name is invalid or
    /// already taken by an instrument of a different kind. Use
    /// [`try_init`](MeasureBuilder::try_init) to handle the error instead.
    pub fn init(self) -> Measure<T> {
        self.try_init().unwrap()
    }
}
