use crate::metrics::async_instrument::AsyncRunner;
use crate::metrics::sync_instrument::InstrumentCore;
use crate::metrics::{Descriptor, InstrumentKind, Meter, NumberKind, Result, Unit};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// A monotonic instrument that observes a precomputed cumulative total on
/// every collection cycle.
///
/// All reporting happens through the callback registered at build time; the
/// handle itself records nothing.
#[derive(Clone)]
pub struct SumObserver<T> {
    instrument: Arc<InstrumentCore>,
    _marker: PhantomData<T>,
}

impl<T> SumObserver<T> {
    /// The instrument's description.
    pub fn descriptor(&self) -> &Descriptor {
        self.instrument.descriptor()
    }
}

impl<T> fmt::Debug for SumObserver<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "SumObserver<{}>",
            std::any::type_name::<T>()
        ))
    }
}

/// Configuration for building a sum observer.
#[derive(Debug)]
pub struct SumObserverBuilder<'a, T> {
    meter: &'a Meter,
    descriptor: Descriptor,
    runner: AsyncRunner,
    _marker: PhantomData<T>,
}

impl<'a, T> SumObserverBuilder<'a, T> {
    pub(crate) fn new(
        meter: &'a Meter,
        name: String,
        runner: AsyncRunner,
        number_kind: NumberKind,
    ) -> Self {
        SumObserverBuilder {
            meter,
            descriptor: Descriptor::new(
                name,
                meter.namespace().to_string(),
                InstrumentKind::SumObserver,
                number_kind,
            ),
            runner,
            _marker: PhantomData,
        }
    }

    /// Set the description of this sum observer.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.descriptor.set_description(description.into());
        self
    }

    /// Set the unit of this sum observer.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.descriptor.set_unit(unit);
        self
    }

    /// Create the sum observer, registering it and its callback with the
    /// meter.
    pub fn try_init(self) -> Result<SumObserver<T>> {
        let instrument = self
            .meter
            .new_async_instrument(self.descriptor, self.runner)?;

        Ok(SumObserver {
            instrument,
            _marker: PhantomData,
        })
    }

    /// Create the sum observer, registering it and its callback with the
    /// meter.
    ///
    /// # Panics
    ///
    /// Panics if registration fails, e.g. when the name is invalid or
    /// already taken by an instrument of a different kind. Use
    /// [`try_init`](SumObserverBuilder::try_init) to handle the error
    /// instead.
    pub fn init(self) -> SumObserver<T> {
        self.try_init().unwrap()
    }
}

/// An instrument that observes individual values, positive or negative, on
/// every collection cycle and aggregates them as a min-max-sum-count
/// summary per label set.
///
/// All reporting happens through the callback registered at build time; the
/// handle itself records nothing.
#[derive(Clone)]
pub struct ValueObserver<T> {
    instrument: Arc<InstrumentCore>,
    _marker: PhantomData<T>,
}

impl<T> ValueObserver<T> {
    /// The instrument's description.
    pub fn descriptor(&self) -> &Descriptor {
        self.instrument.descriptor()
    }
}

impl<T> fmt::Debug for ValueObserver<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "ValueObserver<{}>",
            std::any::type_name::<T>()
        ))
    }
}

/// Configuration for building a value observer.
#[derive(Debug)]
pub struct ValueObserverBuilder<'a, T> {
    meter: &'a Meter,
    descriptor: Descriptor,
    runner: AsyncRunner,
    _marker: PhantomData<T>,
}

impl<'a, T> ValueObserverBuilder<'a, T> {
    pub(crate) fn new(
        meter: &'a Meter,
        name: String,
        runner: AsyncRunner,
        number_kind: NumberKind,
    ) -> Self {
        ValueObserverBuilder {
            meter,
            descriptor: Descriptor::new(
                name,
                meter.namespace().to_string(),
                InstrumentKind::ValueObserver,
                number_kind,
            ),
            runner,
            _marker: PhantomData,
        }
    }

    /// Set the description of this value observer.
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.descriptor.set_description(description.into());
        self
    }

    /// Set the unit of this value observer.
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.descriptor.set_unit(unit);
        self
    }

    /// Create the value observer, registering it and its callback with the
    /// meter.
    pub fn try_init(self) -> Result<ValueObserver<T>> {
        let instrument = self
            .meter
            .new_async_instrument(self.descriptor, self.runner)?;

        Ok(ValueObserver {
            instrument,
            _marker: PhantomData,
        })
    }

    /// Create the value observer, registering it and its callback with the
    /// meter.
    ///
    /// # Panics
    ///
    /// Panics if registration fails, e.g. when the name is invalid or
    /// already taken by an instrument of a different kind. Use
    /// [`try_init`](ValueObserverBuilder::try_init) to handle the error
    /// instead.
    pub fn init(self) -> ValueObserver<T> {
        self.try_init().unwrap()
    }
}
