use crate::metrics::sync_instrument::InstrumentCore;
use crate::metrics::{LabelSet, Number, Result};
use crate::Context;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The callback wired to an observer instrument, tagged by value type.
pub(crate) enum AsyncRunner {
    I64(Box<dyn Fn(ObserverResult<i64>) -> Result<()> + Send + Sync>),
    F64(Box<dyn Fn(ObserverResult<f64>) -> Result<()> + Send + Sync>),
}

impl AsyncRunner {
    /// Run the callback once, handing it a fresh observation surface for
    /// the current collection cycle.
    pub(crate) fn run(&self, instrument: &Arc<InstrumentCore>) -> Result<()> {
        match self {
            AsyncRunner::I64(run) => run(ObserverResult::new(instrument.clone())),
            AsyncRunner::F64(run) => run(ObserverResult::new(instrument.clone())),
        }
    }
}

impl fmt::Debug for AsyncRunner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsyncRunner::I64(_) => f.write_str("AsyncRunner::I64"),
            AsyncRunner::F64(_) => f.write_str("AsyncRunner::F64"),
        }
    }
}

/// An observer instrument together with its registered callback.
#[derive(Debug)]
pub(crate) struct AsyncInstrument {
    core: Arc<InstrumentCore>,
    runner: AsyncRunner,
}

impl AsyncInstrument {
    pub(crate) fn new(core: Arc<InstrumentCore>, runner: AsyncRunner) -> Self {
        AsyncInstrument { core, runner }
    }

    pub(crate) fn core(&self) -> &Arc<InstrumentCore> {
        &self.core
    }

    /// Run the callback to capture this cycle's observations.
    pub(crate) fn observe(&self) -> Result<()> {
        self.runner.run(&self.core)
    }
}

/// The observation surface handed to an observer callback during
/// collection. The callback reports the current value of each label set it
/// knows about; values observed outside a collection cycle do not exist.
pub struct ObserverResult<T> {
    instrument: Arc<InstrumentCore>,
    _marker: PhantomData<T>,
}

impl<T> ObserverResult<T>
where
    T: Into<Number>,
{
    fn new(instrument: Arc<InstrumentCore>) -> Self {
        ObserverResult {
            instrument,
            _marker: PhantomData,
        }
    }

    /// Report the current value for the given label set.
    pub fn observe(&self, value: T, labels: &LabelSet) -> Result<()> {
        self.instrument
            .record_one(&Context::new(), value.into(), labels)
    }
}

impl<T> fmt::Debug for ObserverResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_fmt(format_args!(
            "ObserverResult<{}>",
            std::any::type_name::<T>()
        ))
    }
}
