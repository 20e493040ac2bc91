use crate::metrics::async_instrument::{AsyncInstrument, AsyncRunner};
use crate::metrics::export::{Metric, MetricProcessor};
use crate::metrics::sync_instrument::InstrumentCore;
use crate::metrics::{
    CounterBuilder, Descriptor, LabelSet, MeasureBuilder, Measurement, MetricsError, NumberKind,
    ObserverResult, Result, SumObserverBuilder, ValueObserverBuilder,
};
use crate::{metron_debug, metron_warn, Context};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

// maximum length of instrument name
const INSTRUMENT_NAME_MAX_LENGTH: usize = 255;
// maximum length of instrument unit name
const INSTRUMENT_UNIT_NAME_MAX_LENGTH: usize = 63;
const INSTRUMENT_NAME_ALLOWED_NON_ALPHANUMERIC_CHARS: [char; 4] = ['_', '.', '-', '/'];

// instrument validation error strings
const INSTRUMENT_NAME_EMPTY: &str = "instrument name must be non-empty";
const INSTRUMENT_NAME_LENGTH: &str = "instrument name must be less than 256 characters";
const INSTRUMENT_NAME_INVALID_CHAR: &str =
    "characters in instrument name must be ASCII and belong to the alphanumeric characters, '_', '.', '-' and '/'";
const INSTRUMENT_NAME_FIRST_ALPHABETIC: &str =
    "instrument name must start with an alphabetic character";
const INSTRUMENT_UNIT_LENGTH: &str = "instrument unit must be less than 64 characters";
const INSTRUMENT_UNIT_INVALID_CHAR: &str = "characters in instrument unit must be ASCII";

/// Handles the creation and coordination of all metric instruments within
/// one namespace.
///
/// Instrument names are unique within a meter: requesting a name a second
/// time with the same kinds returns the existing instrument, while a
/// conflicting kind is refused. Meters are cheap to clone and clones share
/// the same instruments.
#[derive(Clone)]
pub struct Meter {
    core: Arc<MeterCore>,
}

impl Meter {
    pub(crate) fn new(namespace: String, processor: Arc<dyn MetricProcessor>) -> Self {
        Meter {
            core: Arc::new(MeterCore {
                namespace,
                processor,
                instruments: Mutex::new(InstrumentRegistry::default()),
                collect_lock: Mutex::new(()),
            }),
        }
    }

    /// The namespace all of this meter's instruments report under.
    pub fn namespace(&self) -> &str {
        &self.core.namespace
    }

    /// Creates a new `i64` counter instrument builder with the given name.
    pub fn i64_counter<T>(&self, name: T) -> CounterBuilder<'_, i64>
    where
        T: Into<String>,
    {
        CounterBuilder::new(self, name.into(), NumberKind::I64)
    }

    /// Creates a new `f64` counter instrument builder with the given name.
    pub fn f64_counter<T>(&self, name: T) -> CounterBuilder<'_, f64>
    where
        T: Into<String>,
    {
        CounterBuilder::new(self, name.into(), NumberKind::F64)
    }

    /// Creates a new `i64` measure instrument builder with the given name.
    pub fn i64_measure<T>(&self, name: T) -> MeasureBuilder<'_, i64>
    where
        T: Into<String>,
    {
        MeasureBuilder::new(self, name.into(), NumberKind::I64)
    }

    /// Creates a new `f64` measure instrument builder with the given name.
    pub fn f64_measure<T>(&self, name: T) -> MeasureBuilder<'_, f64>
    where
        T: Into<String>,
    {
        MeasureBuilder::new(self, name.into(), NumberKind::F64)
    }

    /// Creates a new `i64` sum observer instrument builder with the given
    /// name and callback.
    ///
    /// The callback runs once per collection cycle and reports the current
    /// cumulative total per label set.
    pub fn i64_sum_observer<T, F>(&self, name: T, callback: F) -> SumObserverBuilder<'_, i64>
    where
        T: Into<String>,
        F: Fn(ObserverResult<i64>) -> Result<()> + Send + Sync + 'static,
    {
        SumObserverBuilder::new(
            self,
            name.into(),
            AsyncRunner::I64(Box::new(callback)),
            NumberKind::I64,
        )
    }

    /// Creates a new `f64` sum observer instrument builder with the given
    /// name and callback.
    ///
    /// The callback runs once per collection cycle and reports the current
    /// cumulative total per label set.
    pub fn f64_sum_observer<T, F>(&self, name: T, callback: F) -> SumObserverBuilder<'_, f64>
    where
        T: Into<String>,
        F: Fn(ObserverResult<f64>) -> Result<()> + Send + Sync + 'static,
    {
        SumObserverBuilder::new(
            self,
            name.into(),
            AsyncRunner::F64(Box::new(callback)),
            NumberKind::F64,
        )
    }

    /// Creates a new `i64` value observer instrument builder with the given
    /// name and callback.
    ///
    /// The callback runs once per collection cycle and reports individual
    /// values per label set.
    pub fn i64_value_observer<T, F>(&self, name: T, callback: F) -> ValueObserverBuilder<'_, i64>
    where
        T: Into<String>,
        F: Fn(ObserverResult<i64>) -> Result<()> + Send + Sync + 'static,
    {
        ValueObserverBuilder::new(
            self,
            name.into(),
            AsyncRunner::I64(Box::new(callback)),
            NumberKind::I64,
        )
    }

    /// Creates a new `f64` value observer instrument builder with the given
    /// name and callback.
    ///
    /// The callback runs once per collection cycle and reports individual
    /// values per label set.
    pub fn f64_value_observer<T, F>(&self, name: T, callback: F) -> ValueObserverBuilder<'_, f64>
    where
        T: Into<String>,
        F: Fn(ObserverResult<f64>) -> Result<()> + Send + Sync + 'static,
    {
        ValueObserverBuilder::new(
            self,
            name.into(),
            AsyncRunner::F64(Box::new(callback)),
            NumberKind::F64,
        )
    }

    /// Record a batch of measurements against a single label set.
    ///
    /// Recording stops at the first value an instrument rejects; values
    /// already recorded stay recorded.
    pub fn record_batch(
        &self,
        cx: &Context,
        labels: &LabelSet,
        measurements: Vec<Measurement>,
    ) -> Result<()> {
        for measurement in measurements {
            let (instrument, number) = measurement.into_parts();
            instrument.record_one(cx, number, labels)?;
        }
        Ok(())
    }

    /// Run one collection cycle: invoke every observer callback, snapshot
    /// every instrument that has data, and hand the resulting batch to the
    /// metric processor.
    ///
    /// The processor is called exactly once per cycle, even when the batch
    /// is empty. Errors from callbacks, snapshots, and the processor do not
    /// stop the cycle; the first one is returned after the cycle completes.
    /// An observer callback must not itself trigger collection.
    pub fn collect(&self) -> Result<()> {
        self.core.collect()
    }

    pub(crate) fn new_sync_instrument(&self, descriptor: Descriptor) -> Result<Arc<InstrumentCore>> {
        self.core.register_sync(descriptor)
    }

    pub(crate) fn new_async_instrument(
        &self,
        descriptor: Descriptor,
        runner: AsyncRunner,
    ) -> Result<Arc<InstrumentCore>> {
        self.core.register_async(descriptor, runner)
    }
}

impl fmt::Debug for Meter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Meter")
            .field("namespace", &self.core.namespace)
            .finish()
    }
}

struct MeterCore {
    namespace: String,
    processor: Arc<dyn MetricProcessor>,
    instruments: Mutex<InstrumentRegistry>,
    // Serializes collection cycles so concurrent collect calls cannot
    // interleave their processor batches.
    collect_lock: Mutex<()>,
}

impl MeterCore {
    fn register_sync(&self, descriptor: Descriptor) -> Result<Arc<InstrumentCore>> {
        validate_instrument_name(descriptor.name())?;
        validate_instrument_unit(descriptor.unit())?;

        let mut instruments = self.instruments.lock()?;
        if let Some(existing) = instruments.find_compatible(&descriptor)? {
            return Ok(existing.core().clone());
        }

        let core = Arc::new(InstrumentCore::new(descriptor));
        instruments.insert(InstrumentEntry::Sync(core.clone()));
        Ok(core)
    }

    fn register_async(
        &self,
        descriptor: Descriptor,
        runner: AsyncRunner,
    ) -> Result<Arc<InstrumentCore>> {
        validate_instrument_name(descriptor.name())?;
        validate_instrument_unit(descriptor.unit())?;

        let mut instruments = self.instruments.lock()?;
        if let Some(existing) = instruments.find_compatible(&descriptor)? {
            // The first registration's callback stays in place.
            return Ok(existing.core().clone());
        }

        let core = Arc::new(InstrumentCore::new(descriptor));
        instruments.insert(InstrumentEntry::Async(Arc::new(AsyncInstrument::new(
            core.clone(),
            runner,
        ))));
        Ok(core)
    }

    fn collect(&self) -> Result<()> {
        let _guard = self.collect_lock.lock()?;

        // Hold the instrument lock only long enough to clone the entry
        // list. Callbacks are free to register new instruments; those show
        // up in the next cycle.
        let entries = self.instruments.lock()?.entries.clone();

        let mut first_error = None;

        for entry in &entries {
            if let InstrumentEntry::Async(instrument) = entry {
                if let Err(err) = instrument.observe() {
                    metron_warn!(
                        name: "observer_callback_failure",
                        instrument = instrument.core().descriptor().name(),
                        error = err.to_string()
                    );
                    first_error.get_or_insert(err);
                }
            }
        }

        let mut batch = Vec::new();
        for entry in &entries {
            match entry.core().snapshot() {
                Ok(Some(metric)) => batch.push(metric),
                Ok(None) => {}
                Err(err) => {
                    first_error.get_or_insert(err);
                }
            }
        }

        metron_debug!(
            name: "meter_collect",
            namespace = self.namespace.as_str(),
            batch_size = batch.len()
        );

        if let Err(err) = self.process(batch) {
            first_error.get_or_insert(err);
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn process(&self, batch: Vec<Metric>) -> Result<()> {
        self.processor.process(batch)
    }
}

#[derive(Default)]
struct InstrumentRegistry {
    entries: Vec<InstrumentEntry>,
    by_name: HashMap<String, usize>,
}

impl InstrumentRegistry {
    /// The entry already registered under this descriptor's name, if any.
    ///
    /// The first registration of a name fixes its instrument and number
    /// kinds; a later request under the same name must agree with both or
    /// is refused.
    fn find_compatible(&self, descriptor: &Descriptor) -> Result<Option<&InstrumentEntry>> {
        match self.by_name.get(descriptor.name()) {
            Some(&index) => {
                let entry = &self.entries[index];
                let existing = entry.core().descriptor();
                if existing.instrument_kind() == descriptor.instrument_kind()
                    && existing.number_kind() == descriptor.number_kind()
                {
                    Ok(Some(entry))
                } else {
                    Err(MetricsError::MetricKindMismatch(format!(
                        "metric {} registered as a {:?} {:?}",
                        descriptor.name(),
                        existing.number_kind(),
                        existing.instrument_kind(),
                    )))
                }
            }
            None => Ok(None),
        }
    }

    fn insert(&mut self, entry: InstrumentEntry) {
        let name = entry.core().descriptor().name().to_string();
        self.by_name.insert(name, self.entries.len());
        self.entries.push(entry);
    }
}

#[derive(Clone)]
enum InstrumentEntry {
    Sync(Arc<InstrumentCore>),
    Async(Arc<AsyncInstrument>),
}

impl InstrumentEntry {
    fn core(&self) -> &Arc<InstrumentCore> {
        match self {
            InstrumentEntry::Sync(core) => core,
            InstrumentEntry::Async(instrument) => instrument.core(),
        }
    }
}

fn validate_instrument_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(MetricsError::InvalidInstrumentConfiguration(
            INSTRUMENT_NAME_EMPTY,
        ));
    }
    if name.len() > INSTRUMENT_NAME_MAX_LENGTH {
        return Err(MetricsError::InvalidInstrumentConfiguration(
            INSTRUMENT_NAME_LENGTH,
        ));
    }
    if name.starts_with(|c: char| !c.is_ascii_alphabetic()) {
        return Err(MetricsError::InvalidInstrumentConfiguration(
            INSTRUMENT_NAME_FIRST_ALPHABETIC,
        ));
    }
    if name.contains(|c: char| {
        !c.is_ascii_alphanumeric() && !INSTRUMENT_NAME_ALLOWED_NON_ALPHANUMERIC_CHARS.contains(&c)
    }) {
        return Err(MetricsError::InvalidInstrumentConfiguration(
            INSTRUMENT_NAME_INVALID_CHAR,
        ));
    }
    Ok(())
}

fn validate_instrument_unit(unit: Option<&str>) -> Result<()> {
    if let Some(unit) = unit {
        if unit.len() > INSTRUMENT_UNIT_NAME_MAX_LENGTH {
            return Err(MetricsError::InvalidInstrumentConfiguration(
                INSTRUMENT_UNIT_LENGTH,
            ));
        }
        if unit.contains(|c: char| !c.is_ascii()) {
            return Err(MetricsError::InvalidInstrumentConfiguration(
                INSTRUMENT_UNIT_INVALID_CHAR,
            ));
        }
    }
    Ok(())
}
