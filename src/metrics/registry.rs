use crate::metrics::export::MetricProcessor;
use crate::metrics::{Meter, MetricsError, Result};
use crate::metron_debug;
use std::sync::{Arc, Mutex, PoisonError};

/// Creates and tracks meters, one per namespace.
///
/// A factory is built with exactly one [`MetricProcessor`]; every meter it
/// creates reports to that processor. The factory is the root of the
/// pipeline, so dropping it (and all meters cloned from it) ends
/// collection.
#[derive(Debug)]
pub struct MeterFactory {
    processor: Arc<dyn MetricProcessor>,
    meters: Mutex<Vec<Meter>>,
}

impl MeterFactory {
    /// Start building a meter factory.
    pub fn builder() -> MeterFactoryBuilder {
        MeterFactoryBuilder::default()
    }

    /// The meter for `namespace`, created on first request.
    ///
    /// Repeated calls with the same namespace return handles to the same
    /// meter and its instruments.
    pub fn meter(&self, namespace: &str) -> Meter {
        // meter() has no error path; recover the table if a holder panicked.
        let mut meters = self.meters.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(meter) = meters.iter().find(|m| m.namespace() == namespace) {
            return meter.clone();
        }

        metron_debug!(name: "meter_created", namespace = namespace);
        let meter = Meter::new(namespace.to_string(), self.processor.clone());
        meters.push(meter.clone());
        meter
    }

    /// Run a collection cycle on every meter created by this factory, in
    /// creation order.
    ///
    /// Each meter's batch goes to the processor separately. Errors from
    /// individual meters do not stop the sweep; the first one is returned
    /// once every meter has been collected.
    pub fn collect(&self) -> Result<()> {
        let meters = self.meters.lock()?.clone();

        let mut first_error = None;
        for meter in &meters {
            if let Err(err) = meter.collect() {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Configuration for building a [`MeterFactory`].
#[derive(Debug, Default)]
pub struct MeterFactoryBuilder {
    processor: Option<Arc<dyn MetricProcessor>>,
}

impl MeterFactoryBuilder {
    /// Set the processor that receives every collected batch.
    pub fn with_processor(mut self, processor: Arc<dyn MetricProcessor>) -> Self {
        self.processor = Some(processor);
        self
    }

    /// Create the factory.
    ///
    /// Fails with [`MetricsError::Config`] when no processor was set.
    pub fn build(self) -> Result<MeterFactory> {
        let processor = self
            .processor
            .ok_or_else(|| MetricsError::Config("missing metric processor".into()))?;

        Ok(MeterFactory {
            processor,
            meters: Mutex::new(Vec::new()),
        })
    }
}
