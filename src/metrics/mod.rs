//! # Metrics
//!
//! An aggregation engine for application metrics: instruments record
//! values, per-label-set aggregators fold them into running state, and a
//! collection cycle snapshots that state into batches for a pluggable
//! processor.
//!
//! ## Pipeline
//!
//! A [`MeterFactory`] owns the [`MetricProcessor`](export::MetricProcessor)
//! and hands out one [`Meter`] per namespace. Meters create the
//! instruments:
//!
//! * [`Counter`]: a monotonic running total, recorded by the application.
//! * [`Measure`]: a value distribution, recorded by the application.
//! * [`SumObserver`]: a monotonic running total, reported by a callback
//!   once per collection cycle.
//! * [`ValueObserver`]: a value distribution, reported by a callback once
//!   per collection cycle.
//!
//! Series identity is the instrument plus a [`LabelSet`], with label order
//! canonicalized away. Totals are cumulative from instrument creation;
//! collection snapshots state but never resets it.

use std::result;
use std::sync::PoisonError;
use thiserror::Error;

mod async_instrument;
mod counter;
mod descriptor;
mod kind;
mod labels;
mod measure;
mod meter;
mod number;
mod observer;
mod registry;
mod sync_instrument;
mod unit;

pub mod aggregators;
pub mod export;

pub use async_instrument::ObserverResult;
pub use counter::{BoundCounter, Counter, CounterBuilder};
pub use descriptor::Descriptor;
pub use kind::InstrumentKind;
pub use labels::{Iter, LabelSet};
pub use measure::{BoundMeasure, Measure, MeasureBuilder};
pub use meter::Meter;
pub use number::{AtomicNumber, Number, NumberKind};
pub use observer::{SumObserver, SumObserverBuilder, ValueObserver, ValueObserverBuilder};
pub use registry::{MeterFactory, MeterFactoryBuilder};
pub use sync_instrument::Measurement;
pub use unit::Unit;

/// A specialized `Result` type for metric operations.
pub type Result<T> = result::Result<T, MetricsError>;

/// Errors returned by the metrics pipeline.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum MetricsError {
    /// Other errors not covered by a more specific variant.
    #[error("Metrics error: {0}")]
    Other(String),
    /// Invalid pipeline configuration, e.g. a factory without a processor.
    #[error("Config error {0}")]
    Config(String),
    /// A NaN value was offered to an `f64` instrument.
    #[error("NaN value is an invalid input")]
    NaNInput,
    /// A negative value was offered to a monotonic instrument.
    #[error("Negative value is out of range for this instrument")]
    NegativeInput,
    /// A name was requested again with a different instrument kind or
    /// number kind.
    #[error("A metric was already registered by this name with another kind or number type: {0}")]
    MetricKindMismatch(String),
    /// The instrument name or unit failed validation.
    #[error("Invalid instrument configuration: {0}")]
    InvalidInstrumentConfiguration(&'static str),
}

impl<T> From<PoisonError<T>> for MetricsError {
    fn from(err: PoisonError<T>) -> Self {
        MetricsError::Other(err.to_string())
    }
}
