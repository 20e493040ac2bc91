//! Implements an in-process metrics aggregation engine.
//!
//! *[Supported Rust Versions](#supported-rust-versions)*
//!
//! # Overview
//!
//! Metron collects application measurements through typed instruments,
//! aggregates them per label set inside the process, and hands the
//! aggregated batches to a processor supplied at setup. Nothing leaves the
//! process unless that processor sends it somewhere.
//!
//! The pipeline has three layers:
//!
//! - **Instruments:** counters and measures record values as they happen;
//!   observers report values on demand through callbacks that run once per
//!   collection cycle. See the [`metrics`] module.
//! - **Aggregators:** every (instrument, label set) pair folds its updates
//!   into a running state, either a plain sum or a min-max-sum-count
//!   summary. State is cumulative from instrument creation and is never
//!   reset by collection.
//! - **Export:** a collection cycle snapshots every series that has data
//!   and calls the configured
//!   [`MetricProcessor`](crate::metrics::export::MetricProcessor) with one
//!   batch per meter. See the [`metrics::export`] module.
//!
//! ## Getting Started
//!
//! ```
//! use metron::metrics::export::{Metric, MetricProcessor};
//! use metron::metrics::{LabelSet, MeterFactory, Result};
//! use metron::{Context, KeyValue};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct StdoutProcessor;
//!
//! impl MetricProcessor for StdoutProcessor {
//!     fn process(&self, batch: Vec<Metric>) -> Result<()> {
//!         for metric in &batch {
//!             println!("{}/{}: {:?}", metric.namespace(), metric.name(), metric.data());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let factory = MeterFactory::builder()
//!         .with_processor(Arc::new(StdoutProcessor))
//!         .build()?;
//!     let meter = factory.meter("library1");
//!
//!     let request_count = meter.i64_counter("request.count").init();
//!     let labels = LabelSet::from_iter([KeyValue::new("verb", "GET")]);
//!     request_count.add(&Context::new(), 1, &labels)?;
//!
//!     factory.collect()
//! }
//! ```
//!
//! ## Crate Feature Flags
//!
//! The following crate feature flags are available:
//!
//! * `internal-logs`: Enables internal diagnostic logging through the
//!   `tracing` crate. Enabled by default.
//!
//! ## Supported Rust Versions
//!
//! Metron is built against the latest stable release. The minimum
//! supported version is 1.75. The current version is not guaranteed to
//! build on Rust versions earlier than the minimum supported version.
//!
//! The current stable Rust compiler and the three most recent minor versions
//! before it will always be supported. For example, if the current stable
//! compiler version is 1.49, the minimum supported version will not be
//! increased past 1.46, three minor versions prior. Increasing the minimum
//! supported compiler version is not considered a semver breaking change as
//! long as doing so complies with this policy.
#![warn(
    future_incompatible,
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    unreachable_pub,
    unused
)]
#![allow(clippy::needless_doctest_main)]
#![cfg_attr(
    docsrs,
    feature(doc_cfg, doc_auto_cfg),
    deny(rustdoc::broken_intra_doc_links)
)]
#![cfg_attr(test, deny(warnings))]

mod context;

pub use context::Context;

mod common;

pub use common::{Key, KeyValue, StringValue};

pub mod metrics;

mod internal_logging;

#[doc(hidden)]
#[cfg(feature = "internal-logs")]
pub mod _private {
    pub use tracing::{debug, error, info, warn};
}
