use metron::metrics::export::{Metric, MetricData, MetricProcessor};
use metron::metrics::{
    InstrumentKind, LabelSet, MeterFactory, MetricsError, NumberKind, Result, Unit,
};
use metron::{Context, KeyValue};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Default)]
struct TestProcessor {
    batches: Mutex<Vec<Vec<Metric>>>,
}

impl TestProcessor {
    fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }

    fn batches(&self) -> Vec<Vec<Metric>> {
        self.batches.lock().unwrap().clone()
    }

    fn last_batch(&self) -> Vec<Metric> {
        self.batches
            .lock()
            .unwrap()
            .last()
            .cloned()
            .unwrap_or_default()
    }
}

impl MetricProcessor for TestProcessor {
    fn process(&self, batch: Vec<Metric>) -> Result<()> {
        self.batches.lock().unwrap().push(batch);
        Ok(())
    }
}

#[derive(Debug)]
struct FailingProcessor;

impl MetricProcessor for FailingProcessor {
    fn process(&self, _batch: Vec<Metric>) -> Result<()> {
        Err(MetricsError::Other("processor offline".into()))
    }
}

fn test_pipeline() -> (Arc<TestProcessor>, MeterFactory) {
    let processor = Arc::new(TestProcessor::default());
    let factory = MeterFactory::builder()
        .with_processor(processor.clone())
        .build()
        .expect("processor configured");
    (processor, factory)
}

fn find_metric<'a>(batch: &'a [Metric], name: &str) -> Option<&'a Metric> {
    batch.iter().find(|metric| metric.name() == name)
}

fn sum_i64(metric: &Metric, labels: &LabelSet) -> Option<i64> {
    metric
        .data()
        .iter()
        .find(|data| data.labels() == labels)
        .map(|data| match data {
            MetricData::Sum { sum, .. } => sum.to_i64(&NumberKind::I64),
            MetricData::Summary { .. } => panic!("expected sum data"),
        })
}

fn sum_f64(metric: &Metric, labels: &LabelSet) -> Option<f64> {
    metric
        .data()
        .iter()
        .find(|data| data.labels() == labels)
        .map(|data| match data {
            MetricData::Sum { sum, .. } => sum.to_f64(&NumberKind::F64),
            MetricData::Summary { .. } => panic!("expected sum data"),
        })
}

fn summary_i64(metric: &Metric, labels: &LabelSet) -> Option<(u64, i64, i64, i64)> {
    metric
        .data()
        .iter()
        .find(|data| data.labels() == labels)
        .map(|data| match data {
            MetricData::Summary {
                count,
                sum,
                min,
                max,
                ..
            } => (
                *count,
                sum.to_i64(&NumberKind::I64),
                min.to_i64(&NumberKind::I64),
                max.to_i64(&NumberKind::I64),
            ),
            MetricData::Sum { .. } => panic!("expected summary data"),
        })
}

fn summary_f64(metric: &Metric, labels: &LabelSet) -> Option<(u64, f64, f64, f64)> {
    metric
        .data()
        .iter()
        .find(|data| data.labels() == labels)
        .map(|data| match data {
            MetricData::Summary {
                count,
                sum,
                min,
                max,
                ..
            } => (
                *count,
                sum.to_f64(&NumberKind::F64),
                min.to_f64(&NumberKind::F64),
                max.to_f64(&NumberKind::F64),
            ),
            MetricData::Sum { .. } => panic!("expected summary data"),
        })
}

#[test]
fn counter_totals_per_label_set() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let cx = Context::new();

    let v1 = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let v2 = LabelSet::from_iter([KeyValue::new("dim1", "value2")]);
    let v3 = LabelSet::from_iter([KeyValue::new("dim1", "value3")]);

    counter.add(&cx, 100, &v1).unwrap();
    counter.add(&cx, 10, &v1).unwrap();

    let bound = counter.bind(&v2);
    bound.add(&cx, 200).unwrap();

    counter.add(&cx, 10, &v3).unwrap();
    counter.add(&cx, 200, &v3).unwrap();

    meter.collect().unwrap();

    let batch = processor.last_batch();
    assert_eq!(batch.len(), 1);
    let metric = find_metric(&batch, "request.count").unwrap();
    assert_eq!(metric.namespace(), "library1");
    assert_eq!(metric.data().len(), 3);
    assert_eq!(sum_i64(metric, &v1), Some(110));
    assert_eq!(sum_i64(metric, &v2), Some(200));
    assert_eq!(sum_i64(metric, &v3), Some(210));
}

#[test]
fn measure_summarizes_each_label_set() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let recorder = meter.i64_measure("payload.size").init();
    let cx = Context::new();

    let v1 = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let v2 = LabelSet::from_iter([KeyValue::new("dim1", "value2")]);

    for value in [100, 10, 1] {
        recorder.record(&cx, value, &v1).unwrap();
    }
    for value in [20, 200] {
        recorder.record(&cx, value, &v2).unwrap();
    }

    meter.collect().unwrap();

    let batch = processor.last_batch();
    let metric = find_metric(&batch, "payload.size").unwrap();
    assert_eq!(summary_i64(metric, &v1), Some((3, 111, 1, 100)));
    assert_eq!(summary_i64(metric, &v2), Some((2, 220, 20, 200)));
}

#[test]
fn sum_observer_exports_last_observation_of_cycle() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let calls = Arc::new(AtomicUsize::new(0));
    let v1 = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let v2 = LabelSet::from_iter([KeyValue::new("dim1", "value2")]);

    let callback_calls = calls.clone();
    let (callback_v1, callback_v2) = (v1.clone(), v2.clone());
    let observer = meter
        .i64_sum_observer("queue.bytes.total", move |res| {
            let cycle = callback_calls.fetch_add(1, Ordering::SeqCst);
            if cycle == 0 {
                res.observe(10, &callback_v1)?;
                res.observe(20, &callback_v1)?;
                res.observe(30, &callback_v1)?;
                res.observe(100, &callback_v2)?;
                res.observe(200, &callback_v2)?;
                res.observe(300, &callback_v2)?;
            } else {
                res.observe(40, &callback_v1)?;
            }
            Ok(())
        })
        .init();
    assert_eq!(observer.descriptor().name(), "queue.bytes.total");

    // Callbacks run only as part of a collection cycle.
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    meter.collect().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "queue.bytes.total").unwrap();
    assert_eq!(metric.data().len(), 2);
    assert_eq!(sum_i64(metric, &v1), Some(30));
    assert_eq!(sum_i64(metric, &v2), Some(300));

    // A series the callback skips this cycle keeps its last observation.
    meter.collect().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "queue.bytes.total").unwrap();
    assert_eq!(sum_i64(metric, &v1), Some(40));
    assert_eq!(sum_i64(metric, &v2), Some(300));
}

#[test]
fn f64_sum_observer_exports_last_observation_of_cycle() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let v1 = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let v2 = LabelSet::from_iter([KeyValue::new("dim1", "value2")]);

    let (callback_v1, callback_v2) = (v1.clone(), v2.clone());
    let _observer = meter
        .f64_sum_observer("cpu.seconds.total", move |res| {
            res.observe(10.5, &callback_v1)?;
            res.observe(30.5, &callback_v1)?;
            res.observe(300.5, &callback_v2)
        })
        .init();

    meter.collect().unwrap();
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "cpu.seconds.total").unwrap();
    assert_eq!(sum_f64(metric, &v1), Some(30.5));
    assert_eq!(sum_f64(metric, &v2), Some(300.5));
}

#[test]
fn value_observer_accumulates_across_cycles() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let calls = Arc::new(AtomicUsize::new(0));
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    let callback_calls = calls.clone();
    let callback_labels = labels.clone();
    let _observer = meter
        .f64_value_observer("temperature", move |res| {
            let cycle = callback_calls.fetch_add(1, Ordering::SeqCst);
            if cycle == 0 {
                res.observe(30.5, &callback_labels)
            } else {
                res.observe(300.5, &callback_labels)
            }
        })
        .init();

    meter.collect().unwrap();
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "temperature").unwrap();
    assert_eq!(summary_f64(metric, &labels), Some((1, 30.5, 30.5, 30.5)));

    meter.collect().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "temperature").unwrap();
    assert_eq!(summary_f64(metric, &labels), Some((2, 331.0, 30.5, 300.5)));
}

#[test]
fn label_order_does_not_split_series() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let cx = Context::new();

    let forward = LabelSet::from_iter([
        KeyValue::new("dim1", "value1"),
        KeyValue::new("dim2", "value2"),
    ]);
    let reversed = LabelSet::from_iter([
        KeyValue::new("dim2", "value2"),
        KeyValue::new("dim1", "value1"),
    ]);
    assert_eq!(forward, reversed);

    counter.add(&cx, 3, &forward).unwrap();
    counter.add(&cx, 4, &reversed).unwrap();

    meter.collect().unwrap();

    let batch = processor.last_batch();
    let metric = find_metric(&batch, "request.count").unwrap();
    assert_eq!(metric.data().len(), 1);
    assert_eq!(sum_i64(metric, &forward), Some(7));
}

#[test]
fn bound_series_exports_after_quiet_cycles() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    let bound = counter.bind(&labels);
    bound.add(&cx, 5).unwrap();

    meter.collect().unwrap();
    meter.collect().unwrap();

    let batch = processor.last_batch();
    let metric = find_metric(&batch, "request.count").unwrap();
    assert_eq!(sum_i64(metric, &labels), Some(5));
}

#[test]
fn processor_runs_even_when_nothing_updated() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");

    meter.collect().unwrap();
    assert_eq!(processor.batch_count(), 1);
    assert!(processor.last_batch().is_empty());

    // An instrument that has never been updated is suppressed, but the
    // processor is still called.
    let counter = meter.i64_counter("request.count").init();
    meter.collect().unwrap();
    assert_eq!(processor.batch_count(), 2);
    assert!(processor.last_batch().is_empty());

    // Binding resolves a series without recording to it; until a value
    // arrives, that series is suppressed as well.
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let _bound_count = counter.bind(&labels);
    let _bound_size = meter.i64_measure("payload.size").init().bind(&labels);
    meter.collect().unwrap();
    assert_eq!(processor.batch_count(), 3);
    assert!(processor.last_batch().is_empty());
}

#[test]
fn totals_are_cumulative_across_cycles() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    counter.add(&cx, 5, &labels).unwrap();
    meter.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(5)
    );

    counter.add(&cx, 7, &labels).unwrap();
    meter.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(12)
    );
}

#[test]
fn negative_values_are_rejected_by_monotonic_instruments() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let cx = Context::new();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    let requests = meter.i64_counter("request.count").init();
    requests.add(&cx, 5, &labels).unwrap();
    let err = requests.add(&cx, -1, &labels).unwrap_err();
    assert!(matches!(err, MetricsError::NegativeInput));

    let bytes = meter.f64_counter("request.bytes").init();
    bytes.add(&cx, 2.5, &labels).unwrap();
    let err = bytes.add(&cx, -0.5, &labels).unwrap_err();
    assert!(matches!(err, MetricsError::NegativeInput));

    meter.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(5)
    );
    assert_eq!(
        sum_f64(find_metric(&batch, "request.bytes").unwrap(), &labels),
        Some(2.5)
    );
}

#[test]
fn nan_values_are_rejected() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let recorder = meter.f64_measure("payload.ratio").init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    let err = recorder.record(&cx, f64::NAN, &labels).unwrap_err();
    assert!(matches!(err, MetricsError::NaNInput));
    recorder.record(&cx, 1.5, &labels).unwrap();

    meter.collect().unwrap();
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "payload.ratio").unwrap();
    assert_eq!(summary_f64(metric, &labels), Some((1, 1.5, 1.5, 1.5)));
}

#[test]
fn duplicate_registration_returns_the_same_instrument() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    let first = meter.i64_counter("request.count").try_init().unwrap();
    let second = meter.i64_counter("request.count").try_init().unwrap();

    first.add(&cx, 3, &labels).unwrap();
    second.add(&cx, 4, &labels).unwrap();

    meter.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(batch.len(), 1);
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(7)
    );
}

#[test]
fn conflicting_registration_is_refused() {
    let (_, factory) = test_pipeline();
    let meter = factory.meter("library1");

    meter.i64_counter("request.count").try_init().unwrap();

    let err = meter.f64_counter("request.count").try_init().unwrap_err();
    assert!(matches!(err, MetricsError::MetricKindMismatch(_)));

    let err = meter.i64_measure("request.count").try_init().unwrap_err();
    assert!(matches!(err, MetricsError::MetricKindMismatch(_)));

    let err = meter
        .i64_sum_observer("request.count", |_| Ok(()))
        .try_init()
        .unwrap_err();
    assert!(matches!(err, MetricsError::MetricKindMismatch(_)));
}

#[test]
fn invalid_instrument_config_is_refused() {
    let (_, factory) = test_pipeline();
    let meter = factory.meter("library1");

    for name in ["", "_leading", "has space", "utf8char锈"] {
        let result = meter.i64_counter(name).try_init();
        assert!(matches!(
            result,
            Err(MetricsError::InvalidInstrumentConfiguration(_))
        ));
    }

    let result = meter
        .i64_counter("payload.size")
        .with_unit(Unit::new("µs"))
        .try_init();
    assert!(matches!(
        result,
        Err(MetricsError::InvalidInstrumentConfiguration(_))
    ));
}

#[test]
fn descriptor_metadata_flows_to_export() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter
        .i64_counter("request.count")
        .with_description("Number of requests served")
        .with_unit(Unit::new("{requests}"))
        .init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    counter.add(&Context::new(), 1, &labels).unwrap();
    meter.collect().unwrap();

    let batch = processor.last_batch();
    let descriptor = find_metric(&batch, "request.count").unwrap().descriptor();
    assert_eq!(
        descriptor.description(),
        Some(&"Number of requests served".to_string())
    );
    assert_eq!(descriptor.unit(), Some("{requests}"));
    assert_eq!(descriptor.instrument_kind(), &InstrumentKind::Counter);
    assert_eq!(descriptor.number_kind(), &NumberKind::I64);
}

#[test]
fn factory_requires_a_processor() {
    let err = MeterFactory::builder().build().unwrap_err();
    assert!(matches!(err, MetricsError::Config(_)));
}

#[test]
fn meters_are_shared_per_namespace() {
    let (processor, factory) = test_pipeline();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    let meter_a = factory.meter("library1");
    let meter_b = factory.meter("library1");

    let counter_a = meter_a.i64_counter("request.count").init();
    let counter_b = meter_b.i64_counter("request.count").init();
    counter_a.add(&cx, 3, &labels).unwrap();
    counter_b.add(&cx, 4, &labels).unwrap();

    meter_a.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(batch.len(), 1);
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(7)
    );
}

#[test]
fn observer_error_does_not_stop_collection() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    let _failing = meter
        .i64_sum_observer("failing.total", |_res| {
            Err(MetricsError::Other("callback failed".into()))
        })
        .init();

    let callback_labels = labels.clone();
    let _healthy = meter
        .i64_sum_observer("healthy.total", move |res| {
            res.observe(42, &callback_labels)
        })
        .init();

    let err = meter.collect().unwrap_err();
    assert!(matches!(err, MetricsError::Other(msg) if msg == "callback failed"));

    // The cycle still ran to completion and reached the processor.
    assert_eq!(processor.batch_count(), 1);
    let batch = processor.last_batch();
    assert_eq!(
        sum_i64(find_metric(&batch, "healthy.total").unwrap(), &labels),
        Some(42)
    );
}

#[test]
fn processor_error_is_returned() {
    let factory = MeterFactory::builder()
        .with_processor(Arc::new(FailingProcessor))
        .build()
        .unwrap();
    let meter = factory.meter("library1");

    let err = meter.collect().unwrap_err();
    assert!(matches!(err, MetricsError::Other(msg) if msg == "processor offline"));
}

#[test]
fn poisoned_collection_lock_surfaces_as_an_error() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");

    let _observer = meter
        .i64_sum_observer("queue.bytes.total", |_res| panic!("callback panicked"))
        .init();

    // A panicking callback unwinds through the cycle and poisons the
    // meter's collection lock.
    let cycle = {
        let meter = meter.clone();
        thread::spawn(move || meter.collect())
    };
    assert!(cycle.join().is_err());

    let err = factory.collect().unwrap_err();
    assert!(matches!(err, MetricsError::Other(_)));
    assert_eq!(processor.batch_count(), 0);
}

#[test]
fn record_batch_applies_one_label_set_to_all() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let size = meter.i64_measure("payload.size").init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);
    let cx = Context::new();

    meter
        .record_batch(
            &cx,
            &labels,
            vec![counter.measurement(5), size.measurement(700)],
        )
        .unwrap();

    // A rejected value stops the batch; later measurements stay unrecorded.
    let err = meter
        .record_batch(
            &cx,
            &labels,
            vec![counter.measurement(-5), size.measurement(900)],
        )
        .unwrap_err();
    assert!(matches!(err, MetricsError::NegativeInput));

    meter.collect().unwrap();
    let batch = processor.last_batch();
    assert_eq!(
        sum_i64(find_metric(&batch, "request.count").unwrap(), &labels),
        Some(5)
    );
    assert_eq!(
        summary_i64(find_metric(&batch, "payload.size").unwrap(), &labels),
        Some((1, 700, 700, 700))
    );
}

#[test]
fn factory_collect_sweeps_meters_in_creation_order() {
    let (processor, factory) = test_pipeline();
    let cx = Context::new();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    let meter1 = factory.meter("library1");
    let meter2 = factory.meter("library2");
    meter1
        .i64_counter("request.count")
        .init()
        .add(&cx, 1, &labels)
        .unwrap();
    meter2
        .i64_counter("request.count")
        .init()
        .add(&cx, 2, &labels)
        .unwrap();

    factory.collect().unwrap();

    // One processor call per meter.
    let batches = processor.batches();
    assert_eq!(batches.len(), 2);
    assert_eq!(batches[0][0].namespace(), "library1");
    assert_eq!(batches[1][0].namespace(), "library2");
}

#[test]
fn concurrent_adds_observe_every_update() {
    let (processor, factory) = test_pipeline();
    let meter = factory.meter("library1");
    let counter = meter.i64_counter("request.count").init();
    let labels = LabelSet::from_iter([KeyValue::new("dim1", "value1")]);

    thread::scope(|s| {
        for _ in 0..8 {
            let counter = counter.clone();
            let labels = labels.clone();
            s.spawn(move || {
                let cx = Context::new();
                for _ in 0..1_000 {
                    counter.add(&cx, 1, &labels).unwrap();
                }
            });
        }

        // Collections interleave with the writers.
        for _ in 0..4 {
            meter.collect().unwrap();
        }
    });

    meter.collect().unwrap();
    let batch = processor.last_batch();
    let metric = find_metric(&batch, "request.count").unwrap();
    assert_eq!(sum_i64(metric, &labels), Some(8_000));
}
