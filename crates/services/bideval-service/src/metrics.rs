use once_cell::sync::Lazy;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// Registry holds all service metrics
static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static EVALUATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let evaluations = IntCounterVec::new(
        Opts::new("bideval_evaluations_total", "Number of evaluation requests served, by endpoint"),
        &["endpoint"], // "evaluate", "compare"
    )
    .expect("Failed to create bideval_evaluations_total metric");

    register_metric(&evaluations);
    evaluations
});

static BIDS_EVALUATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let bids = IntCounter::new("bideval_bids_evaluated_total", "Number of bids read across all evaluations")
        .expect("Failed to create bideval_bids_evaluated_total metric");

    register_metric(&bids);
    bids
});

static WEIGHTED_SCORE_HISTOGRAM: Lazy<Histogram> = Lazy::new(|| {
    let histogram = Histogram::with_opts(
        HistogramOpts::new("bideval_weighted_score", "Distribution of weighted bid scores")
            .buckets(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]),
    )
    .expect("Failed to create bideval_weighted_score metric");

    register_metric(&histogram);
    histogram
});

static EVALUATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    let histogram = Histogram::with_opts(HistogramOpts::new(
        "bideval_evaluation_duration_seconds",
        "Time spent evaluating a request",
    ))
    .expect("Failed to create bideval_evaluation_duration_seconds metric");

    register_metric(&histogram);
    histogram
});

fn register_metric<M: prometheus::core::Collector + Clone + 'static>(metric: &M) {
    REGISTRY
        .register(Box::new(metric.clone()))
        .expect("Failed to register metric");
}

/// Registers every metric so they appear in the first scrape.
pub fn init() {
    Lazy::force(&EVALUATIONS_TOTAL);
    Lazy::force(&BIDS_EVALUATED_TOTAL);
    Lazy::force(&WEIGHTED_SCORE_HISTOGRAM);
    Lazy::force(&EVALUATION_DURATION);
}

pub fn record_evaluation(endpoint: &str, bid_count: usize, seconds: f64) {
    EVALUATIONS_TOTAL.with_label_values(&[endpoint]).inc();
    BIDS_EVALUATED_TOTAL.inc_by(bid_count as u64);
    EVALUATION_DURATION.observe(seconds);
}

pub fn record_weighted_score(score: f64) {
    WEIGHTED_SCORE_HISTOGRAM.observe(score);
}

/// Prometheus text exposition of all registered metrics.
pub fn render() -> anyhow::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}
