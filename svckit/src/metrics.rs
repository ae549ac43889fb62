use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, register_int_gauge_vec, HistogramVec,
    IntCounterVec, IntGaugeVec,
};

lazy_static! {
    pub static ref WAREHOUSE_QUERY_DURATION: HistogramVec = register_histogram_vec!(
        "warehouse_query_duration_seconds",
        "Warehouse query duration in seconds",
        &["operation", "driver", "status"]
    )
    .unwrap();

    pub static ref OPERATION_COUNTER: IntCounterVec = register_int_counter_vec!(
        "operations_total",
        "Total number of operations",
        &["operation", "status"]
    )
    .unwrap();

    pub static ref CACHE_EVENTS: IntCounterVec = register_int_counter_vec!(
        "query_cache_events_total",
        "Query cache lookups by result",
        &["result"]
    )
    .unwrap();

    pub static ref DATASET_ROWS: IntGaugeVec = register_int_gauge_vec!(
        "dataset_rows",
        "Rows materialized from the warehouse",
        &["driver"]
    )
    .unwrap();
}

pub fn record_operation(operation: &str, driver: &str, success: bool, duration: f64) {
    let status = if success { "success" } else { "failure" };
    WAREHOUSE_QUERY_DURATION
        .with_label_values(&[operation, driver, status])
        .observe(duration);
    OPERATION_COUNTER
        .with_label_values(&[operation, status])
        .inc();
}

pub fn record_render(success: bool) {
    let status = if success { "success" } else { "failure" };
    OPERATION_COUNTER.with_label_values(&["render", status]).inc();
}

pub fn record_cache(hit: bool) {
    CACHE_EVENTS
        .with_label_values(&[if hit { "hit" } else { "miss" }])
        .inc();
}

pub fn record_dataset_rows(driver: &str, rows: usize) {
    DATASET_ROWS
        .with_label_values(&[driver])
        .set(rows as i64);
}
