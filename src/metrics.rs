use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Gauge, Histogram, register_counter, register_counter_vec,
    register_gauge, register_histogram,
};


lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("heard_requests_total", "Total number of API requests").unwrap();
    pub static ref RATE_LIMITED_TOTAL: CounterVec = register_counter_vec!(
        "heard_rate_limited_total",
        "Requests rejected by the rate limiter",
        &["action"]
    )
    .unwrap();
    // no eviction runs, so this only ever grows until restart
    pub static ref RATE_LIMIT_KEYS: Gauge =
        register_gauge!("heard_rate_limit_keys", "Rate limit records held in memory").unwrap();
    pub static ref COMMENT_LIST_LATENCY: Histogram = register_histogram!(
        "heard_comment_list_latency_seconds",
        "Comment listing latency in seconds"
    )
    .unwrap();
}
