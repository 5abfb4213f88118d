use prometheus::{
    register_int_counter_vec, register_int_gauge, Encoder, IntCounterVec, IntGauge, TextEncoder,
};
use std::sync::LazyLock;

pub static ORDER_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_order_requests_total",
        "Total order creation requests",
        &["result"]
    )
    .unwrap()
});

pub static VERIFY_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_verify_requests_total",
        "Total payment verification requests",
        &["result"]
    )
    .unwrap()
});

pub static STREAM_SESSIONS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "gateway_stream_sessions_total",
        "Streaming generation sessions by terminal state",
        &["state"]
    )
    .unwrap()
});

pub static EVENT_SUBSCRIBERS: LazyLock<IntGauge> = LazyLock::new(|| {
    register_int_gauge!(
        "gateway_event_subscribers",
        "Currently connected event listeners"
    )
    .unwrap()
});

pub fn metrics_output() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
