use prometheus::register_int_counter_vec;
use prometheus::IntCounterVec;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use lazy_static::lazy_static;

lazy_static! {
    pub static ref API_ERRORS: IntCounterVec = register_int_counter_vec!(
        "trivia_api_errors_total",
        "Number of error envelopes returned",
        &["status"]
    )
    .unwrap();
    pub static ref QUIZ_ROUNDS: IntCounterVec = register_int_counter_vec!(
        "trivia_quiz_rounds_total",
        "Number of quiz requests served",
        &["outcome"]
    )
    .unwrap();
}

/// Used when `LOG_LEVEL` is unset or invalid. Request spans from `tower_http`
/// carry method, path and status of every call.
const DEFAULT_FILTER: &str = "info,trivia_api=debug,tower_http=debug,sqlx=warn";

/// `LOG_LEVEL` takes `EnvFilter` directives. `INCLUDE_SPAN_EVENTS=true` also
/// logs request spans as they open and close.
pub fn init_tracing() {
    let mut fmt_layer = fmt::layer().with_target(true);
    if std::env::var("INCLUDE_SPAN_EVENTS").is_ok_and(|value| value.eq_ignore_ascii_case("true")) {
        fmt_layer = fmt_layer.with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);
    }
    let filter_layer =
        EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .init();
}
