//! Letter numbering metrics, exposed at `/metrics/letter-numbers`.
//!
//! Request-level metrics are served separately by the Prometheus middleware at `/metrics`.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new_custom(Some("siakad_surat".to_string()), None)
        .expect("valid metrics prefix");
    pub static ref LETTER_NUMBERS_ISSUED: IntCounterVec = register(IntCounterVec::new(
        Opts::new("letter_numbers_issued_total", "Letter numbers committed"),
        &["document_type"],
    ));
    pub static ref COMMIT_RETRIES: IntCounter = register(IntCounter::new(
        "letter_number_commit_retries_total",
        "Commits retried after a concurrent update conflict",
    ));
    pub static ref COMMIT_FAILURES: IntCounter = register(IntCounter::new(
        "letter_number_commit_failures_total",
        "Commits that failed to issue a number",
    ));
    pub static ref COUNTER_RESETS: IntCounter = register(IntCounter::new(
        "letter_counter_resets_total",
        "Administrative counter resets",
    ));
}

fn register<M>(metric: prometheus::Result<M>) -> M
where
    M: prometheus::core::Collector + Clone + 'static,
{
    let metric = metric.expect("valid metric definition");
    REGISTRY
        .register(Box::new(metric.clone()))
        .expect("metric registered once");
    metric
}

pub async fn letter_number_metrics() -> impl Responder {
    match TextEncoder::new().encode_to_string(&REGISTRY.gather()) {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            log::error!("Failed to encode letter number metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
