/*!
 * Structured Tracing
 * Logging setup and actor spans using the tracing crate
 *
 * Features:
 * - Env-driven filtering (RUST_LOG)
 * - JSON-formatted logs for structured parsing
 * - One span per simulation actor, closed with its turn count
 */

use std::time::Instant;
use tracing::{debug, info, span, Level};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - RRSIM_TRACE_JSON: Enable JSON output (default: false)
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var("RRSIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_thread_names(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        info!(json = use_json, "Structured tracing initialized");
    }
}

/// Span covering one actor thread from first wait to exit
pub struct ActorSpan {
    span: tracing::Span,
    start: Instant,
    actor: String,
    turns: u64,
}

impl ActorSpan {
    pub fn new(actor: &str) -> Self {
        let span = span!(
            Level::DEBUG,
            "actor",
            actor = actor,
            turns = tracing::field::Empty,
            duration_us = tracing::field::Empty,
        );

        Self {
            span,
            start: Instant::now(),
            actor: actor.to_string(),
            turns: 0,
        }
    }

    /// Count one completed turn
    #[inline]
    pub fn record_turn(&mut self) {
        self.turns += 1;
    }

    pub fn turns(&self) -> u64 {
        self.turns
    }

    /// Enter the span context for the current thread
    ///
    /// The returned guard owns its own handle, so the span can keep
    /// counting turns while entered.
    pub fn entered(&self) -> tracing::span::EnteredSpan {
        self.span.clone().entered()
    }
}

impl Drop for ActorSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("turns", self.turns);
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();
        debug!(
            actor = %self.actor,
            turns = self.turns,
            duration_us = duration.as_micros() as u64,
            "actor exited"
        );
    }
}
