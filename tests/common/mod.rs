//! Common test utilities and logging infrastructure
//!
//! Import this module in your integration tests:
//! ```rust,ignore
//! mod common;
//! use common::init_test_logging;
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG=debug` - Enable debug logging in tests
//! - `RUST_LOG=console_table::render=trace` - Row splicing and width traces
//! - `TEST_LOG_JSON=1` - Output JSON format for CI parsing
//!
//! Not every helper is used by every test binary.

#![allow(dead_code)]

pub mod assertions;
pub mod grid;

use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Initialize test logging.
///
/// Library diagnostics go through the `log` facade and are picked up by the
/// subscriber's log bridge. Idempotent.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let use_json = std::env::var("TEST_LOG_JSON").is_ok();
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("console_table=debug,test=info"));

        if use_json {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_test_writer())
                .try_init()
                .ok();
        } else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_test_writer()
                        .with_file(true)
                        .with_line_number(true)
                        .with_target(true)
                        .compact(),
                )
                .try_init()
                .ok();
        }
    });
}

/// A test span guard that logs entry and exit.
pub fn test_phase(name: &str) -> tracing::span::EnteredSpan {
    let span = tracing::info_span!("test_phase", phase = name);
    tracing::info!(phase = name, "entering test phase");
    span.entered()
}
