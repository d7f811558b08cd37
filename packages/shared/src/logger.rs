//! Logging setup utilities for the Storebell binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// `targets` lists the crate and binary names whose events should be shown
/// at `default_log_level` (dashes are converted to underscores, as tracing
/// targets use module paths). The filter can be overridden using the
/// `RUST_LOG` environment variable.
///
/// # Examples
///
/// ```no_run
/// use storebell_shared::logger::setup_logger;
///
/// setup_logger(&["storebell-server", "storebell-shared"], "debug");
/// ```
pub fn setup_logger(targets: &[&str], default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(targets, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn default_filter(targets: &[&str], default_log_level: &str) -> String {
    targets
        .iter()
        .map(|target| format!("{}={}", target.replace('-', "_"), default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}
