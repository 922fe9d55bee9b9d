//! Logging initialization.
//!
//! Log output is a pretty fmt layer by default; set `DEVSEARCH_LOG_JSON=1`
//! to switch to newline-delimited JSON for log shippers. The filter honors
//! `RUST_LOG`-style directives on top of the CLI verbosity.

use anyhow::Result;
use std::env::var;
use tracing::Level;
use tracing_subscriber::{EnvFilter, Registry, fmt, layer::SubscriberExt};

fn build_filter(verbosity_level: Option<Level>) -> Result<EnvFilter> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);
    let filter = EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("tokio=error".parse()?);
    Ok(filter)
}

fn json_output() -> bool {
    var("DEVSEARCH_LOG_JSON").is_ok_and(|value| value == "1" || value.eq_ignore_ascii_case("true"))
}

/// Initialize the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if a filter directive fails to parse or a subscriber is
/// already installed.
pub fn init(verbosity_level: Option<Level>) -> Result<()> {
    let filter = build_filter(verbosity_level)?;

    if json_output() {
        let fmt_layer = fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_target(false)
            .json();
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let fmt_layer = fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_target(false)
            .pretty();
        let subscriber = Registry::default().with(fmt_layer).with(filter);
        tracing::subscriber::set_global_default(subscriber)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_builds_for_every_level() {
        for level in [
            None,
            Some(Level::ERROR),
            Some(Level::WARN),
            Some(Level::INFO),
            Some(Level::DEBUG),
            Some(Level::TRACE),
        ] {
            assert!(build_filter(level).is_ok());
        }
    }

    #[test]
    fn json_output_reads_env_flag() {
        temp_env::with_vars([("DEVSEARCH_LOG_JSON", Some("1"))], || {
            assert!(json_output());
        });
        temp_env::with_vars([("DEVSEARCH_LOG_JSON", Some("true"))], || {
            assert!(json_output());
        });
        temp_env::with_vars([("DEVSEARCH_LOG_JSON", None::<&str>)], || {
            assert!(!json_output());
        });
    }
}
