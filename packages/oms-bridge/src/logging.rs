//! Tracing subscriber setup for the bridge binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directives: `--verbose` forces debug, otherwise `RUST_LOG` or info.
pub fn filter_directives(verbose: bool, rust_log: Option<&str>) -> String {
    match rust_log {
        _ if verbose => "debug".to_string(),
        Some(directives) if !directives.trim().is_empty() => directives.to_string(),
        _ => "info".to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so the printed tree
/// stays clean on stdout.
pub fn init(verbose: bool) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(verbose, rust_log.as_deref());
    let filter = EnvFilter::try_new(&directives).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directives() {
        assert_eq!(filter_directives(false, None), "info");
        assert_eq!(filter_directives(false, Some("")), "info");
        assert_eq!(filter_directives(false, Some("oms_client=trace")), "oms_client=trace");
        assert_eq!(filter_directives(true, Some("warn")), "debug");
    }
}
