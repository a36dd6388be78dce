//! Tracing/logging initialization.
//!
//! Logs go to stderr so that command output on stdout stays pipeable.

use tracing_subscriber::EnvFilter;

/// Default filter directive for the CLI verbosity flags
pub fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    }
}

/// Initialize tracing/logging for the process.
///
/// `RUST_LOG` takes precedence over the verbosity flags. Safe to call
/// multiple times (subsequent calls are no-ops).
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(false, false), "warn");
        assert_eq!(default_directive(true, false), "debug");
        assert_eq!(default_directive(false, true), "error");
        assert_eq!(default_directive(true, true), "debug");
    }

    #[test]
    fn test_init_is_idempotent() {
        init(false, true);
        init(true, false);
    }
}
