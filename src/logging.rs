//! Logging setup
//!
//! Diagnostics go to stderr through `tracing`, so stdout stays clean for
//! command output. `RUST_LOG` overrides everything; otherwise `--verbose`
//! selects debug output and the configured level applies.

use tracing_subscriber::EnvFilter;

/// Builds the filter directive for this crate
fn directive(verbose: bool, level: &str) -> String {
    let level = if verbose { "debug" } else { level };
    format!("todolist={}", level)
}

/// Installs the global subscriber. Calling it twice is harmless.
pub fn init(verbose: bool, level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(directive(verbose, level)));

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
    fn verbose_forces_debug() {
        assert_eq!(directive(true, "warn"), "todolist=debug");
        assert_eq!(directive(false, "info"), "todolist=info");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init(false, "warn");
        init(true, "warn");
    }
}
