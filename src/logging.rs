//! Tracing subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

pub const ENV_LOG_LEVEL: &str = "MARKETLENS_LOG";

/// Pick the default filter directive when `RUST_LOG` is unset.
pub fn default_level(verbose: bool, env_level: Option<String>) -> String {
    if verbose {
        "debug".to_string()
    } else if let Some(level) = env_level {
        level
    } else {
        "warn".to_string()
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// parseable when `--json` is used. Safe to call more than once.
pub fn init(verbose: bool) {
    let level = default_level(verbose, std::env::var(ENV_LOG_LEVEL).ok());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
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
    fn test_verbose_wins() {
        assert_eq!(default_level(true, Some("error".into())), "debug");
    }

    #[test]
    fn test_env_level_used_when_not_verbose() {
        assert_eq!(default_level(false, Some("info".into())), "info");
    }

    #[test]
    fn test_fallback_is_warn() {
        assert_eq!(default_level(false, None), "warn");
    }
}
