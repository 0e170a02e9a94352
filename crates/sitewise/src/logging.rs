//! Log setup for the `sitewise` binary.
//!
//! Events go to stderr so rendered pages on stdout stay clean. The filter
//! comes from `-v` flags when given, otherwise from `SITEWISE_LOG`, and
//! defaults to `warn`.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive.
pub const LOG_ENV: &str = "SITEWISE_LOG";

/// The directive for a `-v` count.
pub fn directive_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

pub fn env_filter(verbosity: u8) -> EnvFilter {
    if verbosity == 0 {
        if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
            return filter;
        }
    }
    EnvFilter::new(directive_for(verbosity))
}

/// Installs the global subscriber.
pub fn init(verbosity: u8) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directive_for_verbosity() {
        assert_eq!(directive_for(0), "warn");
        assert_eq!(directive_for(1), "info");
        assert_eq!(directive_for(2), "debug");
        assert_eq!(directive_for(9), "trace");
    }

    #[test]
    fn test_verbose_flag_overrides_env() {
        assert_eq!(env_filter(2).to_string(), "debug");
    }
}
