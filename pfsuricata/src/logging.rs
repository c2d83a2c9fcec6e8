//! Logging setup. Events go to stderr so stdout only carries results.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable lines.
    Human,
    /// One JSON object per event.
    Json,
}

static INIT_ONCE: Once = Once::new();

/// Default filter for a `-v` count: warn, then info, then debug.
pub fn default_filter(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "pfsuricata=warn",
        1 => "pfsuricata=info",
        _ => "pfsuricata=debug",
    }
}

/// Install the global subscriber. `RUST_LOG` overrides the verbosity.
/// Later calls are ignored.
pub fn init(profile: Profile, verbosity: u8) {
    INIT_ONCE.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);
        // Another subscriber may already be installed (tests, embedding).
        let _ = match profile {
            Profile::Human => builder.try_init(),
            Profile::Json => builder.json().try_init(),
        };
    });
}

#[cfg(test)]
mod tests {
    use super::{default_filter, init, Profile};

    #[test]
    fn verbosity_raises_level() {
        assert_eq!(default_filter(0), "pfsuricata=warn");
        assert_eq!(default_filter(1), "pfsuricata=info");
        assert_eq!(default_filter(5), "pfsuricata=debug");
    }

    #[test]
    fn init_is_idempotent() {
        init(Profile::Human, 0);
        init(Profile::Json, 2);
    }
}
