//! Tracing initialisation for coder binaries.
//!
//! [`init_tracing`] installs a global subscriber with an `EnvFilter` and
//! optional JSON output. `RUST_LOG` wins when set; otherwise our own crates
//! log at the requested level and dependencies stay at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const OWN_CRATES: [&str; 3] = ["coder_core", "coder_cli", "llm_gateway"];

/// Filter directive used when `RUST_LOG` is absent.
pub fn default_directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    let mut directive = String::from("warn");
    for krate in OWN_CRATES {
        directive.push_str(&format!(",{krate}={level}"));
    }
    directive
}

/// True when `CODER_LOG_FORMAT=json` is set.
pub fn json_requested_by_env() -> bool {
    std::env::var("CODER_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Initialise the global tracing subscriber.
///
/// Returns `false` when a subscriber was already installed; only the first
/// call takes effect.
pub fn init_tracing(json: bool, level: Level) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let registry = tracing_subscriber::registry().with(env_filter);
    if json || json_requested_by_env() {
        registry
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .is_ok()
    }
}
