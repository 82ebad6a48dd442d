//! Tracing bootstrap for hosts and tests
//!
//! The library itself only emits `tracing` events. Hosts that don't install
//! their own subscriber can call [`init_tracing`] once at startup.

use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Install a stderr `fmt` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `daybook_core` is logged at
/// `default_level`. Returns `false` if a global subscriber was already
/// installed, which makes repeated calls from tests harmless.
pub fn init_tracing(default_level: Level) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "daybook_core={}",
            default_level.as_str().to_lowercase()
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
