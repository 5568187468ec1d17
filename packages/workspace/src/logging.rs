//! Log setup for binaries and tests embedding the editor.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `VOS_LOG=vos_editor=debug`
pub const LOG_ENV: &str = "VOS_LOG";

/// Install a global fmt subscriber filtered by [`LOG_ENV`] (default `info`)
///
/// Returns false if a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
