//! Process-wide verbosity for the terminal helpers in [`crate::ui`]

use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

fn truthy(value: Option<&str>) -> bool {
    matches!(
        value.map(|v| v.trim().to_ascii_lowercase()).as_deref(),
        Some("1" | "true" | "yes" | "on")
    )
}

fn quiet_from_env() -> bool {
    truthy(std::env::var("FOODSHARE_QUIET").ok().as_deref())
}

/// Fix the quiet switch once at startup: `--quiet` or `FOODSHARE_QUIET`.
/// Later calls have no effect.
pub fn init(flag: bool) {
    let quiet = flag || quiet_from_env();
    if QUIET.set(quiet).is_err() {
        tracing::debug!("quiet switch already set");
    }
}

/// Whether informational output is suppressed; errors always print
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(quiet_from_env)
}
