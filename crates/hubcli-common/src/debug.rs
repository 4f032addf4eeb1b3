//! The wire-debugging switch.

/// Primary variable controlling debug output.
pub const DEBUG_ENV: &str = "HUBCLI_DEBUG";

/// Generic fallback consulted when [`DEBUG_ENV`] is unset.
pub const FALLBACK_DEBUG_ENV: &str = "DEBUG";

/// Reports whether debug logging was requested through the environment.
///
/// Reads `HUBCLI_DEBUG`, falling back to `DEBUG`. Unset, empty, `0`, `false`
/// and `no` (any case) mean disabled; any other value enables it.
#[must_use]
pub fn is_debug_enabled() -> bool {
    debug_enabled_with(|name| std::env::var(name).ok())
}

/// Same as [`is_debug_enabled`] but reads variables through `env`.
pub fn debug_enabled_with<F>(env: F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    let value = env(DEBUG_ENV).or_else(|| env(FALLBACK_DEBUG_ENV));

    value.is_some_and(|v| {
        let v = v.trim().to_ascii_lowercase();
        !matches!(v.as_str(), "" | "0" | "false" | "no")
    })
}
