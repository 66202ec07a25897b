//! Keep secrets out of spawned language servers and debug adapters.

use tokio::process::Command;

use kide_types::ENV_SECRET_DENYLIST;

/// Minimal glob matcher for env var denylist patterns.
/// Handles `*_SUFFIX`, `PREFIX_*`, `*_INFIX*`, and exact match.
/// `key_upper` must already be uppercase.
fn env_glob_matches(pattern: &str, key_upper: &str) -> bool {
    let pat = pattern.to_uppercase();
    match (pat.strip_prefix('*'), pat.strip_suffix('*')) {
        (Some(_), Some(_)) if pat.len() >= 2 => key_upper.contains(&pat[1..pat.len() - 1]),
        (Some(suffix), None) => key_upper.ends_with(suffix),
        (None, Some(prefix)) => key_upper.starts_with(prefix),
        _ => key_upper == pat,
    }
}

#[must_use]
pub fn is_secret_env_var(key: &str) -> bool {
    let upper = key.to_uppercase();
    ENV_SECRET_DENYLIST
        .iter()
        .any(|pat| env_glob_matches(pat, &upper))
}

/// Remove every inherited secret-bearing variable from `cmd`'s environment.
pub fn scrub_secret_env(cmd: &mut Command) {
    for (key, _) in std::env::vars_os() {
        let Some(key) = key.to_str() else { continue };
        if is_secret_env_var(key) {
            cmd.env_remove(key);
        }
    }
}
