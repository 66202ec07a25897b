use std::path::PathBuf;

/// Normalize an override path option.
///
/// An empty string means "use the default location" and becomes `None`; any
/// other value is passed through unchanged (no trimming, no resolution).
#[must_use]
pub fn custom_path(raw: &str) -> Option<PathBuf> {
    if raw.is_empty() {
        None
    } else {
        Some(PathBuf::from(raw))
    }
}
