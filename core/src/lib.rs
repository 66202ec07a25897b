//! Activation layer for kide.
//!
//! Ties the configuration, the host seam and the two subsystem activators
//! together: language rules, storage bootstrap, concurrent launch under
//! spinning status scopes.

mod activation;
mod language;
mod status;
mod storage;

#[cfg(test)]
mod testing;

pub use activation::{
    ActivationError, ActivationSummary, Activators, KotlinActivators, activate, deactivate,
};
pub use language::{configure_language, kotlin_language_configuration};
pub use status::{SPINNER_PREFIX, StatusBarEntry, with_spinning_status};
pub use storage::{StorageDir, ensure_storage_dir};
