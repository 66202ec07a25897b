//! Core domain types for kide.
//!
//! This crate contains the vocabulary shared by the activation layer and the
//! subsystem activators: the host seam, the extension context, status
//! reporting, and the static descriptions handed to the host. No IO, no
//! runtime; everything here can be used from any layer.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod context;
mod debug;
mod host;
mod language;
mod path;
mod status;
mod subsystem;

pub use context::{Disposable, ExtensionContext};
pub use debug::{DebugAdapterExecutable, DebugAdapterRegistration, DebugConfiguration};
pub use host::Host;
pub use language::{
    EnterAction, IndentAction, IndentationRules, LanguageConfiguration, OnEnterRule,
};
pub use path::custom_path;
pub use status::{Status, StatusItem};
pub use subsystem::Subsystem;

/// Language identifier the host associates with Kotlin sources.
pub const KOTLIN_LANGUAGE_ID: &str = "kotlin";

/// Configuration section every option lives under.
pub const CONFIG_SECTION: &str = "kotlin";

/// Environment variable name patterns that must never reach a spawned
/// language server or debug adapter.
///
/// Patterns support a leading and/or trailing `*` wildcard and are compared
/// case-insensitively.
pub const ENV_SECRET_DENYLIST: &[&str] = &[
    "*_API_KEY",
    "*_TOKEN",
    "*_SECRET",
    "*_PASSWORD",
    "*_CREDENTIAL*",
    "AWS_*",
    "GITHUB_TOKEN",
];
