//! Debug adapter descriptors handed to the host.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

/// How the host should start the adapter when a debug session begins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebugAdapterExecutable {
    pub command: PathBuf,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

impl DebugAdapterExecutable {
    #[must_use]
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = String>) -> Self {
        self.args.extend(args);
        self
    }
}

/// A launch/attach template offered when the user has no `launch.json` yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebugConfiguration {
    #[serde(rename = "type")]
    pub debug_type: String,
    pub request: String,
    pub name: String,
    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Everything the host needs to offer debugging for one debug type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugAdapterRegistration {
    pub debug_type: String,
    pub executable: DebugAdapterExecutable,
    pub initial_configurations: Vec<DebugConfiguration>,
}
