//! Kotlin debug adapter activator.
//!
//! The adapter itself is started by the host once per debug session; this
//! crate only finds the executable and tells the host how to launch it, along
//! with the launch/attach templates offered for a fresh `launch.json`.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use kide_types::{
    DebugAdapterExecutable, DebugAdapterRegistration, DebugConfiguration, ExtensionContext, Status,
};
use kide_utils::{ExecutableSpec, locate_executable};

/// Debug type used in `launch.json`.
pub const DEBUG_TYPE: &str = "kotlin";

pub const DEBUG_ADAPTER: ExecutableSpec = ExecutableSpec {
    display_name: "Kotlin Debug Adapter",
    binary_name: "kotlin-debug-adapter",
    install_dir: "debugAdapterInstall/adapter",
};

/// JDWP port the attach template points at.
const DEFAULT_ATTACH_PORT: u16 = 5005;

/// Milliseconds the adapter waits for the debuggee to accept the attach.
const DEFAULT_ATTACH_TIMEOUT_MS: u64 = 2000;

fn configuration(request: &str, name: &str, properties: serde_json::Value) -> DebugConfiguration {
    let properties = match properties {
        serde_json::Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };
    DebugConfiguration {
        debug_type: DEBUG_TYPE.to_string(),
        request: request.to_string(),
        name: name.to_string(),
        properties,
    }
}

/// Templates offered when the workspace has no debug configuration yet.
#[must_use]
pub fn initial_configurations() -> Vec<DebugConfiguration> {
    vec![
        configuration(
            "launch",
            "Kotlin Launch",
            serde_json::json!({
                "projectRoot": "${workspaceFolder}",
                "mainClass": "",
            }),
        ),
        configuration(
            "attach",
            "Kotlin Attach",
            serde_json::json!({
                "projectRoot": "${workspaceFolder}",
                "hostName": "localhost",
                "port": DEFAULT_ATTACH_PORT,
                "timeout": DEFAULT_ATTACH_TIMEOUT_MS,
            }),
        ),
    ]
}

/// Locate the Kotlin debug adapter and register it with the host.
pub async fn register_debug_adapter(
    context: Arc<ExtensionContext>,
    status: Arc<dyn Status>,
    custom_path: Option<PathBuf>,
    args: Vec<String>,
) -> Result<()> {
    status.update("Locating Kotlin Debug Adapter...");
    let located = locate_executable(
        &DEBUG_ADAPTER,
        custom_path.as_deref(),
        context.global_storage_path(),
    )
    .await?;
    tracing::info!(
        path = %located.path.display(),
        source = ?located.source,
        "Using Kotlin Debug Adapter"
    );

    status.update("Registering Kotlin Debug Adapter...");
    context.host().register_debug_adapter(DebugAdapterRegistration {
        debug_type: DEBUG_TYPE.to_string(),
        executable: DebugAdapterExecutable::new(located.path).with_args(args),
        initial_configurations: initial_configurations(),
    });

    tracing::info!("Kotlin Debug Adapter registered for debug type '{DEBUG_TYPE}'");
    Ok(())
}
