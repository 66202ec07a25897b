use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use kide_types::{ExtensionContext, Status};
use kide_utils::{ExecutableSpec, locate_executable};

use crate::client::LanguageClient;

pub const LANGUAGE_SERVER: ExecutableSpec = ExecutableSpec {
    display_name: "Kotlin Language Server",
    binary_name: "kotlin-language-server",
    install_dir: "langServerInstall/server",
};

/// Locate, start and initialize the Kotlin language server.
///
/// The running client is registered on the context's subscriptions; the host
/// shuts it down when it disposes them.
pub async fn activate_language_server(
    context: Arc<ExtensionContext>,
    status: Arc<dyn Status>,
    custom_path: Option<PathBuf>,
    args: Vec<String>,
) -> Result<()> {
    status.update("Locating Kotlin Language Server...");
    let located = locate_executable(
        &LANGUAGE_SERVER,
        custom_path.as_deref(),
        context.global_storage_path(),
    )
    .await?;
    tracing::info!(
        path = %located.path.display(),
        source = ?located.source,
        "Using Kotlin Language Server"
    );

    status.update("Starting Kotlin Language Server...");
    let mut client = LanguageClient::spawn(LANGUAGE_SERVER.display_name, &located.path, &args)?;

    status.update("Initializing Kotlin Language Server...");
    client
        .initialize(context.workspace_root(), context.global_storage_path())
        .await
        .context("Kotlin Language Server failed to initialize")?;

    context.push_subscription(Box::new(client));
    tracing::info!("Kotlin Language Server initialized");
    Ok(())
}
