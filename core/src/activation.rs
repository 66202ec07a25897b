//! Extension entry points.
//!
//! [`activate`] applies the Kotlin language rules, decides which subsystems
//! are enabled, makes sure the global storage directory exists, and then
//! launches every enabled subsystem concurrently. Each launch runs inside its
//! own spinning status scope. The first failure is reported immediately;
//! launches still in flight are left running.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use futures_util::future::{BoxFuture, try_join_all};
use thiserror::Error;

use kide_config::KideConfig;
use kide_types::{ExtensionContext, Status, Subsystem};

use crate::language::configure_language;
use crate::status::with_spinning_status;
use crate::storage::{StorageDir, ensure_storage_dir};

/// The two subsystem launchers the coordinator drives.
///
/// Implementations receive the shared context, the status handle of their
/// spinner scope and the configured override path (`None` means the default
/// location).
pub trait Activators: Send + Sync + 'static {
    fn activate_language_server(
        &self,
        context: Arc<ExtensionContext>,
        status: Arc<dyn Status>,
        custom_path: Option<PathBuf>,
    ) -> BoxFuture<'static, anyhow::Result<()>>;

    fn register_debug_adapter(
        &self,
        context: Arc<ExtensionContext>,
        status: Arc<dyn Status>,
        custom_path: Option<PathBuf>,
    ) -> BoxFuture<'static, anyhow::Result<()>>;
}

/// Production launchers backed by `kide-lsp` and `kide-dap`.
#[derive(Debug, Clone, Default)]
pub struct KotlinActivators {
    language_server_args: Vec<String>,
    debug_adapter_args: Vec<String>,
}

impl KotlinActivators {
    #[must_use]
    pub fn from_config(config: &KideConfig) -> Self {
        Self {
            language_server_args: config.subsystem(Subsystem::LanguageServer).args.clone(),
            debug_adapter_args: config.subsystem(Subsystem::DebugAdapter).args.clone(),
        }
    }
}

impl Activators for KotlinActivators {
    fn activate_language_server(
        &self,
        context: Arc<ExtensionContext>,
        status: Arc<dyn Status>,
        custom_path: Option<PathBuf>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(kide_lsp::activate_language_server(
            context,
            status,
            custom_path,
            self.language_server_args.clone(),
        ))
    }

    fn register_debug_adapter(
        &self,
        context: Arc<ExtensionContext>,
        status: Arc<dyn Status>,
        custom_path: Option<PathBuf>,
    ) -> BoxFuture<'static, anyhow::Result<()>> {
        Box::pin(kide_dap::register_debug_adapter(
            context,
            status,
            custom_path,
            self.debug_adapter_args.clone(),
        ))
    }
}

#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("failed to create global storage directory {}", path.display())]
    StorageDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{subsystem} {} failed", subsystem.launch_verb())]
    Subsystem {
        subsystem: Subsystem,
        #[source]
        source: anyhow::Error,
    },
    #[error("{subsystem} {} panicked", subsystem.launch_verb())]
    Panicked { subsystem: Subsystem },
    #[error("{subsystem} {} was cancelled", subsystem.launch_verb())]
    Cancelled { subsystem: Subsystem },
}

impl ActivationError {
    /// The subsystem whose launch failed, if the failure came from one.
    #[must_use]
    pub fn subsystem(&self) -> Option<Subsystem> {
        match self {
            Self::StorageDir { .. } => None,
            Self::Subsystem { subsystem, .. }
            | Self::Panicked { subsystem }
            | Self::Cancelled { subsystem } => Some(*subsystem),
        }
    }
}

/// Outcome of a successful [`activate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationSummary {
    /// Subsystems launched, in launch order.
    pub launched: Vec<Subsystem>,
    /// Subsystems disabled by configuration.
    pub skipped: Vec<Subsystem>,
    pub storage: StorageDir,
}

/// Activate the extension.
///
/// Settings are read once, before any subsystem starts. An error from the
/// storage step aborts before anything is launched.
pub async fn activate(
    context: Arc<ExtensionContext>,
    config: &KideConfig,
    activators: Arc<dyn Activators>,
) -> Result<ActivationSummary, ActivationError> {
    configure_language(context.host());

    let plan: Vec<(Subsystem, Option<Option<PathBuf>>)> = Subsystem::ALL
        .into_iter()
        .map(|subsystem| {
            let settings = config.subsystem(subsystem);
            (subsystem, settings.enabled.then(|| settings.custom_path()))
        })
        .collect();

    let storage_path = context.global_storage_path().to_path_buf();
    let storage = ensure_storage_dir(&storage_path)
        .await
        .map_err(|source| ActivationError::StorageDir {
            path: storage_path,
            source,
        })?;

    let mut launches = Vec::new();
    let mut skipped = Vec::new();
    for (subsystem, setting) in plan {
        match setting {
            Some(custom_path) => {
                tracing::debug!(%subsystem, ?custom_path, "Launching");
                let handle = tokio::spawn(launch(
                    subsystem,
                    Arc::clone(&context),
                    Arc::clone(&activators),
                    custom_path,
                ));
                launches.push((subsystem, handle));
            }
            None => {
                tracing::info!(
                    "Skipping {} {} since '{}' is false",
                    subsystem.label(),
                    subsystem.launch_verb(),
                    subsystem.enabled_flag()
                );
                skipped.push(subsystem);
            }
        }
    }

    let launched = launches.iter().map(|(subsystem, _)| *subsystem).collect();

    // Dropping a JoinHandle detaches its task, so a sibling still running
    // when another fails keeps going.
    try_join_all(
        launches
            .into_iter()
            .map(|(subsystem, handle)| async move {
                match handle.await {
                    Ok(Ok(())) => Ok(()),
                    Ok(Err(source)) => Err(ActivationError::Subsystem { subsystem, source }),
                    Err(err) if err.is_panic() => Err(ActivationError::Panicked { subsystem }),
                    Err(_) => Err(ActivationError::Cancelled { subsystem }),
                }
            }),
    )
    .await?;

    Ok(ActivationSummary {
        launched,
        skipped,
        storage,
    })
}

async fn launch(
    subsystem: Subsystem,
    context: Arc<ExtensionContext>,
    activators: Arc<dyn Activators>,
    custom_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    with_spinning_status(context.host(), |status| match subsystem {
        Subsystem::LanguageServer => {
            activators.activate_language_server(Arc::clone(&context), status, custom_path)
        }
        Subsystem::DebugAdapter => {
            activators.register_debug_adapter(Arc::clone(&context), status, custom_path)
        }
    })
    .await
}

/// Deactivate the extension. Running subsystems are released through the
/// context's subscriptions, not here.
pub fn deactivate() {
    tracing::debug!("Kotlin extension deactivated");
}
