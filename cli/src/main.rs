//! kide CLI - headless host for the Kotlin language server and debug adapter.
//!
//! ```text
//! main() -> load config -> init tracing -> activate() -> Ctrl-C
//!                                              |
//!                                              v
//!                              deactivate() -> dispose subscriptions
//! ```

mod host;

use std::{
    fs::{self, OpenOptions},
    path::{Path, PathBuf},
    process::ExitCode,
    sync::{Arc, Mutex},
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use kide_config::{KideConfig, default_storage_path, kide_dir};
use kide_core::{ActivationSummary, KotlinActivators, activate, deactivate};
use kide_types::ExtensionContext;

use crate::host::TerminalHost;

#[derive(Parser, Debug)]
#[command(name = "kide")]
#[command(version)]
#[command(about = "Start Kotlin language tooling for a workspace")]
struct Cli {
    /// Workspace root handed to the language server (default: current directory)
    #[arg(long, value_name = "DIR", default_value = ".")]
    workspace: PathBuf,

    /// Config file (default: ~/.kide/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Global storage directory holding installed servers
    #[arg(long, value_name = "DIR")]
    storage: Option<PathBuf>,
}

fn init_tracing(config_filter: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .ok()
        .or_else(|| config_filter.and_then(|filter| EnvFilter::try_new(filter).ok()))
        .unwrap_or_else(|| EnvFilter::new("info"));

    let (log_file, init_warnings) = open_kide_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Nothing owns the terminal, so stderr is an acceptable last resort.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_kide_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in kide_log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new().create(true).append(true).open(&candidate) {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn kide_log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.kide/logs/kide.log
    if let Some(dir) = kide_dir() {
        candidates.push(dir.join("logs").join("kide.log"));
    }

    // Fallback: ./.kide/logs/kide.log
    candidates.push(PathBuf::from(".kide").join("logs").join("kide.log"));

    candidates
}

fn load_config(path: Option<&Path>) -> Result<Option<KideConfig>, kide_config::ConfigError> {
    match path {
        Some(path) => KideConfig::load_from(path),
        None => KideConfig::load(),
    }
}

fn storage_path(cli: &Cli) -> Result<PathBuf> {
    let path = match &cli.storage {
        Some(path) => path.clone(),
        None => default_storage_path().context("no platform data directory for global storage")?,
    };
    // The storage directory itself is created during activation; its parent
    // belongs to the host.
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    Ok(path)
}

fn describe(summary: &ActivationSummary) -> String {
    let names = |list: &[kide_types::Subsystem]| {
        list.iter()
            .map(|subsystem| subsystem.label())
            .collect::<Vec<_>>()
            .join(", ")
    };
    match (summary.launched.is_empty(), summary.skipped.is_empty()) {
        (true, _) => "no subsystems enabled".to_string(),
        (false, true) => format!("started {}", names(&summary.launched)),
        (false, false) => format!(
            "started {}; skipped {}",
            names(&summary.launched),
            names(&summary.skipped)
        ),
    }
}

async fn run(cli: Cli, config: KideConfig) -> Result<()> {
    let workspace = fs::canonicalize(&cli.workspace)
        .with_context(|| format!("workspace {} not found", cli.workspace.display()))?;
    let storage = storage_path(&cli)?;
    tracing::info!(
        workspace = %workspace.display(),
        storage = %storage.display(),
        "Activating Kotlin tooling"
    );

    let host = Arc::new(TerminalHost::default());
    let context = Arc::new(ExtensionContext::new(host.clone(), storage, workspace));
    let activators = Arc::new(KotlinActivators::from_config(&config));

    let activation = activate(Arc::clone(&context), &config, activators).await;
    let result = match activation {
        Ok(summary) => {
            eprintln!("kide: {}", describe(&summary));
            tracing::info!(
                languages = ?host.configured_languages(),
                debug_types = ?host.debug_types(),
                "Activation complete"
            );
            tokio::signal::ctrl_c()
                .await
                .context("failed to listen for Ctrl-C")
        }
        Err(err) => Err(anyhow::Error::new(err)),
    };

    deactivate();
    context.dispose_subscriptions().await;
    result
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = load_config(cli.config.as_deref());
    let config_filter = loaded
        .as_ref()
        .ok()
        .and_then(|config| config.as_ref())
        .and_then(KideConfig::log_filter);
    init_tracing(config_filter);

    let config = match loaded {
        Ok(config) => config.unwrap_or_default(),
        Err(err) => {
            tracing::error!(path = %err.path().display(), "{err}");
            eprintln!("Error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kide_core::StorageDir;
    use kide_types::Subsystem;

    #[test]
    fn cli_defaults_to_current_directory() {
        let cli = Cli::parse_from(["kide"]);
        assert_eq!(cli.workspace, PathBuf::from("."));
        assert!(cli.config.is_none());
        assert!(cli.storage.is_none());
    }

    #[test]
    fn cli_accepts_overrides() {
        let cli = Cli::parse_from([
            "kide",
            "--workspace",
            "/src/app",
            "--config",
            "/etc/kide.toml",
            "--storage",
            "/tmp/storage",
        ]);
        assert_eq!(cli.workspace, PathBuf::from("/src/app"));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/kide.toml")));
        assert_eq!(storage_path(&cli).unwrap(), PathBuf::from("/tmp/storage"));
    }

    #[test]
    fn explicit_storage_gets_its_parent_created() {
        let dir = tempfile::tempdir().unwrap();
        let storage = dir.path().join("new").join("a").join("b");
        let cli = Cli::parse_from([
            std::ffi::OsStr::new("kide"),
            std::ffi::OsStr::new("--storage"),
            storage.as_os_str(),
        ]);

        assert_eq!(storage_path(&cli).unwrap(), storage);
        assert!(dir.path().join("new").join("a").is_dir());
        assert!(!storage.exists());
    }

    #[test]
    fn explicit_missing_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn log_candidates_end_with_local_fallback() {
        let candidates = kide_log_file_candidates();
        assert_eq!(
            candidates.last(),
            Some(&PathBuf::from(".kide").join("logs").join("kide.log"))
        );
    }

    #[test]
    fn summary_descriptions() {
        let summary = |launched: Vec<Subsystem>, skipped: Vec<Subsystem>| ActivationSummary {
            launched,
            skipped,
            storage: StorageDir::Existing,
        };
        assert_eq!(
            describe(&summary(Subsystem::ALL.to_vec(), vec![])),
            "started language server, debug adapter"
        );
        assert_eq!(
            describe(&summary(
                vec![Subsystem::LanguageServer],
                vec![Subsystem::DebugAdapter]
            )),
            "started language server; skipped debug adapter"
        );
        assert_eq!(
            describe(&summary(vec![], Subsystem::ALL.to_vec())),
            "no subsystems enabled"
        );
    }
}
