//! Configuration for kide.
//!
//! Options live in `~/.kide/config.toml` under a `[kotlin]` table that mirrors
//! the editor's `kotlin.*` settings namespace:
//!
//! ```toml
//! [kotlin.languageServer]
//! enabled = true
//! path = ""            # empty: use the installed or PATH server
//!
//! [kotlin.debugAdapter]
//! enabled = false
//! path = "${HOME}/kda/bin/kotlin-debug-adapter"
//!
//! [log]
//! filter = "kide=debug"
//! ```
//!
//! The file is read once; the parsed [`KideConfig`] is an immutable snapshot.

use std::env;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use kide_types::{Subsystem, custom_path};

// bool::default() is false, so only true needs a fn
const fn default_true() -> bool {
    true
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct KideConfig {
    #[serde(default)]
    pub kotlin: KotlinConfig,
    pub log: Option<LogConfig>,
}

/// The `kotlin.*` settings namespace.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KotlinConfig {
    #[serde(default)]
    pub language_server: SubsystemConfig,
    #[serde(default)]
    pub debug_adapter: SubsystemConfig,
}

/// Options shared by both subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubsystemConfig {
    /// Whether the subsystem is started at all. Default: true.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Explicit executable path. Empty means "use the default location".
    /// `${VAR}` references are expanded.
    #[serde(default)]
    pub path: String,
    /// Extra arguments for the spawned executable.
    #[serde(default)]
    pub args: Vec<String>,
}

impl Default for SubsystemConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: String::new(),
            args: Vec::new(),
        }
    }
}

impl SubsystemConfig {
    /// The override path, or `None` when the default location should be used.
    ///
    /// Expansion runs first, so a path made only of unset variables is
    /// treated as empty.
    #[must_use]
    pub fn custom_path(&self) -> Option<PathBuf> {
        custom_path(&expand_env_vars(&self.path))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// `tracing_subscriber::EnvFilter` directive, e.g. `"kide=debug,info"`.
    pub filter: Option<String>,
}

impl KotlinConfig {
    #[must_use]
    pub fn subsystem(&self, subsystem: Subsystem) -> &SubsystemConfig {
        match subsystem {
            Subsystem::LanguageServer => &self.language_server,
            Subsystem::DebugAdapter => &self.debug_adapter,
        }
    }
}

/// Replace `${VAR}` with the variable's value (empty when unset).
///
/// Unterminated references and `${}` are kept verbatim.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(0) => {
                out.push_str("${}");
                rest = &after[1..];
            }
            Some(end) => {
                out.push_str(&env::var(&after[..end]).unwrap_or_default());
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

impl KideConfig {
    /// Load from the default location. `Ok(None)` when there is no file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    /// Load from an explicit path. `Ok(None)` when the file does not exist.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {}: {err}", path.display());
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {}: {err}", path.display());
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn subsystem(&self, subsystem: Subsystem) -> &SubsystemConfig {
        self.kotlin.subsystem(subsystem)
    }

    #[must_use]
    pub fn log_filter(&self) -> Option<&str> {
        self.log.as_ref().and_then(|log| log.filter.as_deref())
    }
}

/// `~/.kide`, the home of the config file and logs.
#[must_use]
pub fn kide_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".kide"))
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    kide_dir().map(|dir| dir.join("config.toml"))
}

/// Platform data directory used as the extension's global storage.
#[must_use]
pub fn default_storage_path() -> Option<PathBuf> {
    dirs::data_dir().map(|data| data.join("kide").join("globalStorage"))
}
