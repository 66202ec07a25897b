//! Executable lookup for the language server and debug adapter.
//!
//! Resolution order:
//! 1. the user's override path (must exist, never falls through),
//! 2. the copy installed below the extension's global storage,
//! 3. the first match on `PATH`.

use std::path::{Path, PathBuf};

/// Where a subsystem's executable lives by default.
#[derive(Debug, Clone, Copy)]
pub struct ExecutableSpec {
    /// Display name, e.g. "Kotlin Language Server".
    pub display_name: &'static str,
    /// File name without platform extension, e.g. "kotlin-language-server".
    pub binary_name: &'static str,
    /// Install directory relative to global storage, e.g. "langServerInstall/server".
    /// The executable is expected in its `bin/` subdirectory.
    pub install_dir: &'static str,
}

impl ExecutableSpec {
    /// Platform file name of the launcher script.
    #[must_use]
    pub fn file_name(&self) -> String {
        if cfg!(windows) {
            format!("{}.bat", self.binary_name)
        } else {
            self.binary_name.to_string()
        }
    }

    #[must_use]
    pub fn installed_path(&self, storage: &Path) -> PathBuf {
        storage
            .join(self.install_dir)
            .join("bin")
            .join(self.file_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutableSource {
    Custom,
    Installed,
    SystemPath,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedExecutable {
    pub path: PathBuf,
    pub source: ExecutableSource,
}

#[derive(Debug, thiserror::Error)]
pub enum LocateError {
    #[error("custom {name} path does not exist: {}", path.display())]
    CustomPathMissing { name: &'static str, path: PathBuf },
    #[error(
        "{name} not found: no install at {} and `{binary}` is not on PATH",
        installed.display()
    )]
    NotFound {
        name: &'static str,
        binary: &'static str,
        installed: PathBuf,
    },
    #[error("checking {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

async fn exists(path: &Path) -> Result<bool, LocateError> {
    tokio::fs::try_exists(path)
        .await
        .map_err(|source| LocateError::Io {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
async fn warn_if_not_executable(path: &Path) {
    use std::os::unix::fs::PermissionsExt;

    if let Ok(meta) = tokio::fs::metadata(path).await
        && meta.is_file()
        && meta.permissions().mode() & 0o111 == 0
    {
        tracing::warn!(path = %path.display(), "Executable bit not set; spawning may fail");
    }
}

#[cfg(not(unix))]
async fn warn_if_not_executable(_path: &Path) {}

pub async fn locate_executable(
    spec: &ExecutableSpec,
    custom: Option<&Path>,
    storage: &Path,
) -> Result<LocatedExecutable, LocateError> {
    if let Some(path) = custom {
        if !exists(path).await? {
            return Err(LocateError::CustomPathMissing {
                name: spec.display_name,
                path: path.to_path_buf(),
            });
        }
        warn_if_not_executable(path).await;
        return Ok(LocatedExecutable {
            path: path.to_path_buf(),
            source: ExecutableSource::Custom,
        });
    }

    let installed = spec.installed_path(storage);
    if exists(&installed).await? {
        warn_if_not_executable(&installed).await;
        return Ok(LocatedExecutable {
            path: installed,
            source: ExecutableSource::Installed,
        });
    }

    match which::which(spec.binary_name) {
        Ok(path) => Ok(LocatedExecutable {
            path,
            source: ExecutableSource::SystemPath,
        }),
        Err(e) => {
            tracing::debug!("`{}` not on PATH: {e}", spec.binary_name);
            Err(LocateError::NotFound {
                name: spec.display_name,
                binary: spec.binary_name,
                installed,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: ExecutableSpec = ExecutableSpec {
        display_name: "Test Server",
        binary_name: "kide-test-binary-that-is-not-on-path",
        install_dir: "testInstall/server",
    };

    #[test]
    fn installed_path_is_below_bin() {
        let path = SPEC.installed_path(Path::new("/storage"));
        assert!(path.starts_with("/storage/testInstall/server/bin"));
        assert!(
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("kide-test-binary")
        );
    }

    #[tokio::test]
    async fn custom_path_wins_over_install() {
        let dir = tempfile::tempdir().unwrap();
        let installed = SPEC.installed_path(dir.path());
        std::fs::create_dir_all(installed.parent().unwrap()).unwrap();
        std::fs::write(&installed, "").unwrap();
        let custom = dir.path().join("custom-server");
        std::fs::write(&custom, "").unwrap();

        let found = locate_executable(&SPEC, Some(&custom), dir.path())
            .await
            .unwrap();
        assert_eq!(found.source, ExecutableSource::Custom);
        assert_eq!(found.path, custom);
    }

    #[tokio::test]
    async fn missing_custom_path_does_not_fall_through() {
        let dir = tempfile::tempdir().unwrap();
        let installed = SPEC.installed_path(dir.path());
        std::fs::create_dir_all(installed.parent().unwrap()).unwrap();
        std::fs::write(&installed, "").unwrap();

        let err = locate_executable(&SPEC, Some(&dir.path().join("nope")), dir.path())
            .await
            .unwrap_err();
        assert!(matches!(err, LocateError::CustomPathMissing { .. }));
        assert!(err.to_string().contains("Test Server"));
    }

    #[tokio::test]
    async fn installed_copy_used_without_override() {
        let dir = tempfile::tempdir().unwrap();
        let installed = SPEC.installed_path(dir.path());
        std::fs::create_dir_all(installed.parent().unwrap()).unwrap();
        std::fs::write(&installed, "").unwrap();

        let found = locate_executable(&SPEC, None, dir.path()).await.unwrap();
        assert_eq!(found.source, ExecutableSource::Installed);
        assert_eq!(found.path, installed);
    }

    #[tokio::test]
    async fn not_found_names_install_location() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_executable(&SPEC, None, dir.path())
            .await
            .unwrap_err();
        match err {
            LocateError::NotFound { installed, binary, .. } => {
                assert_eq!(installed, SPEC.installed_path(dir.path()));
                assert_eq!(binary, SPEC.binary_name);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
