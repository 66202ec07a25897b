//! Extension context handed to every activator by the host.
//!
//! The host creates one context per activation and passes it down. Everything
//! a subsystem leaves running is pushed onto the context's subscriptions and
//! released by the host after deactivation.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use futures_util::future::BoxFuture;

use crate::host::Host;

/// A resource that outlives activation and is released by the host.
pub trait Disposable: Send {
    /// Short name used in shutdown logs.
    fn name(&self) -> &str;

    /// Release the resource. Consumes self: a disposed resource is gone.
    fn dispose(self: Box<Self>) -> BoxFuture<'static, ()>;
}

pub struct ExtensionContext {
    host: Arc<dyn Host>,
    global_storage_path: PathBuf,
    workspace_root: PathBuf,
    subscriptions: Mutex<Vec<Box<dyn Disposable>>>,
}

impl ExtensionContext {
    #[must_use]
    pub fn new(
        host: Arc<dyn Host>,
        global_storage_path: impl Into<PathBuf>,
        workspace_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            host,
            global_storage_path: global_storage_path.into(),
            workspace_root: workspace_root.into(),
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn host(&self) -> &dyn Host {
        self.host.as_ref()
    }

    /// Private per-user directory for installed artifacts and caches.
    /// May not exist until activation has run.
    #[must_use]
    pub fn global_storage_path(&self) -> &Path {
        &self.global_storage_path
    }

    #[must_use]
    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn push_subscription(&self, subscription: Box<dyn Disposable>) {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(subscription);
    }

    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Dispose every subscription, most recent first.
    pub async fn dispose_subscriptions(&self) {
        let drained: Vec<Box<dyn Disposable>> = std::mem::take(
            &mut *self
                .subscriptions
                .lock()
                .unwrap_or_else(PoisonError::into_inner),
        );
        for subscription in drained.into_iter().rev() {
            tracing::debug!(subscription = subscription.name(), "Disposing");
            subscription.dispose().await;
        }
    }
}

impl fmt::Debug for ExtensionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionContext")
            .field("global_storage_path", &self.global_storage_path)
            .field("workspace_root", &self.workspace_root)
            .field("subscriptions", &self.subscription_count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DebugAdapterRegistration, LanguageConfiguration, StatusItem};

    struct NullHost;

    struct NullItem;

    impl StatusItem for NullItem {
        fn show(&mut self) {}
        fn set_text(&mut self, _text: &str) {}
        fn dispose(&mut self) {}
    }

    impl Host for NullHost {
        fn create_status_item(&self) -> Box<dyn StatusItem> {
            Box::new(NullItem)
        }
        fn set_language_configuration(&self, _language_id: &str, _config: LanguageConfiguration) {}
        fn register_debug_adapter(&self, _registration: DebugAdapterRegistration) {}
    }

    struct Recorder {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Disposable for Recorder {
        fn name(&self) -> &str {
            &self.name
        }

        fn dispose(self: Box<Self>) -> BoxFuture<'static, ()> {
            let log = Arc::clone(&self.log);
            let name = self.name.clone();
            Box::pin(async move {
                log.lock().unwrap().push(name);
            })
        }
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn dispose_logs_each_subscription_name() {
        let logs = LogBuffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(Mutex::new(logs.clone()))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let context = ExtensionContext::new(Arc::new(NullHost), "/storage", "/workspace");
        context.push_subscription(Box::new(Recorder {
            name: "Kotlin Language Server".to_string(),
            log: Arc::default(),
        }));
        futures_util::FutureExt::now_or_never(context.dispose_subscriptions())
            .expect("recorder futures complete immediately");

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        assert!(
            output.contains("Kotlin Language Server"),
            "unexpected log output: {output}"
        );
        assert!(output.contains("Disposing"));
    }

    #[test]
    fn dispose_runs_in_reverse_registration_order() {
        let context = ExtensionContext::new(Arc::new(NullHost), "/storage", "/workspace");
        let log = Arc::new(Mutex::new(Vec::new()));
        for name in ["first", "second"] {
            context.push_subscription(Box::new(Recorder {
                name: name.to_string(),
                log: Arc::clone(&log),
            }));
        }
        assert_eq!(context.subscription_count(), 2);

        futures_util::FutureExt::now_or_never(context.dispose_subscriptions())
            .expect("recorder futures complete immediately");

        assert_eq!(*log.lock().unwrap(), vec!["second", "first"]);
        assert_eq!(context.subscription_count(), 0);
    }

    #[test]
    fn debug_output_omits_host() {
        let context = ExtensionContext::new(Arc::new(NullHost), "/storage", "/workspace");
        let rendered = format!("{context:?}");
        assert!(rendered.contains("/storage"));
        assert!(rendered.contains("subscriptions: 0"));
    }
}
