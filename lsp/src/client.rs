//! Language client: owns the server child process and its JSON-RPC plumbing.

use std::collections::HashMap;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use futures_util::future::BoxFuture;
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;

use kide_types::Disposable;

use crate::codec::{FrameReader, FrameWriter};
use crate::protocol::{
    self, Incoming, METHOD_NOT_FOUND, MessageParams, MessageType, Notification, Request,
};

/// The Kotlin server resolves the whole Gradle/Maven classpath during
/// `initialize`, which routinely takes tens of seconds on a cold cache.
const INIT_TIMEOUT: Duration = Duration::from_secs(60);

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

const WRITER_CHANNEL_CAPACITY: usize = 64;

/// Requests awaiting a response. `closed` is set once the server's stdout
/// ends; later requests fail immediately.
#[derive(Default)]
struct Pending {
    closed: bool,
    waiters: HashMap<u64, oneshot::Sender<serde_json::Value>>,
}

type PendingMap = Arc<Mutex<Pending>>;

enum WriterCommand {
    Send(serde_json::Value),
    Shutdown,
}

pub struct LanguageClient {
    name: String,
    child: Child,
    writer_tx: mpsc::Sender<WriterCommand>,
    next_id: u64,
    pending: PendingMap,
    #[allow(dead_code)]
    reader_handle: JoinHandle<()>,
    #[allow(dead_code)]
    writer_handle: JoinHandle<()>,
}

impl LanguageClient {
    /// Spawn the server and start the reader/writer tasks.
    ///
    /// The server is not usable until [`initialize`](Self::initialize)
    /// succeeds.
    pub fn spawn(name: impl Into<String>, executable: &Path, args: &[String]) -> Result<Self> {
        let name = name.into();
        let mut cmd = Command::new(executable);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        kide_utils::scrub_secret_env(&mut cmd);

        let mut child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", executable.display()))?;
        let stdout = child.stdout.take().context("no stdout from child")?;
        let stdin = child.stdin.take().context("no stdin from child")?;

        let pending: PendingMap = Arc::default();

        let (writer_tx, mut writer_rx) = mpsc::channel::<WriterCommand>(WRITER_CHANNEL_CAPACITY);
        let writer_name = name.clone();
        let writer_handle = tokio::spawn(async move {
            let mut writer = FrameWriter::new(stdin);
            while let Some(cmd) = writer_rx.recv().await {
                match cmd {
                    WriterCommand::Send(frame) => {
                        if let Err(e) = writer.write_frame(&frame).await {
                            tracing::warn!("{writer_name}: write error: {e}");
                            break;
                        }
                    }
                    WriterCommand::Shutdown => break,
                }
            }
        });

        let reader_pending = Arc::clone(&pending);
        let reader_writer_tx = writer_tx.clone();
        let reader_name = name.clone();
        let reader_handle = tokio::spawn(async move {
            let mut reader = FrameReader::new(stdout);
            loop {
                match reader.read_frame().await {
                    Ok(Some(frame)) => {
                        Self::dispatch_frame(
                            &frame,
                            &reader_pending,
                            &reader_writer_tx,
                            &reader_name,
                        )
                        .await;
                    }
                    Ok(None) => {
                        tracing::info!("{reader_name}: server closed stdout");
                        break;
                    }
                    Err(e) => {
                        tracing::warn!("{reader_name}: reader error: {e}");
                        break;
                    }
                }
            }
            // Fail outstanding requests now instead of at their timeout.
            let mut pending = reader_pending.lock().await;
            pending.closed = true;
            pending.waiters.clear();
        });

        Ok(Self {
            name,
            child,
            writer_tx,
            next_id: 1,
            pending,
            reader_handle,
            writer_handle,
        })
    }

    async fn dispatch_frame(
        frame: &serde_json::Value,
        pending: &Mutex<Pending>,
        writer_tx: &mpsc::Sender<WriterCommand>,
        name: &str,
    ) {
        let Some(incoming) = protocol::classify(frame) else {
            tracing::trace!("{name}: ignoring malformed JSON-RPC frame");
            return;
        };

        match incoming {
            Incoming::Response { id, body } => {
                if let Some(tx) = pending.lock().await.waiters.remove(&id) {
                    let _ = tx.send(body);
                }
            }
            Incoming::ServerRequest { id, method, params } => {
                let response = Self::answer_server_request(id, &method, params.as_ref(), name);
                let _ = writer_tx.send(WriterCommand::Send(response)).await;
            }
            Incoming::Notification { method, params } => {
                Self::handle_notification(name, &method, params);
            }
        }
    }

    /// Servers block on some requests until answered, so every request gets
    /// a reply.
    fn answer_server_request(
        id: serde_json::Value,
        method: &str,
        params: Option<&serde_json::Value>,
        name: &str,
    ) -> serde_json::Value {
        match method {
            // One `null` per requested item: "no client-side settings".
            "workspace/configuration" => {
                let count = params
                    .and_then(|p| p.get("items"))
                    .and_then(serde_json::Value::as_array)
                    .map_or(0, Vec::len);
                let nulls = vec![serde_json::Value::Null; count];
                protocol::result_response(id, serde_json::Value::Array(nulls))
            }
            "client/registerCapability"
            | "client/unregisterCapability"
            | "window/workDoneProgress/create" => {
                protocol::result_response(id, serde_json::Value::Null)
            }
            _ => {
                tracing::debug!("{name}: unsupported server request {method}");
                protocol::error_response(
                    id,
                    METHOD_NOT_FOUND,
                    format!("Method not found: {method}"),
                )
            }
        }
    }

    fn handle_notification(name: &str, method: &str, params: Option<serde_json::Value>) {
        match method {
            "window/logMessage" | "window/showMessage" => {
                let Some(params) = params else { return };
                match serde_json::from_value::<MessageParams>(params) {
                    Ok(MessageParams { kind, message }) => match kind {
                        MessageType::Error => tracing::error!(server = %name, "{message}"),
                        MessageType::Warning => tracing::warn!(server = %name, "{message}"),
                        MessageType::Info => tracing::info!(server = %name, "{message}"),
                        MessageType::Log => tracing::debug!(server = %name, "{message}"),
                    },
                    Err(e) => tracing::debug!("{name}: bad {method} params: {e}"),
                }
            }
            _ => tracing::trace!("{name}: ignoring notification {method}"),
        }
    }

    /// `initialize` handshake followed by `initialized`.
    pub async fn initialize(&mut self, workspace_root: &Path, storage_path: &Path) -> Result<()> {
        let root_uri = protocol::path_to_file_uri(workspace_root)
            .context("converting workspace root to URI")?;
        let params = protocol::initialize_params(root_uri.as_str(), storage_path);

        let response = self
            .send_request("initialize", Some(params), INIT_TIMEOUT)
            .await?;
        if let Some(error) = response.get("error") {
            bail!(
                "{} initialize failed: {}",
                self.name,
                error["message"].as_str().unwrap_or("unknown error")
            );
        }

        self.send_notification("initialized", Some(serde_json::json!({})))
            .await?;
        Ok(())
    }

    async fn send_request(
        &mut self,
        method: &'static str,
        params: Option<serde_json::Value>,
        timeout: Duration,
    ) -> Result<serde_json::Value> {
        let id = self.next_id;
        self.next_id += 1;

        let (tx, rx) = oneshot::channel();
        {
            let mut pending = self.pending.lock().await;
            if pending.closed {
                bail!("{}: server exited before answering {method}", self.name);
            }
            pending.waiters.insert(id, tx);
        }

        let frame = serde_json::to_value(Request::new(id, method, params))
            .context("serializing request")?;
        if self
            .writer_tx
            .send(WriterCommand::Send(frame))
            .await
            .is_err()
        {
            self.pending.lock().await.waiters.remove(&id);
            bail!("{}: writer channel closed", self.name);
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(_)) => {
                self.pending.lock().await.waiters.remove(&id);
                bail!("{}: server exited before answering {method}", self.name)
            }
            Err(_) => {
                self.pending.lock().await.waiters.remove(&id);
                bail!(
                    "{}: {method} timed out after {}s",
                    self.name,
                    timeout.as_secs()
                )
            }
        }
    }

    async fn send_notification(
        &self,
        method: &'static str,
        params: Option<serde_json::Value>,
    ) -> Result<()> {
        let frame = serde_json::to_value(Notification::new(method, params))
            .context("serializing notification")?;
        self.writer_tx
            .send(WriterCommand::Send(frame))
            .await
            .map_err(|_| anyhow!("{}: writer channel closed", self.name))
    }

    /// `shutdown` + `exit`, then kill if the process lingers. Consumes self.
    pub async fn shutdown(mut self) {
        tracing::info!("Shutting down {}...", self.name);
        if let Ok(response) = self.send_request("shutdown", None, SHUTDOWN_TIMEOUT).await
            && response.get("error").is_none()
        {
            let _ = self.send_notification("exit", None).await;
        }

        let _ = self.writer_tx.send(WriterCommand::Shutdown).await;

        if tokio::time::timeout(SHUTDOWN_TIMEOUT, self.child.wait())
            .await
            .is_err()
        {
            tracing::debug!("{} didn't exit in time, killing", self.name);
            let _ = self.child.kill().await;
        }
    }
}

impl Disposable for LanguageClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn dispose(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin((*self).shutdown())
    }
}
