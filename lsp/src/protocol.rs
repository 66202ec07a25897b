//! JSON-RPC message shapes exchanged with the language server.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error("cannot convert path to file URI: {}", path.display())]
pub(crate) struct PathToUriError {
    path: PathBuf,
}

#[derive(Debug, Serialize)]
pub(crate) struct Request {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Request {
    pub fn new(id: u64, method: &'static str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Notification {
    pub jsonrpc: &'static str,
    pub method: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

impl Notification {
    pub fn new(method: &'static str, params: Option<serde_json::Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            method,
            params,
        }
    }
}

/// A frame received from the server, classified by shape.
#[derive(Debug)]
pub(crate) enum Incoming {
    Response {
        id: u64,
        body: serde_json::Value,
    },
    ServerRequest {
        id: serde_json::Value,
        method: String,
        params: Option<serde_json::Value>,
    },
    Notification {
        method: String,
        params: Option<serde_json::Value>,
    },
}

pub(crate) fn classify(frame: &serde_json::Value) -> Option<Incoming> {
    let id = frame.get("id");
    let method = frame
        .get("method")
        .and_then(serde_json::Value::as_str)
        .map(String::from);
    let params = frame.get("params").cloned();
    let is_response = frame.get("result").is_some() || frame.get("error").is_some();

    match (id, method) {
        (Some(id), None) if is_response => Some(Incoming::Response {
            id: id.as_u64()?,
            body: frame.clone(),
        }),
        (Some(id), Some(method)) => Some(Incoming::ServerRequest {
            id: id.clone(),
            method,
            params,
        }),
        (None, Some(method)) => Some(Incoming::Notification { method, params }),
        _ => None,
    }
}

pub(crate) fn error_response(
    id: serde_json::Value,
    code: i64,
    message: String,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message }
    })
}

pub(crate) fn result_response(
    id: serde_json::Value,
    result: serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result
    })
}

/// JSON-RPC "method not found".
pub(crate) const METHOD_NOT_FOUND: i64 = -32601;

pub(crate) fn initialize_params(root_uri: &str, storage_path: &Path) -> serde_json::Value {
    serde_json::json!({
        "processId": std::process::id(),
        "clientInfo": { "name": "kide", "version": env!("CARGO_PKG_VERSION") },
        "rootUri": root_uri,
        "capabilities": {
            "workspace": {
                "configuration": true,
                "workspaceFolders": true
            },
            "textDocument": {
                "synchronization": {
                    "dynamicRegistration": false,
                    "didSave": true
                },
                "publishDiagnostics": {
                    "relatedInformation": false
                }
            },
            "window": {
                "showMessage": {}
            }
        },
        "initializationOptions": {
            "storagePath": storage_path.to_string_lossy()
        },
        "workspaceFolders": [{
            "uri": root_uri,
            "name": "workspace"
        }]
    })
}

/// `window/logMessage` and `window/showMessage` parameters.
#[derive(Debug, Deserialize)]
pub(crate) struct MessageParams {
    #[serde(rename = "type")]
    pub kind: MessageType,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub(crate) enum MessageType {
    Error,
    Warning,
    Info,
    Log,
}

impl From<u8> for MessageType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Error,
            2 => Self::Warning,
            3 => Self::Info,
            _ => Self::Log,
        }
    }
}

pub(crate) fn path_to_file_uri(path: &Path) -> Result<url::Url, PathToUriError> {
    url::Url::from_file_path(path).map_err(|()| PathToUriError {
        path: path.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_params_carry_root_and_storage() {
        let params = initialize_params("file:///workspace", Path::new("/storage"));
        assert!(params["processId"].is_number());
        assert_eq!(params["rootUri"], "file:///workspace");
        assert_eq!(params["workspaceFolders"][0]["uri"], "file:///workspace");
        assert_eq!(params["initializationOptions"]["storagePath"], "/storage");
        assert_eq!(params["capabilities"]["workspace"]["configuration"], true);
    }

    #[test]
    fn classify_response() {
        let frame = serde_json::json!({"jsonrpc": "2.0", "id": 3, "result": null});
        assert!(matches!(classify(&frame), Some(Incoming::Response { id: 3, .. })));
    }

    #[test]
    fn classify_error_response() {
        let frame = serde_json::json!({
            "jsonrpc": "2.0", "id": 4, "error": {"code": -32600, "message": "bad"}
        });
        assert!(matches!(classify(&frame), Some(Incoming::Response { id: 4, .. })));
    }

    #[test]
    fn classify_server_request_keeps_raw_id() {
        let frame = serde_json::json!({
            "jsonrpc": "2.0", "id": "abc", "method": "workspace/configuration", "params": {}
        });
        match classify(&frame) {
            Some(Incoming::ServerRequest { id, method, params }) => {
                assert_eq!(id, "abc");
                assert_eq!(method, "workspace/configuration");
                assert!(params.is_some());
            }
            other => panic!("expected server request, got {other:?}"),
        }
    }

    #[test]
    fn classify_notification() {
        let frame = serde_json::json!({"jsonrpc": "2.0", "method": "window/logMessage"});
        assert!(matches!(
            classify(&frame),
            Some(Incoming::Notification { params: None, .. })
        ));
    }

    #[test]
    fn classify_rejects_malformed() {
        assert!(classify(&serde_json::json!({"jsonrpc": "2.0"})).is_none());
        // Response ids we issue are numeric.
        assert!(classify(&serde_json::json!({"id": "x", "result": 1})).is_none());
    }

    #[test]
    fn message_params_map_levels() {
        let params: MessageParams =
            serde_json::from_value(serde_json::json!({"type": 2, "message": "slow"})).unwrap();
        assert_eq!(params.kind, MessageType::Warning);
        assert_eq!(params.message, "slow");

        let unknown: MessageParams =
            serde_json::from_value(serde_json::json!({"type": 9, "message": "?"})).unwrap();
        assert_eq!(unknown.kind, MessageType::Log);
    }

    #[test]
    fn request_omits_missing_params() {
        let json = serde_json::to_value(Request::new(1, "shutdown", None)).unwrap();
        assert_eq!(json["method"], "shutdown");
        assert!(json.get("params").is_none());
    }

    #[test]
    fn notification_has_no_id() {
        let notification = Notification::new("initialized", Some(serde_json::json!({})));
        let json = serde_json::to_value(notification).unwrap();
        assert!(json.get("id").is_none());
        assert!(json["params"].is_object());
    }

    #[test]
    fn error_response_shape() {
        let json = error_response(serde_json::json!(5), METHOD_NOT_FOUND, "nope".to_string());
        assert_eq!(json["id"], 5);
        assert_eq!(json["error"]["code"], -32601);
    }

    #[cfg(not(windows))]
    #[test]
    fn path_to_file_uri_absolute() {
        let uri = path_to_file_uri(Path::new("/home/dev/project")).unwrap();
        assert_eq!(uri.as_str(), "file:///home/dev/project");
    }

    #[test]
    fn path_to_file_uri_rejects_relative() {
        assert!(path_to_file_uri(Path::new("relative/dir")).is_err());
    }
}
