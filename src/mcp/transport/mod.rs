// ABOUTME: Transport abstraction for MCP communication.
// ABOUTME: Re-exports the SSE (Coral) and stdio (JFrog MCP) implementations.

mod sse;
mod stdio;

pub use sse::SseTransport;
pub use stdio::StdioTransport;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use super::{McpNotification, McpRequest, McpResponse};
use crate::error::McpError;

/// How long a single JSON-RPC request may wait for its response.
/// The Coral wait tool legitimately holds a request for its 30s mention
/// timeout, so the transport ceiling must comfortably outlast it.
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// In-flight requests keyed by JSON-RPC id, resolved by the reader task.
pub(crate) type PendingMap = Arc<Mutex<HashMap<u64, mpsc::Sender<McpResponse>>>>;

/// Trait for MCP transport implementations.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and receive a response.
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError>;

    /// Send a notification (no response expected).
    async fn notify(&self, notification: McpNotification) -> Result<(), McpError>;

    /// Shutdown the transport.
    async fn shutdown(&self) -> Result<(), McpError>;
}

/// Park a response channel for `id` and await its resolution.
pub(crate) async fn await_response(
    pending: &PendingMap,
    id: u64,
    mut rx: mpsc::Receiver<McpResponse>,
) -> Result<McpResponse, McpError> {
    match tokio::time::timeout(REQUEST_TIMEOUT, rx.recv()).await {
        Ok(Some(response)) => Ok(response),
        Ok(None) => Err(McpError::Protocol("No response received".into())),
        Err(_) => {
            pending.lock().await.remove(&id);
            Err(McpError::Protocol("Request timed out".into()))
        }
    }
}

/// Route an incoming response line to whichever request is waiting on it.
pub(crate) async fn dispatch_response(pending: &PendingMap, line: &str) {
    if let Ok(response) = serde_json::from_str::<McpResponse>(line) {
        let mut pending = pending.lock().await;
        if let Some(tx) = pending.remove(&response.id) {
            let _ = tx.send(response).await;
        }
    }
}
