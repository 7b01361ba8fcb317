// ABOUTME: Stdio transport for MCP communication.
// ABOUTME: Spawns a subprocess and speaks newline-delimited JSON-RPC over its pipes.

use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::{PendingMap, Transport, await_response, dispatch_response};
use crate::error::McpError;
use crate::mcp::{McpNotification, McpRequest, McpResponse};

/// Stdio transport - spawns a subprocess and communicates via JSON-RPC
/// over stdin/stdout. The JFrog MCP server runs this way.
pub struct StdioTransport {
    child: Mutex<Option<Child>>,
    stdin: Mutex<Option<tokio::process::ChildStdin>>,
    pending: PendingMap,
    reader_handle: Mutex<Option<JoinHandle<()>>>,
}

impl StdioTransport {
    /// Spawn the server subprocess and start the response reader.
    pub async fn connect(
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
    ) -> Result<Self, McpError> {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .envs(env.iter())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = cmd
            .spawn()
            .map_err(|e| McpError::Connection(e.to_string()))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| McpError::Connection("Failed to open stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| McpError::Connection("Failed to open stdout".into()))?;

        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let pending_clone = pending.clone();
        let reader_handle = tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                dispatch_response(&pending_clone, &line).await;
            }
            pending_clone.lock().await.clear();
        });

        Ok(Self {
            child: Mutex::new(Some(child)),
            stdin: Mutex::new(Some(stdin)),
            pending,
            reader_handle: Mutex::new(Some(reader_handle)),
        })
    }

    async fn write_line(&self, json: String) -> Result<(), McpError> {
        let mut stdin = self.stdin.lock().await;
        let stdin_ref = stdin
            .as_mut()
            .ok_or_else(|| McpError::Connection("Server connection closed".into()))?;
        stdin_ref.write_all(json.as_bytes()).await?;
        stdin_ref.write_all(b"\n").await?;
        stdin_ref.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl Transport for StdioTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError> {
        let id = request.id;

        let (tx, rx) = mpsc::channel(1);
        self.pending.lock().await.insert(id, tx);

        let json = serde_json::to_string(&request)?;
        if let Err(e) = self.write_line(json).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        await_response(&self.pending, id, rx).await
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError> {
        let json = serde_json::to_string(&notification)?;
        self.write_line(json).await
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        self.stdin.lock().await.take();

        if let Some(handle) = self.reader_handle.lock().await.take() {
            handle.abort();
        }

        if let Some(mut child) = self.child.lock().await.take() {
            match tokio::time::timeout(std::time::Duration::from_millis(500), child.wait()).await {
                Ok(_) => {}
                Err(_) => {
                    let _ = child.kill().await;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_nonexistent_binary() {
        let result = StdioTransport::connect("/nonexistent/binary", &[], &HashMap::new()).await;

        match result {
            Err(McpError::Connection(_)) => {}
            _ => panic!("Expected McpError::Connection"),
        }
    }

    /// `cat` echoes stdin back on Unix; `findstr "^"` does the same on Windows.
    fn echo_command() -> &'static str {
        if cfg!(target_os = "windows") {
            "findstr"
        } else {
            "cat"
        }
    }

    fn echo_args() -> Vec<String> {
        if cfg!(target_os = "windows") {
            vec!["^".to_string()]
        } else {
            vec![]
        }
    }

    #[tokio::test]
    async fn test_echo_server_round_trip() {
        let transport = StdioTransport::connect(echo_command(), &echo_args(), &HashMap::new())
            .await
            .unwrap();

        // An echo process returns the request verbatim; the reader parses it
        // as a response with the same id and resolves the pending request.
        let request = McpRequest::new("ping", None);
        let id = request.id;
        let response = transport.send(request).await.unwrap();
        assert_eq!(response.id, id);

        transport.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_is_idempotent() {
        let transport = StdioTransport::connect(echo_command(), &echo_args(), &HashMap::new())
            .await
            .unwrap();

        assert!(transport.shutdown().await.is_ok());
        assert!(transport.shutdown().await.is_ok());
    }
}
