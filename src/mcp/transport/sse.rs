// ABOUTME: SSE transport for MCP communication - the Coral server's transport.
// ABOUTME: GET an event stream for responses, POST requests to the advertised endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use super::{PendingMap, Transport, await_response, dispatch_response};
use crate::error::McpError;
use crate::mcp::{McpNotification, McpRequest, McpResponse};

/// SSE transport - connects to an HTTP endpoint using Server-Sent Events.
///
/// The server first emits an `endpoint` event naming the URL to POST
/// messages to; every JSON-RPC response then arrives as a `message` event.
pub struct SseTransport {
    messages_url: String,
    http_client: reqwest::Client,
    pending: PendingMap,
    sse_handle: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: Mutex<Option<mpsc::Sender<()>>>,
}

/// One parsed SSE event: event type plus accumulated data lines.
#[derive(Default)]
struct SseEvent {
    event_type: String,
    data: String,
}

impl SseTransport {
    /// Connect to an SSE MCP server.
    pub async fn connect(url: &str) -> Result<Self, McpError> {
        let http_client = reqwest::Client::new();
        let pending: PendingMap = Arc::new(Mutex::new(HashMap::new()));

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let (endpoint_tx, mut endpoint_rx) = mpsc::channel::<String>(1);

        let sse_url = url.to_string();
        let pending_clone = pending.clone();
        let client_clone = http_client.clone();

        let sse_handle = tokio::spawn(async move {
            let response = match client_clone
                .get(&sse_url)
                .header("Accept", "text/event-stream")
                .send()
                .await
            {
                Ok(resp) => resp,
                Err(_) => return,
            };

            let mut stream = response.bytes_stream();
            let mut buffer = String::new();
            let mut event = SseEvent::default();

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    chunk = stream.next() => {
                        let Some(Ok(bytes)) = chunk else { break };
                        buffer.push_str(&String::from_utf8_lossy(&bytes));

                        while let Some(pos) = buffer.find('\n') {
                            let line = buffer[..pos].trim_end_matches('\r').to_string();
                            buffer = buffer[pos + 1..].to_string();

                            if line.is_empty() {
                                // Blank line terminates one event.
                                match event.event_type.as_str() {
                                    "endpoint" => {
                                        let _ = endpoint_tx.send(event.data.clone()).await;
                                    }
                                    "message" => {
                                        dispatch_response(&pending_clone, &event.data).await;
                                    }
                                    _ => {}
                                }
                                event = SseEvent::default();
                            } else if let Some(value) = line.strip_prefix("event: ") {
                                event.event_type = value.to_string();
                            } else if let Some(value) = line.strip_prefix("data: ") {
                                if !event.data.is_empty() {
                                    event.data.push('\n');
                                }
                                event.data.push_str(value);
                            }
                        }
                    }
                }
            }
        });

        // The endpoint event must arrive before any request can be sent.
        let endpoint =
            tokio::time::timeout(std::time::Duration::from_secs(10), endpoint_rx.recv())
                .await
                .map_err(|_| McpError::Connection("Timeout waiting for endpoint event".into()))?
                .ok_or_else(|| McpError::Connection("No endpoint event received".into()))?;

        let messages_url = if endpoint.starts_with("http") {
            endpoint
        } else {
            let base = reqwest::Url::parse(url)
                .map_err(|e| McpError::Connection(format!("Invalid base URL: {}", e)))?;
            base.join(&endpoint)
                .map_err(|e| McpError::Connection(format!("Failed to resolve endpoint: {}", e)))?
                .to_string()
        };

        Ok(Self {
            messages_url,
            http_client,
            pending,
            sse_handle: Mutex::new(Some(sse_handle)),
            shutdown_tx: Mutex::new(Some(shutdown_tx)),
        })
    }

    async fn post_json(&self, json: String) -> Result<(), McpError> {
        self.http_client
            .post(&self.messages_url)
            .header("Content-Type", "application/json")
            .body(json)
            .send()
            .await
            .map_err(|e| McpError::Connection(format!("POST failed: {}", e)))?;
        Ok(())
    }
}

#[async_trait]
impl Transport for SseTransport {
    async fn send(&self, request: McpRequest) -> Result<McpResponse, McpError> {
        let id = request.id;

        let (tx, rx) = mpsc::channel(1);
        self.pending.lock().await.insert(id, tx);

        let json = serde_json::to_string(&request)?;
        if let Err(e) = self.post_json(json).await {
            self.pending.lock().await.remove(&id);
            return Err(e);
        }

        await_response(&self.pending, id, rx).await
    }

    async fn notify(&self, notification: McpNotification) -> Result<(), McpError> {
        let json = serde_json::to_string(&notification)?;
        self.post_json(json).await
    }

    async fn shutdown(&self) -> Result<(), McpError> {
        if let Some(tx) = self.shutdown_tx.lock().await.take() {
            let _ = tx.send(()).await;
        }

        if let Some(handle) = self.sse_handle.lock().await.take() {
            handle.abort();
        }

        Ok(())
    }
}
