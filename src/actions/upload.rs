// ABOUTME: UploadToJfrogTool - uploads every dist/ artifact to Artifactory,
// ABOUTME: via the jf CLI or an authenticated HTTP PUT per artifact.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use super::{JFROG_CLI, OUTPUT_DIR, UPLOAD_TIMEOUT, list_files};
use crate::config::{JfrogConfig, UploadMode};
use crate::process::ProcessRunner;
use crate::tool::{Tool, ToolResult};

/// How artifact bytes reach Artifactory. Both transports satisfy the same
/// contract; only the mechanics differ.
pub enum UploadTransport {
    /// `jf rt u <local> <repository>/<remote>`, pre-configured credentials.
    Cli,
    /// One authenticated PUT per artifact to
    /// `{base_url}/artifactory/{repository}/{path}`.
    Http {
        base_url: Option<String>,
        email: Option<String>,
        token: Option<String>,
        client: reqwest::Client,
    },
}

impl UploadTransport {
    pub fn from_config(config: &JfrogConfig) -> Self {
        match config.upload_mode {
            UploadMode::Cli => Self::Cli,
            UploadMode::Http => Self::Http {
                base_url: config.url.clone(),
                email: config.upload_email.clone(),
                token: config.upload_token.clone(),
                client: reqwest::Client::builder()
                    .timeout(UPLOAD_TIMEOUT)
                    .build()
                    .unwrap_or_else(|_| reqwest::Client::new()),
            },
        }
    }
}

/// Uploads built artifacts from a project's dist directory.
pub struct UploadToJfrogTool {
    runner: Arc<dyn ProcessRunner>,
    transport: UploadTransport,
}

#[derive(Deserialize)]
struct Params {
    project_path: String,
    target_file_path: String,
    repository: String,
}

/// The caller supplies the destination directory; the leaf name is always
/// derived from the artifact itself.
fn destination_path(target_dir: &str, filename: &str) -> String {
    if target_dir.ends_with('/') {
        format!("{}{}", target_dir, filename)
    } else {
        format!("{}/{}", target_dir, filename)
    }
}

impl UploadToJfrogTool {
    pub fn new(runner: Arc<dyn ProcessRunner>, transport: UploadTransport) -> Self {
        Self { runner, transport }
    }

    /// Upload every artifact independently and aggregate the outcomes.
    ///
    /// Aggregation is deliberately asymmetric: if any artifact fails, the
    /// combined result is a Failure carrying only the failure messages.
    pub async fn upload(
        &self,
        project_path: &str,
        target_file_path: &str,
        repository: &str,
    ) -> ToolResult {
        let project = Path::new(project_path);
        if !project.is_dir() {
            let message = format!("Directory does not exist: {}", project_path);
            error!("{}", message);
            return ToolResult::error(message);
        }

        let dist = project.join(OUTPUT_DIR);
        if !dist.exists() {
            let message = format!("No dist directory found at {}", dist.display());
            error!("{}", message);
            return ToolResult::error(message);
        }

        let artifacts = match list_files(&dist) {
            Ok(files) => files,
            Err(e) => {
                let message = format!("Failed to read {}: {}", dist.display(), e);
                error!("{}", message);
                return ToolResult::error(message);
            }
        };
        if artifacts.is_empty() {
            let message = format!("No build artifacts found in {}", dist.display());
            error!("{}", message);
            return ToolResult::error(message);
        }

        // The HTTP transport needs its credentials before any network call.
        if let UploadTransport::Http {
            base_url, token, ..
        } = &self.transport
        {
            if base_url.as_deref().is_none_or(str::is_empty) {
                let message =
                    "JFrog base URL is not configured; set JFROG_URL to upload over HTTP"
                        .to_string();
                error!("{}", message);
                return ToolResult::error(message);
            }
            if token.as_deref().is_none_or(str::is_empty) {
                let message =
                    "JFrog upload token is not configured; set JFROG_UPLOAD_TOKEN to upload over HTTP"
                        .to_string();
                error!("{}", message);
                return ToolResult::error(message);
            }
        }

        let mut successes = Vec::new();
        let mut failures = Vec::new();

        for artifact in &artifacts {
            let filename = artifact
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let destination = destination_path(target_file_path, &filename);
            let source = artifact.to_string_lossy().to_string();

            info!(
                artifact = %source,
                repository,
                path = %destination,
                "uploading artifact"
            );

            match &self.transport {
                UploadTransport::Cli => {
                    let remote = format!("{}/{}", repository, destination);
                    match self
                        .runner
                        .run(
                            JFROG_CLI,
                            &["rt", "u", source.as_str(), remote.as_str()],
                            Some(project),
                            UPLOAD_TIMEOUT,
                        )
                        .await
                    {
                        Ok(output) if output.success() => {
                            successes.push(format!(
                                "Successfully uploaded {} to repository '{}' at path '{}'",
                                source, repository, destination
                            ));
                        }
                        Ok(output) => {
                            let mut message =
                                format!("Upload failed for {}: {}", source, output.stderr);
                            if !output.stdout.is_empty() {
                                message.push_str(&format!("\nStdout: {}", output.stdout));
                            }
                            error!("{}", message);
                            failures.push(message);
                        }
                        Err(e) => {
                            let message = format!("Upload failed for {}: {}", source, e);
                            error!("{}", message);
                            failures.push(message);
                        }
                    }
                }
                UploadTransport::Http {
                    base_url,
                    email,
                    token,
                    client,
                } => {
                    let base = base_url.as_deref().unwrap_or_default();
                    let token = token.as_deref().unwrap_or_default();
                    let username = email.as_deref().unwrap_or_default();
                    match put_artifact(
                        client,
                        base,
                        username,
                        token,
                        repository,
                        &destination,
                        artifact,
                    )
                    .await
                    {
                        Ok(message) => successes.push(message),
                        Err(message) => {
                            error!("{}", message);
                            failures.push(message);
                        }
                    }
                }
            }
        }

        if !failures.is_empty() {
            return ToolResult::error(failures.join("\n"));
        }
        if !successes.is_empty() {
            return ToolResult::text(successes.join("\n"))
                .with_metadata("artifacts", artifacts.len());
        }
        ToolResult::error("No artifacts were uploaded due to an unknown error")
    }
}

/// Issue the single authenticated PUT the HTTP transport contract calls for.
async fn put_artifact(
    client: &reqwest::Client,
    base_url: &str,
    username: &str,
    token: &str,
    repository: &str,
    destination: &str,
    artifact: &Path,
) -> Result<String, String> {
    let source = artifact.display();
    let bytes = tokio::fs::read(artifact)
        .await
        .map_err(|e| format!("Upload failed for {}: {}", source, e))?;

    let url = format!(
        "{}/artifactory/{}/{}",
        base_url.trim_end_matches('/'),
        repository,
        destination
    );

    let response = client
        .put(&url)
        .basic_auth(username, Some(token))
        .body(bytes)
        .send()
        .await
        .map_err(|e| format!("Upload failed for {}: {}", source, e))?;

    let status = response.status();
    if status.is_success() {
        Ok(format!("Successfully uploaded {} to {}", source, url))
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(format!(
            "Upload failed for {}: HTTP {} - {}",
            source,
            status.as_u16(),
            body
        ))
    }
}

#[async_trait]
impl Tool for UploadToJfrogTool {
    fn name(&self) -> &str {
        "upload_to_jfrog"
    }

    fn description(&self) -> &str {
        "Uploads built artifacts from a project's dist directory to JFrog \
         Artifactory. The target path is treated as a directory; each \
         artifact keeps its own filename."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project_path": {
                    "type": "string",
                    "description": "Path to the project directory containing built artifacts in dist/ folder"
                },
                "target_file_path": {
                    "type": "string",
                    "description": "Target directory path in the JFrog repository (e.g. 'python-packages/'). The actual filename is taken from each artifact."
                },
                "repository": {
                    "type": "string",
                    "description": "JFrog repository name"
                }
            },
            "required": ["project_path", "target_file_path", "repository"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(format!("Invalid parameters: {}", e))),
        };
        Ok(self
            .upload(
                &params.project_path,
                &params.target_file_path,
                &params.repository,
            )
            .await)
    }
}
