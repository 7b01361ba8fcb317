// ABOUTME: BuildAndUploadTool - sequential composition of build then upload.
// ABOUTME: A build failure short-circuits; upload never runs on a broken build.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use super::{BuildProjectTool, UploadToJfrogTool};
use crate::tool::{Tool, ToolResult};

/// Builds a project and, if that succeeds, uploads its artifacts.
pub struct BuildAndUploadTool {
    build: Arc<BuildProjectTool>,
    upload: Arc<UploadToJfrogTool>,
}

fn default_build_required() -> bool {
    true
}

#[derive(Deserialize)]
struct Params {
    project_path: String,
    target_file_path: String,
    repository: String,
    #[serde(default = "default_build_required")]
    build_required: bool,
}

impl BuildAndUploadTool {
    pub fn new(build: Arc<BuildProjectTool>, upload: Arc<UploadToJfrogTool>) -> Self {
        Self { build, upload }
    }

    pub async fn build_and_upload(
        &self,
        project_path: &str,
        target_file_path: &str,
        repository: &str,
        build_required: bool,
    ) -> ToolResult {
        let built = self.build.build(project_path, build_required).await;
        if built.is_error {
            return built;
        }

        let uploaded = self
            .upload
            .upload(project_path, target_file_path, repository)
            .await;
        if uploaded.is_error {
            return uploaded;
        }

        ToolResult::text(format!("{}\n\n{}", built.content, uploaded.content))
    }
}

#[async_trait]
impl Tool for BuildAndUploadTool {
    fn name(&self) -> &str {
        "build_and_upload_to_jfrog"
    }

    fn description(&self) -> &str {
        "Builds a Python project and uploads the resulting artifacts to JFrog \
         Artifactory in one step. Skips the upload entirely if the build fails."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project_path": {
                    "type": "string",
                    "description": "Path to the project directory containing pyproject.toml or setup.py"
                },
                "target_file_path": {
                    "type": "string",
                    "description": "Target directory path in the JFrog repository. The actual filename is taken from each artifact."
                },
                "repository": {
                    "type": "string",
                    "description": "JFrog repository name"
                },
                "build_required": {
                    "type": "boolean",
                    "description": "Whether to build before uploading",
                    "default": true
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
            .build_and_upload(
                &params.project_path,
                &params.target_file_path,
                &params.repository,
                params.build_required,
            )
            .await)
    }
}
