// ABOUTME: BuildProjectTool - builds a Python project with uv and lists the
// ABOUTME: resulting dist/ artifacts, or explains exactly what went wrong.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::{BUILD_TIMEOUT, OUTPUT_DIR, PROJECT_MANIFESTS, list_files};
use crate::error::ProcessError;
use crate::process::ProcessRunner;
use crate::tool::{Tool, ToolResult};

/// Builds a project and reports its artifacts.
pub struct BuildProjectTool {
    runner: Arc<dyn ProcessRunner>,
}

fn default_build_required() -> bool {
    true
}

#[derive(Deserialize)]
struct Params {
    project_path: String,
    #[serde(default = "default_build_required")]
    build_required: bool,
}

impl BuildProjectTool {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Validate the project, optionally build it, and enumerate artifacts.
    ///
    /// Never returns more than one result and never propagates an error;
    /// every failure is rendered into the result message.
    pub async fn build(&self, project_path: &str, build_required: bool) -> ToolResult {
        let project = Path::new(project_path);
        if !project.is_dir() {
            let message = format!("Directory does not exist: {}", project_path);
            error!("{}", message);
            return ToolResult::error(message);
        }

        if !PROJECT_MANIFESTS.iter().any(|m| project.join(m).exists()) {
            let message = format!("No pyproject.toml or setup.py found in {}", project_path);
            error!("{}", message);
            return ToolResult::error(message);
        }

        if build_required {
            info!(project = project_path, "building project");
            match self
                .runner
                .run("uv", &["build", project_path], Some(project), BUILD_TIMEOUT)
                .await
            {
                Ok(output) if output.success() => debug!("build completed"),
                Ok(output) => {
                    let message = format!("Build failed: {}", output.stderr);
                    error!("{}", message);
                    return ToolResult::error(message);
                }
                Err(ProcessError::TimedOut { seconds, .. }) => {
                    let message = format!(
                        "Build timed out after {}s for {}",
                        seconds, project_path
                    );
                    error!("{}", message);
                    return ToolResult::error(message);
                }
                Err(e) => {
                    let message = format!("Failed to start build: {}", e);
                    error!("{}", message);
                    return ToolResult::error(message);
                }
            }
        } else {
            debug!("build skipped, build_required=false");
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

        let listing = artifacts
            .iter()
            .filter_map(|p| p.file_name())
            .map(|name| format!("  - {}", name.to_string_lossy()))
            .collect::<Vec<_>>()
            .join("\n");

        info!(count = artifacts.len(), "build artifacts located");
        ToolResult::text(format!(
            "Project built successfully. Build artifacts found in {}:\n{}",
            dist.display(),
            listing
        ))
        .with_metadata("artifacts", artifacts.len())
    }
}

#[async_trait]
impl Tool for BuildProjectTool {
    fn name(&self) -> &str {
        "build_project"
    }

    fn description(&self) -> &str {
        "Builds a Python project using uv, creating distribution packages (source \
         distribution and wheel). Returns the location of build artifacts or an \
         error message if the build fails."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project_path": {
                    "type": "string",
                    "description": "Path to the project directory containing pyproject.toml or setup.py"
                },
                "build_required": {
                    "type": "boolean",
                    "description": "Whether to build the project",
                    "default": true
                }
            },
            "required": ["project_path"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(format!("Invalid parameters: {}", e))),
        };
        Ok(self.build(&params.project_path, params.build_required).await)
    }
}
