// ABOUTME: ScanProjectTool - scans discovered build artifacts with the jf CLI
// ABOUTME: for vulnerabilities and license compliance, one report line each.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{error, info};

use super::{ARTIFACT_EXTENSIONS, CLI_CHECK_TIMEOUT, JFROG_CLI, SCAN_DIRS, SCAN_TIMEOUT, list_files};
use crate::process::ProcessRunner;
use crate::tool::{Tool, ToolResult};

/// Scans a project's build artifacts individually.
pub struct ScanProjectTool {
    runner: Arc<dyn ProcessRunner>,
}

#[derive(Deserialize)]
struct Params {
    project_directory: String,
}

/// Collect artifact files from the conventional output directories.
/// Only the fixed extension list qualifies; extension-less files do not.
fn discover_artifacts(project: &Path) -> Vec<PathBuf> {
    let mut artifacts = Vec::new();
    for dir in SCAN_DIRS {
        let candidate = project.join(dir);
        if !candidate.is_dir() {
            continue;
        }
        let Ok(files) = list_files(&candidate) else {
            continue;
        };
        for file in files {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if ARTIFACT_EXTENSIONS.iter().any(|ext| name.ends_with(ext)) {
                info!(directory = dir, artifact = %name, "found build artifact");
                artifacts.push(file);
            }
        }
    }
    artifacts
}

impl ScanProjectTool {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self { runner }
    }

    /// Check CLI preconditions, discover artifacts, and scan each one.
    ///
    /// Unlike upload, a failing scan never suppresses the other report
    /// lines: every artifact contributes exactly one line to the result.
    pub async fn scan(&self, project_directory: &str) -> ToolResult {
        let project = Path::new(project_directory);
        if !project.is_dir() {
            let message = format!("Directory does not exist: {}", project_directory);
            error!("{}", message);
            return ToolResult::error(message);
        }

        // Both CLI checks run before any discovery walk.
        match self
            .runner
            .run(JFROG_CLI, &["--version"], None, CLI_CHECK_TIMEOUT)
            .await
        {
            Ok(output) if output.success() => {}
            _ => {
                let message = "JFrog CLI (jf) is not installed or not available in PATH";
                error!("{}", message);
                return ToolResult::error(message);
            }
        }

        match self
            .runner
            .run(JFROG_CLI, &["config", "show"], None, CLI_CHECK_TIMEOUT)
            .await
        {
            Ok(output) if output.success() => {}
            _ => {
                let message = "JFrog CLI is not configured. Please run 'jf config' first";
                error!("{}", message);
                return ToolResult::error(message);
            }
        }

        let artifacts = discover_artifacts(project);
        if artifacts.is_empty() {
            return ToolResult::text(format!(
                "No build artifacts found in common build directories ({}) for {}. No scanning performed.",
                SCAN_DIRS.join(", "),
                project_directory
            ));
        }

        info!(count = artifacts.len(), "scanning build artifacts");

        let mut reports = Vec::new();
        for artifact in &artifacts {
            let name = artifact
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            let path = artifact.to_string_lossy().to_string();

            let outcome = self
                .runner
                .run(
                    JFROG_CLI,
                    &["scan", path.as_str()],
                    artifact.parent(),
                    SCAN_TIMEOUT,
                )
                .await;

            let line = match outcome {
                Ok(output) if output.success() => {
                    let trimmed = output.stdout.trim();
                    if trimmed.is_empty() {
                        format!("Scan completed for {} (no issues found)", name)
                    } else {
                        format!("Scan results for {}:\n{}", name, trimmed)
                    }
                }
                Ok(output) => {
                    let message = format!("Scan failed for {}: {}", name, output.stderr);
                    error!("{}", message);
                    message
                }
                Err(e) => {
                    let message = format!("Scan failed for {}: {}", name, e);
                    error!("{}", message);
                    message
                }
            };
            reports.push(line);
        }

        ToolResult::text(format!(
            "JFrog scan completed for build artifacts:\n\n{}",
            reports.join("\n\n")
        ))
        .with_metadata("artifacts", artifacts.len())
    }
}

#[async_trait]
impl Tool for ScanProjectTool {
    fn name(&self) -> &str {
        "jfrog_scan_project"
    }

    fn description(&self) -> &str {
        "Scans build artifacts in a project directory using the JFrog CLI for \
         vulnerabilities and license compliance. Returns one report per artifact."
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "project_directory": {
                    "type": "string",
                    "description": "Path to the project directory to scan for vulnerabilities and license compliance"
                }
            },
            "required": ["project_directory"]
        })
    }

    async fn execute(&self, params: serde_json::Value) -> Result<ToolResult, anyhow::Error> {
        let params: Params = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return Ok(ToolResult::error(format!("Invalid parameters: {}", e))),
        };
        Ok(self.scan(&params.project_directory).await)
    }
}
