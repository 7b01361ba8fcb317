// ABOUTME: Local action tools - build, upload, build-and-upload, and scan.
// ABOUTME: Shared constants, discovery helpers, and the tool set constructor.

mod build;
mod compose;
mod scan;
mod upload;

pub use build::BuildProjectTool;
pub use compose::BuildAndUploadTool;
pub use scan::ScanProjectTool;
pub use upload::{UploadToJfrogTool, UploadTransport};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::config::JfrogConfig;
use crate::process::ProcessRunner;
use crate::tool::Tool;

/// Manifest files that mark a directory as a buildable project.
pub(crate) const PROJECT_MANIFESTS: [&str; 2] = ["pyproject.toml", "setup.py"];

/// Where the build step leaves its artifacts, relative to the project root.
pub(crate) const OUTPUT_DIR: &str = "dist";

/// Conventional output directories searched during scan discovery.
pub(crate) const SCAN_DIRS: [&str; 5] = ["dist", "build", "target", "out", "bin"];

/// Extensions that qualify a file as a scannable build artifact.
/// Extension-less files are deliberately not treated as artifacts.
pub(crate) const ARTIFACT_EXTENSIONS: [&str; 10] = [
    ".tar.gz", ".whl", ".egg", ".jar", ".war", ".ear", ".zip", ".rpm", ".deb", ".msi",
];

/// The Artifactory CLI binary.
pub(crate) const JFROG_CLI: &str = "jf";

// Per-operation-class ceilings for external invocations.
pub(crate) const BUILD_TIMEOUT: Duration = Duration::from_secs(600);
pub(crate) const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);
pub(crate) const SCAN_TIMEOUT: Duration = Duration::from_secs(600);
pub(crate) const CLI_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

/// List the plain files directly inside `dir`, sorted by name.
pub(crate) fn list_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Construct the full set of locally-declared action tools.
pub fn action_tools(runner: Arc<dyn ProcessRunner>, jfrog: &JfrogConfig) -> Vec<Arc<dyn Tool>> {
    let build = Arc::new(BuildProjectTool::new(runner.clone()));
    let upload = Arc::new(UploadToJfrogTool::new(
        runner.clone(),
        UploadTransport::from_config(jfrog),
    ));
    let build_and_upload = Arc::new(BuildAndUploadTool::new(build.clone(), upload.clone()));
    let scan = Arc::new(ScanProjectTool::new(runner));

    vec![
        build as Arc<dyn Tool>,
        upload as Arc<dyn Tool>,
        build_and_upload as Arc<dyn Tool>,
        scan as Arc<dyn Tool>,
    ]
}
