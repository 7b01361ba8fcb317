// ABOUTME: JFrog Artifactory agent binary - wires Coral, the JFrog MCP server,
// ABOUTME: and the local action tools into the mention loop.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use coral_agent::prelude::*;

/// Connect and initialize one MCP server.
async fn connect_server(config: McpServerConfig) -> Result<Arc<McpClient>> {
    let name = config.name.clone();
    let mut client = McpClient::connect(config)
        .await
        .with_context(|| format!("connecting to {} server", name))?;
    client
        .initialize()
        .await
        .with_context(|| format!("initializing {} server", name))?;
    Ok(Arc::new(client))
}

/// Spawn the JFrog MCP server if credentials are present.
///
/// Missing credentials degrade to the reduced tool set instead of crashing;
/// upload and scan still work through the local action tools.
async fn connect_platform(jfrog: &JfrogConfig) -> Option<Arc<McpClient>> {
    let (Some(url), Some(token)) = (&jfrog.url, &jfrog.access_token) else {
        warn!("JFROG_URL or JFROG_ACCESS_TOKEN not set; platform tools disabled");
        return None;
    };

    let mut env = HashMap::new();
    env.insert("JFROG_URL".to_string(), url.clone());
    env.insert("JFROG_ACCESS_TOKEN".to_string(), token.clone());

    let config = McpServerConfig {
        name: "jfrog".into(),
        transport: McpTransportConfig::Stdio {
            command: "npm".into(),
            args: vec![
                "exec".into(),
                "-y".into(),
                "github:jfrog/mcp-jfrog".into(),
            ],
            env,
        },
    };

    match connect_server(config).await {
        Ok(client) => Some(client),
        Err(e) => {
            warn!(error = %e, "JFrog MCP server unavailable; platform tools disabled");
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Outside devmode the orchestrator injects the environment directly.
    let runtime =
        std::env::var("CORAL_ORCHESTRATION_RUNTIME").unwrap_or_else(|_| "devmode".into());
    if runtime == "devmode" {
        let _ = dotenvy::dotenv();
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    let client = build_client(&settings.model);

    let coral_url = settings.coral.connection_url();
    info!(url = %coral_url, "connecting to Coral server");
    let coral = connect_server(McpServerConfig {
        name: "coral".into(),
        transport: McpTransportConfig::Sse { url: coral_url },
    })
    .await?;
    info!("Coral server connection established");

    let platform = connect_platform(&settings.jfrog).await;

    // Candidates in discovery order: coral, platform, then local actions.
    let mut candidates = discover_tools(coral.clone(), ToolOrigin::Coral).await?;
    info!(count = candidates.len(), "Coral tools discovered");

    if let Some(platform) = &platform {
        let tools = discover_tools(platform.clone(), ToolOrigin::Platform).await?;
        info!(count = tools.len(), "JFrog platform tools discovered");
        candidates.extend(tools);
    }

    let runner: Arc<dyn ProcessRunner> = Arc::new(SystemRunner);
    candidates.extend(action_tools(runner, &settings.jfrog));

    let report = validate_tools(candidates);
    let registry = Registry::new();
    for tool in report.valid {
        registry.register_arc(tool).await;
    }
    info!(tools = registry.count().await, "registry ready");

    let planner = Planner::new(client, registry.clone(), &settings.model);
    let mention_loop = MentionLoop::new(planner, registry);

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_cancel.cancel();
        }
    });

    mention_loop.run(cancel).await;

    if let Some(platform) = &platform {
        let _ = platform.shutdown().await;
    }
    let _ = coral.shutdown().await;

    Ok(())
}
