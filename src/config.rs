// ABOUTME: Settings structs built once from the environment at startup.
// ABOUTME: Constructed through an injectable lookup so tests never touch process env.

use crate::error::ConfigError;

/// Default description advertised to the Coral server when registering.
pub const DEFAULT_AGENT_DESCRIPTION: &str = "An agent capable of managing JFrog Artifactory: \
building projects, uploading artifacts, scanning for vulnerabilities and license compliance, \
and executing repository queries on behalf of other agents.";

/// Which LLM provider backs the planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    OpenAi,
    Anthropic,
}

impl ModelProvider {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ConfigError::Invalid {
                var: "MODEL_PROVIDER",
                message: format!("unknown provider '{}'", other),
            }),
        }
    }
}

/// How artifacts are uploaded to Artifactory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadMode {
    /// `jf rt u`, relying on pre-configured CLI credentials.
    #[default]
    Cli,
    /// Authenticated HTTP PUT per artifact.
    Http,
}

impl UploadMode {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value {
            "cli" => Ok(Self::Cli),
            "http" => Ok(Self::Http),
            other => Err(ConfigError::Invalid {
                var: "JFROG_UPLOAD_MODE",
                message: format!("unknown upload mode '{}'", other),
            }),
        }
    }
}

/// Connection settings for the Coral message bus.
#[derive(Debug, Clone)]
pub struct CoralConfig {
    pub sse_url: String,
    pub agent_id: String,
    pub agent_description: String,
}

impl CoralConfig {
    /// Full SSE URL including the registration query string.
    pub fn connection_url(&self) -> String {
        format!(
            "{}?agentId={}&agentDescription={}",
            self.sse_url,
            urlencoding::encode(&self.agent_id),
            urlencoding::encode(&self.agent_description)
        )
    }
}

/// Settings for the chat-completion backend.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub name: String,
    pub provider: ModelProvider,
    pub api_key: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Artifactory-side settings. Everything here is optional: a missing
/// credential surfaces later as a recoverable tool Failure, never a crash.
#[derive(Debug, Clone, Default)]
pub struct JfrogConfig {
    pub url: Option<String>,
    pub access_token: Option<String>,
    pub upload_email: Option<String>,
    pub upload_token: Option<String>,
    pub upload_mode: UploadMode,
}

/// All agent settings, constructed once and passed by reference.
#[derive(Debug, Clone)]
pub struct Settings {
    pub coral: CoralConfig,
    pub model: ModelConfig,
    pub jfrog: JfrogConfig,
}

impl Settings {
    /// Build settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            match lookup(key) {
                Some(v) if !v.is_empty() => Ok(v),
                _ => Err(ConfigError::Missing(key)),
            }
        };

        let coral = CoralConfig {
            sse_url: required("CORAL_SSE_URL")?,
            agent_id: required("CORAL_AGENT_ID")?,
            agent_description: lookup("CORAL_AGENT_DESCRIPTION")
                .unwrap_or_else(|| DEFAULT_AGENT_DESCRIPTION.to_string()),
        };

        let temperature = match lookup("MODEL_TEMPERATURE") {
            Some(raw) => raw.parse::<f64>().map_err(|e| ConfigError::Invalid {
                var: "MODEL_TEMPERATURE",
                message: e.to_string(),
            })?,
            None => 0.3,
        };
        let max_tokens = match lookup("MODEL_TOKEN") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                var: "MODEL_TOKEN",
                message: e.to_string(),
            })?,
            None => 4000,
        };

        let model = ModelConfig {
            name: lookup("MODEL_NAME").unwrap_or_else(|| "gpt-4.1".to_string()),
            provider: ModelProvider::parse(
                &lookup("MODEL_PROVIDER").unwrap_or_else(|| "openai".to_string()),
            )?,
            api_key: required("API_KEY")?,
            temperature,
            max_tokens,
        };

        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let jfrog = JfrogConfig {
            url: non_empty("JFROG_URL"),
            access_token: non_empty("JFROG_ACCESS_TOKEN"),
            upload_email: non_empty("JFROG_UPLOAD_EMAIL"),
            upload_token: non_empty("JFROG_UPLOAD_TOKEN"),
            upload_mode: match lookup("JFROG_UPLOAD_MODE") {
                Some(raw) => UploadMode::parse(&raw)?,
                None => UploadMode::Cli,
            },
        };

        Ok(Self {
            coral,
            model,
            jfrog,
        })
    }
}
