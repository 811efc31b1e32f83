//! Service configuration: a TOML file overlaid with environment variables.

mod error;

pub use error::ConfigError;

use brain_core::agent::{DEFAULT_MAX_ITERATIONS, DEFAULT_MODEL};
use brain_core::model::{ProviderKind, ProviderSettings};
use serde::Deserialize;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_PATH: &str = "config/brain.toml";

const ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com";
const OLLAMA_BASE_URL: &str = "http://localhost:11434";
const OLLAMA_MODEL: &str = "llama3.1";
const TOOL_HOST: &str = "host.docker.internal";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub agent: AgentSettings,
    pub history: HistorySettings,
    pub logging: LoggingSettings,
    pub tools: ToolSettings,
    /// Tool servers. Empty means the built-in set.
    pub servers: Vec<ServerConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: ProviderKind,
    pub model: String,
    pub anthropic_api_key: Option<String>,
    pub anthropic_endpoint: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            model: DEFAULT_MODEL.to_string(),
            anthropic_api_key: None,
            anthropic_endpoint: ANTHROPIC_ENDPOINT.to_string(),
            ollama_base_url: OLLAMA_BASE_URL.to_string(),
            ollama_model: OLLAMA_MODEL.to_string(),
            max_tokens: 4096,
            temperature: 0.7,
            timeout_secs: 120,
        }
    }
}

impl LlmSettings {
    /// Model name sent with every request for the selected provider.
    pub fn active_model(&self) -> &str {
        match self.provider {
            ProviderKind::Anthropic => &self.model,
            ProviderKind::Ollama => &self.ollama_model,
        }
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        let (endpoint, api_key) = match self.provider {
            ProviderKind::Anthropic => (
                self.anthropic_endpoint.clone(),
                self.anthropic_api_key.clone(),
            ),
            ProviderKind::Ollama => (self.ollama_base_url.clone(), None),
        };
        ProviderSettings {
            kind: self.provider,
            endpoint,
            api_key,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub max_iterations: usize,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryBackend {
    #[default]
    Redis,
    Memory,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub backend: HistoryBackend,
    pub redis_host: String,
    pub redis_port: u16,
    pub redis_db: u32,
    pub max_messages: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            backend: HistoryBackend::Redis,
            redis_host: "localhost".to_string(),
            redis_port: 6379,
            redis_db: 0,
            max_messages: 50,
        }
    }
}

impl HistorySettings {
    pub fn redis_url(&self) -> String {
        format!(
            "redis://{}:{}/{}",
            self.redis_host, self.redis_port, self.redis_db
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub timeout_secs: u64,
    /// Home-lab address hosting the Home Assistant tool server.
    pub homelab_ip: Option<String>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            homelab_ip: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    pub name: String,
    pub url: String,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl AppConfig {
    /// Read `path`, or `config/brain.toml` when none is given. A missing
    /// default file yields defaults; a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return read_config(path);
        }
        match read_config(Path::new(CONFIG_PATH)) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                info!("Configuration file not found; using defaults");
                Ok(Self::default())
            }
            Err(other) => Err(other),
        }
    }

    /// Loads the file and then applies process environment overrides.
    pub fn from_env(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };

        if let Some(key) = env.string("ANTHROPIC_API_KEY") {
            self.llm.anthropic_api_key = Some(key);
        }
        if let Some(provider) = env.string("LLM_PROVIDER") {
            self.llm.provider = match provider.to_ascii_lowercase().as_str() {
                "anthropic" => ProviderKind::Anthropic,
                "ollama" => ProviderKind::Ollama,
                _ => return Err(ConfigError::invalid_env("LLM_PROVIDER", &provider)),
            };
        }
        env.assign("DEFAULT_MODEL", &mut self.llm.model);
        env.assign("OLLAMA_BASE_URL", &mut self.llm.ollama_base_url);
        env.assign("OLLAMA_MODEL", &mut self.llm.ollama_model);
        env.parse("MAX_TOKENS", &mut self.llm.max_tokens)?;
        env.parse("TEMPERATURE", &mut self.llm.temperature)?;

        env.assign("REDIS_HOST", &mut self.history.redis_host);
        env.parse("REDIS_PORT", &mut self.history.redis_port)?;
        env.parse("REDIS_DB", &mut self.history.redis_db)?;

        env.assign("BRAIN_HOST", &mut self.server.host);
        env.parse("BRAIN_PORT", &mut self.server.port)?;

        if let Some(ip) = env.string("HOMELAB_TAILSCALE_IP") {
            self.tools.homelab_ip = Some(ip);
        }
        env.assign("LOG_LEVEL", &mut self.logging.level);
        env.parse("LOG_JSON", &mut self.logging.json)?;
        env.parse("MAX_ITERATIONS", &mut self.agent.max_iterations)?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        let address = format!("{}:{}", self.server.host, self.server.port);
        address
            .parse()
            .map_err(|_| ConfigError::InvalidAddress { address })
    }

    /// Configured tool servers, or the built-in set when none are listed.
    pub fn tool_servers(&self) -> Vec<ServerConfig> {
        if !self.servers.is_empty() {
            return self.servers.clone();
        }
        default_servers(self.tools.homelab_ip.as_deref())
    }
}

fn default_servers(homelab_ip: Option<&str>) -> Vec<ServerConfig> {
    let mut servers = vec![
        ServerConfig::new("filesystem", format!("http://{TOOL_HOST}:8001/sse")),
        ServerConfig::new("shell", format!("http://{TOOL_HOST}:8002/sse")),
        ServerConfig::new("browser", format!("http://{TOOL_HOST}:8003/sse")),
    ];
    if let Some(ip) = homelab_ip.filter(|ip| !ip.trim().is_empty()) {
        servers.push(ServerConfig::new(
            "homeassistant",
            format!("http://{ip}:8010/sse"),
        ));
    }
    servers.push(ServerConfig::new(
        "todoist",
        format!("http://{TOOL_HOST}:8011/sse"),
    ));
    servers
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|value| !value.trim().is_empty())
    }

    fn assign(&self, var: &str, target: &mut String) {
        if let Some(value) = self.string(var) {
            *target = value;
        }
    }

    fn parse<T: FromStr>(&self, var: &str, target: &mut T) -> Result<(), ConfigError> {
        if let Some(value) = self.string(var) {
            *target = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_env(var, &value))?;
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
