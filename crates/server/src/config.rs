use quire::PipelineConfig;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub generation_log: GenerationLogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 3000, max_request_size_mb: 16 }
    }
}

impl ServerConfig {
    pub fn max_request_bytes(&self) -> usize {
        self.max_request_size_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationLogConfig {
    /// JSON-lines file receiving one event per generated document. Events
    /// are discarded when unset.
    pub path: Option<PathBuf>,
}

impl Config {
    /// Loads `config/default.toml` (or the file named by `QUIRE_CONFIG`,
    /// without extension) and layers `QUIRE__SECTION__KEY` environment
    /// variables on top. Every file is optional.
    pub fn load() -> Result<Self, config::ConfigError> {
        let defaults = ServerConfig::default();
        let config_path = std::env::var("QUIRE_CONFIG")
            .ok()
            .filter(|path| !path.is_empty())
            .unwrap_or_else(|| "config/default".to_string());

        config::Config::builder()
            .set_default("server.host", defaults.host)?
            .set_default("server.port", i64::from(defaults.port))?
            .set_default("server.max_request_size_mb", defaults.max_request_size_mb as i64)?
            .add_source(config::File::with_name(&config_path).required(false))
            .add_source(
                config::Environment::with_prefix("QUIRE")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}
