use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use domain_notes::generation::DEFAULT_ANSWER_LANGUAGE;
use domain_notes::{OllamaConfig, StoreConfig};

pub use core_config::Environment;

/// Application configuration
/// Composes the shared server config with the notes domain settings
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub ollama: OllamaConfig,
    pub store: StoreConfig,
    /// Language the model is asked to answer in.
    pub answer_language: String,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?; // HOST=0.0.0.0, PORT=5000
        let ollama = OllamaConfig::from_env()?;
        let store = StoreConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            server,
            ollama,
            store,
            answer_language: env_or_default("ANSWER_LANGUAGE", DEFAULT_ANSWER_LANGUAGE),
            environment,
        })
    }
}
