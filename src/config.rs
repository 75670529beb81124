use crate::storage::StorageAccount;
use std::env;
use std::sync::OnceLock;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable {name}: {reason}")]
    InvalidValue {
        /// Name of the offending variable.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Runtime configuration for the ragbridge server.
///
/// Every value is resolved and validated once during process start so that a
/// missing variable aborts startup with its name instead of surfacing as a
/// mid-request failure.
#[derive(Debug)]
pub struct Config {
    /// Base URL of the Azure OpenAI resource.
    pub openai_endpoint: String,
    /// API key for the Azure OpenAI resource.
    pub openai_api_key: String,
    /// REST API version passed on every Azure OpenAI call.
    pub openai_api_version: String,
    /// Deployment name of the embedding model.
    pub embedding_deployment: String,
    /// Deployment name of the chat-completion model.
    pub chat_deployment: String,
    /// Parsed blob-storage account used for document downloads.
    pub storage: StorageAccount,
    /// Base URL of the hosted search service.
    pub search_endpoint: String,
    /// API key for the hosted search service.
    pub search_api_key: String,
    /// REST API version passed on every search-service call.
    pub search_api_version: String,
    /// Name of the index that ingestion writes into.
    pub index_name: String,
    /// System-message template prefixed to the grounding content.
    pub system_message_template: String,
    /// Maximum chunk length in characters.
    pub chunk_size: usize,
    /// Character overlap between adjacent chunks.
    pub chunk_overlap: usize,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
}

const DEFAULT_EMBEDDING_DEPLOYMENT: &str = "text-embedding-3-small";
const DEFAULT_CHAT_DEPLOYMENT: &str = "gpt-35-turbo-16k";
const DEFAULT_SEARCH_API_VERSION: &str = "2024-07-01";
const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 250;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_raw = load_env("AZURE_STORAGE_CONNECTION_STRING")?;
        let storage =
            StorageAccount::parse(&storage_raw).map_err(|reason| ConfigError::InvalidValue {
                name: "AZURE_STORAGE_CONNECTION_STRING".to_string(),
                reason,
            })?;

        Ok(Self {
            openai_endpoint: load_env("AZURE_OPENAI_ENDPOINT")?,
            openai_api_key: load_env("AZURE_OPENAI_API_KEY")?,
            openai_api_version: load_env("AZURE_OPENAI_API_VERSION")?,
            embedding_deployment: load_env_optional("EMBEDDING_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_EMBEDDING_DEPLOYMENT.to_string()),
            chat_deployment: load_env_optional("CHAT_DEPLOYMENT")
                .unwrap_or_else(|| DEFAULT_CHAT_DEPLOYMENT.to_string()),
            storage,
            search_endpoint: load_env("AZURE_SEARCH_ENDPOINT")?,
            search_api_key: load_env("AZURE_SEARCH_KEY")?,
            search_api_version: load_env_optional("SEARCH_API_VERSION")
                .unwrap_or_else(|| DEFAULT_SEARCH_API_VERSION.to_string()),
            index_name: load_env("INDEX_NAME")?,
            system_message_template: load_env("SYSTEM_MESSAGE_TEMPLATE")?,
            chunk_size: parse_optional("CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE),
            chunk_overlap: parse_optional("CHUNK_OVERLAP")?.unwrap_or(DEFAULT_CHUNK_OVERLAP),
            server_port: parse_optional("SERVER_PORT")?,
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value.parse().map_err(|_| ConfigError::InvalidValue {
                name: key.to_string(),
                reason: format!("could not parse '{value}'"),
            })
        })
        .transpose()
}

/// Global configuration cache populated during process start.
pub static CONFIG: OnceLock<Config> = OnceLock::new();

/// Retrieve the loaded configuration, panicking if initialization has not occurred.
pub fn get_config() -> &'static Config {
    CONFIG.get().expect("Config not initialized")
}

/// Load configuration from the environment and install it in the global cache.
pub fn init_config() {
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load config from environment");
    tracing::debug!(
        openai_endpoint = %config.openai_endpoint,
        search_endpoint = %config.search_endpoint,
        index = %config.index_name,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        server_port = ?config.server_port,
        "Loaded configuration"
    );
    CONFIG.set(config).expect("Failed to set config");
}
