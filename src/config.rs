use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{EmbedError, EmbedResult};

/// Environment variable holding the embedding API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the OpenAI-compatible API; `/embeddings` is appended.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Output dimensions, only sent when the model supports shortening.
    #[serde(default)]
    pub dimensions: Option<usize>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Optional key stored in config.toml (overridden by OPENAI_API_KEY).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            model: default_model(),
            dimensions: None,
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default = "default_text_column")]
    pub text_column: String,
    #[serde(default = "default_embedding_column")]
    pub embedding_column: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
            delimiter: default_delimiter(),
            text_column: default_text_column(),
            embedding_column: default_embedding_column(),
        }
    }
}

impl PipelineConfig {
    /// The delimiter as the single byte the CSV reader and writer expect.
    pub fn delimiter_byte(&self) -> EmbedResult<u8> {
        let usable = self.delimiter.is_ascii()
            && self.delimiter != '"'
            && (self.delimiter == '\t' || !self.delimiter.is_ascii_control());
        if usable {
            Ok(self.delimiter as u8)
        } else {
            Err(EmbedError::Config(format!(
                "delimiter {:?} must be a single printable ASCII character or tab, other than quote",
                self.delimiter
            )))
        }
    }

    /// Anchors relative input/output paths to `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        if self.input_path.is_relative() {
            self.input_path = base.join(&self.input_path);
        }
        if self.output_path.is_relative() {
            self.output_path = base.join(&self.output_path);
        }
    }
}

fn default_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_input_path() -> PathBuf {
    PathBuf::from("fruit_data.csv")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("result.csv")
}

fn default_delimiter() -> char {
    ','
}

fn default_text_column() -> String {
    "text".to_string()
}

fn default_embedding_column() -> String {
    "ada_embedding".to_string()
}

/// Directory of the running executable, falling back to the working directory.
pub fn program_dir() -> EmbedResult<PathBuf> {
    if let Ok(exe) = std::env::current_exe() {
        if let Some(parent) = exe.parent() {
            return Ok(parent.to_path_buf());
        }
    }
    Ok(std::env::current_dir()?)
}

fn resolve_config_path() -> EmbedResult<Option<PathBuf>> {
    let candidate = program_dir()?.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found next to executable");
        return Ok(Some(candidate));
    }

    let cwd = std::env::current_dir()?;
    let candidate = cwd.join("config.toml");
    if candidate.exists() {
        tracing::debug!(path = %candidate.display(), "config found in working directory");
        return Ok(Some(candidate));
    }

    Ok(None)
}

/// `.env` next to the program wins over one in the working directory.
pub fn resolve_dotenv_path(program_dir: &Path, cwd: &Path) -> Option<PathBuf> {
    [program_dir, cwd]
        .into_iter()
        .map(|dir| dir.join(".env"))
        .find(|candidate| candidate.is_file())
}

pub fn parse_config(content: &str) -> EmbedResult<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.pipeline.delimiter_byte()?;
    Ok(config)
}

/// Builds the run configuration: config.toml (or defaults), then the
/// credential from the environment, then paths anchored at the program dir.
pub fn load_config() -> EmbedResult<AppConfig> {
    let mut config = match resolve_config_path()? {
        Some(path) => {
            let content = std::fs::read_to_string(&path)?;
            let config = parse_config(&content)?;
            tracing::info!(path = %path.display(), model = %config.embedding.model, "config loaded");
            config
        }
        None => {
            tracing::info!("no config.toml found, using built-in defaults");
            AppConfig::default()
        }
    };

    if let Some(key) = std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()) {
        config.embedding.api_key = Some(key);
    }
    if config.embedding.api_key.is_none() {
        tracing::warn!("{API_KEY_ENV} is not set; embedding requests will fail");
    }

    config.pipeline.resolve_relative_to(&program_dir()?);
    Ok(config)
}
