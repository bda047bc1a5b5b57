use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Read error: {0}")]
    Read(String),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// `row` is the 1-based data row number (the header is not counted).
    #[error("Row {row} has no value in column '{column}'")]
    MissingTextField { row: usize, column: String },

    #[error("Embedding request failed: {0}")]
    RemoteCall(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

pub type EmbedResult<T> = Result<T, EmbedError>;
