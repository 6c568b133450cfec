use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Context window exhausted: {available} candidate positions, {required} required")]
    Exhausted { available: usize, required: usize },

    #[error("Cannot generate batches from an empty corpus")]
    EmptyCorpus,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
