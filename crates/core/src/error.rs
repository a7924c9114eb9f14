use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocsiftError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Config(String),

    #[error("Outcome already recorded for {0}")]
    OutcomeAlreadyRecorded(String),

    #[error("{0}")]
    Other(String),
}
