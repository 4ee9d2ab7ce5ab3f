use providers::ProviderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("No {kind} client for chain `{chain}`")]
    MissingClient { chain: String, kind: &'static str },
    #[error("Every feed of `{0}` failed to start")]
    NoFeedStarted(&'static str),
    #[error("Invalid value `{value}` for `{var}`")]
    Config { var: &'static str, value: String },
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("Expected {expected} entries, got {got}")]
    LengthMismatch { expected: usize, got: usize },
}
