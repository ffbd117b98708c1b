use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to read artifact file '{}'", .0.display())]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to write artifact file '{}'", .0.display())]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode artifacts from '{}'", .0.display())]
    Decode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode artifacts")]
    Encode(#[source] Box<bincode::error::EncodeError>),

    #[error("Failed to serialize artifacts to JSON")]
    Json(#[from] serde_json::Error),
}
