//! Error type shared by the animation scheduler, clip assets and configuration.

use thiserror::Error;

use crate::resources::instanceindex::InstanceId;

#[derive(Error, Debug)]
pub enum AnimationError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Instance already registered: {0}")]
    AlreadyRegistered(InstanceId),

    #[error("Instance not registered: {0}")]
    NotRegistered(InstanceId),

    #[error("Malformed instance: {0}")]
    MalformedInstance(InstanceId),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnimationError>;
