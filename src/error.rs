use thiserror::Error;

use crate::collision::MaskParseError;

#[derive(Debug, Error)]
pub enum ActorError {
    #[error("failed to compile scripted event '{event}': {message}")]
    Compile { event: String, message: String },
    #[error("scripted event '{event}' failed: {message}")]
    Runtime { event: String, message: String },
    #[error("actor '{0}' has been destroyed")]
    Destroyed(String),
    #[error(transparent)]
    Mask(#[from] MaskParseError),
    #[error("unknown property '{0}'")]
    UnknownProperty(String),
    #[error("invalid value '{value}' for property '{property}'")]
    InvalidProperty { property: String, value: String },
}

impl ActorError {
    pub fn compile(event: impl Into<String>, message: impl ToString) -> Self {
        Self::Compile { event: event.into(), message: message.to_string() }
    }

    pub fn runtime(event: impl Into<String>, message: impl ToString) -> Self {
        Self::Runtime { event: event.into(), message: message.to_string() }
    }

    pub fn is_script_failure(&self) -> bool {
        matches!(self, Self::Compile { .. } | Self::Runtime { .. })
    }
}
