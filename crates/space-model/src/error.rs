use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("incorrect API group: {0:?}")]
    InvalidApiGroup(String),

    #[error("unknown parameters kind: {0}")]
    UnknownParameterKind(String),

    #[error("invalid CDI device name {name:?}: {reason}")]
    InvalidDeviceName { name: String, reason: &'static str },

    #[error("invalid claim name {name:?}: {reason}")]
    InvalidClaimName { name: String, reason: &'static str },

    #[error("invalid model: {0}")]
    Invalid(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
