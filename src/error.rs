use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing artifact {name}: {reason}")]
    Artifact { name: String, reason: String },

    #[error("Missing fields: {}", missing.join(", "))]
    Validation { missing: Vec<String> },

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Invalid total_sqft format: {0}")]
    Normalization(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),
}

impl Error {
    pub fn artifact(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Artifact {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn normalization(msg: impl Into<String>) -> Self {
        Self::Normalization(msg.into())
    }

    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Whether the error was caused by the caller's request rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidBody | Self::Normalization(_)
        )
    }
}
