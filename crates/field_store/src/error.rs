use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// A known intent arrived with a payload that does not fit its shape.
    /// This is a bug in whoever built the intent, never a runtime condition.
    #[error("Malformed `{kind}` payload: {reason}")]
    MalformedPayload { kind: String, reason: String },

    #[error("An invalid field must carry a non-empty error message")]
    EmptyErrorMessage,

    #[error("Config file does not exist at path: {0}")]
    ConfigMissing(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Error parsing YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Error encoding or decoding JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Error encoding to MsgPack: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    #[error("Error decoding from MsgPack: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),
}

impl StoreError {
    pub(crate) fn malformed(kind: impl ToString, reason: impl ToString) -> Self {
        Self::MalformedPayload {
            kind: kind.to_string(),
            reason: reason.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
