//! Identifiers and the validated error message type

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Identifier of a field, unique within a form.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
    derive_more::AsRef,
)]
#[serde(transparent)]
pub struct FieldId(String);

impl From<&str> for FieldId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl std::borrow::Borrow<str> for FieldId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FieldId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a group inside a complex field.
/// Only unique among the groups of a single field.
#[derive(
    Clone,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
    derive_more::Into,
    derive_more::AsRef,
)]
#[serde(transparent)]
pub struct GroupId(String);

impl From<&str> for GroupId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl GroupId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A diagnostic attached to an invalid field. Never empty.
#[derive(
    Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display, derive_more::AsRef,
)]
#[serde(try_from = "String", into = "String")]
pub struct ErrorMessage(String);

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> StoreResult<Self> {
        let message = message.into();
        if message.trim().is_empty() {
            return Err(StoreError::EmptyErrorMessage);
        }
        Ok(Self(message))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ErrorMessage {
    type Error = StoreError;

    fn try_from(message: String) -> StoreResult<Self> {
        Self::new(message)
    }
}

impl From<ErrorMessage> for String {
    fn from(message: ErrorMessage) -> Self {
        message.0
    }
}
