//! Configuration of a field store.
//!
//! #### Example config:
//!
//! ```rust
//! let yaml = r#"---
//!
//! ## What to do with intents addressing a field that is not in the store.
//! missing_field: ignore
//!
//! ## How many diagnostics to keep around for inspection.
//! effect_capacity: 16
//!
//! ## Record every dispatched intent, for replay.
//! journal:
//!   path: /tmp/fields.journal
//!   encoding: json
//! "#;
//!
//! use field_store::config::{MissingFieldPolicy, StoreConfig};
//!
//! let config = StoreConfig::from_yaml(yaml).unwrap();
//! assert_eq!(config.missing_field, MissingFieldPolicy::Ignore);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::encoder::{Encoder, JsonEncoder, RmpEncoder};
use crate::error::{StoreError, StoreResult};

/// What the reducer does with an intent addressing a field that is not in the snapshot.
///
/// This covers set-ui/setup-field, update-field, mark-field-valid/invalid,
/// receive-complex-group, switch-complex-tab and redraw-map. Expanding or
/// collapsing a group of a missing field is always a no-op, since there is no
/// group to find.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Create an empty record (null value, valid ui) and apply the intent to it.
    #[default]
    CreateOnDemand,
    /// Leave the snapshot unchanged and report a diagnostic.
    Ignore,
}

/// All the config information for a field store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub missing_field: MissingFieldPolicy,

    /// How many transition effects [`StoreEffects`](crate::StoreEffects) keeps before
    /// dropping the oldest.
    #[serde(default = "default_effect_capacity")]
    pub effect_capacity: usize,

    /// Record dispatched intents to a file.
    #[serde(default)]
    pub journal: Option<JournalConfig>,

    /// Override the environment specified tracing config.
    #[serde(default)]
    pub tracing_override: Option<String>,
}

fn default_effect_capacity() -> usize {
    64
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            missing_field: MissingFieldPolicy::default(),
            effect_capacity: default_effect_capacity(),
            journal: None,
            tracing_override: None,
        }
    }
}

impl StoreConfig {
    pub fn from_yaml(yaml: &str) -> StoreResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load a config from a YAML file path.
    pub fn load_yaml(path: &Path) -> StoreResult<Self> {
        let config_yaml = std::fs::read_to_string(path).map_err(|err| match err {
            e if e.kind() == std::io::ErrorKind::NotFound => {
                StoreError::ConfigMissing(path.into())
            }
            _ => err.into(),
        })?;
        Self::from_yaml(&config_yaml)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub encoding: JournalEncoding,
    /// Start from an empty journal instead of refusing to touch an existing file.
    #[serde(default = "default_erase_existing")]
    pub erase_existing: bool,
}

fn default_erase_existing() -> bool {
    true
}

/// On-disk encoding of journal frames.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalEncoding {
    #[default]
    Msgpack,
    Json,
}

impl Encoder for JournalEncoding {
    fn encode<T: Serialize>(&self, item: &T) -> StoreResult<Vec<u8>> {
        match self {
            JournalEncoding::Msgpack => RmpEncoder.encode(item),
            JournalEncoding::Json => JsonEncoder::default().encode(item),
        }
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, encoded: &[u8]) -> StoreResult<T> {
        match self {
            JournalEncoding::Msgpack => RmpEncoder.decode(encoded),
            JournalEncoding::Json => JsonEncoder::default().decode(encoded),
        }
    }
}
