//! Byte encodings for journal frames.

use serde::{de::DeserializeOwned, Serialize};

use crate::error::StoreResult;

pub trait Encoder: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, item: &T) -> StoreResult<Vec<u8>>;
    fn decode<T: DeserializeOwned>(&self, encoded: &[u8]) -> StoreResult<T>;
}

/// MessagePack, with struct fields written as maps so flattened and
/// optional fields survive the trip.
#[derive(Debug, Default, Clone, Copy)]
pub struct RmpEncoder;

impl Encoder for RmpEncoder {
    fn encode<T: Serialize>(&self, item: &T) -> StoreResult<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(item)?)
    }

    fn decode<T: DeserializeOwned>(&self, encoded: &[u8]) -> StoreResult<T> {
        Ok(rmp_serde::from_slice(encoded)?)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct JsonEncoder {
    pub pretty: bool,
}

impl Encoder for JsonEncoder {
    fn encode<T: Serialize>(&self, item: &T) -> StoreResult<Vec<u8>> {
        Ok(if self.pretty {
            serde_json::to_vec_pretty(item)?
        } else {
            serde_json::to_vec(item)?
        })
    }

    fn decode<T: DeserializeOwned>(&self, encoded: &[u8]) -> StoreResult<T> {
        Ok(serde_json::from_slice(encoded)?)
    }
}
