//! JSON wire codec for records.
//!
//! Field names follow the gateway's schema (`typeID`, `timeStamp`,
//! `locationID`, `stateData`, `isResponse`, ...).  Decoding never fails
//! loudly: a payload that cannot be parsed yields `None` and a warning.

use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::Result;

/// Encode a record to a JSON string.
pub fn to_json<T: Serialize>(record: &T) -> Result<String> {
    Ok(serde_json::to_string(record)?)
}

/// Decode a record from a JSON payload, or `None` if it is empty or malformed.
pub fn from_json<T: DeserializeOwned>(payload: &[u8]) -> Option<T> {
    if payload.is_empty() {
        warn!("codec: empty payload");
        return None;
    }
    match serde_json::from_slice(payload) {
        Ok(record) => Some(record),
        Err(e) => {
            warn!("codec: cannot decode {}: {}", core::any::type_name::<T>(), e);
            None
        }
    }
}
