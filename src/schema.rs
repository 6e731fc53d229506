//! Response validation.
//!
//! Bodies are deserialized through `serde_path_to_error` so a failure names the JSON
//! path that broke. Nothing partially built is ever returned.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{FebosError, Result};

pub fn validate<T: DeserializeOwned>(entity: &'static str, body: &str) -> Result<T> {
    let mut de = serde_json::Deserializer::from_str(body);
    let parsed: T = serde_path_to_error::deserialize(&mut de).map_err(|e| path_error(entity, e))?;
    de.end().map_err(|e| FebosError::Validation {
        entity,
        field: ".".to_string(),
        reason: e.to_string(),
    })?;
    Ok(parsed)
}

pub fn validate_value<T: DeserializeOwned>(entity: &'static str, value: Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| path_error(entity, e))
}

fn path_error<E: std::fmt::Display>(entity: &'static str, err: serde_path_to_error::Error<E>) -> FebosError {
    FebosError::Validation {
        entity,
        field: err.path().to_string(),
        reason: err.inner().to_string(),
    }
}
