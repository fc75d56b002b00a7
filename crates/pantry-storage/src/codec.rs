//! Wire encoding of the recipe collection record.
//!
//! Current format (schema version 1):
//!
//! ```text
//! {"version": 1, "recipes": [ <Recipe>, ... ]}
//! ```
//!
//! Records written before the version tag existed are a bare JSON array of
//! recipes (schema version 0, with `typeKey` in place of `categoryKey`). They
//! are migrated on decode; the next save writes the current format.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use pantry_types::Recipe;

use crate::error::{StorageError, StorageResult};

/// Schema version written by [`encode_collection`].
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct EnvelopeOut<'a> {
    version: u32,
    recipes: &'a [Recipe],
}

#[derive(Deserialize)]
struct EnvelopeIn {
    version: u64,
    recipes: Value,
}

/// Serialize the whole collection in the current format.
pub fn encode_collection(recipes: &[Recipe]) -> StorageResult<Vec<u8>> {
    serde_json::to_vec(&EnvelopeOut {
        version: CURRENT_SCHEMA_VERSION,
        recipes,
    })
    .map_err(|e| StorageError::Encode(e.to_string()))
}

/// Decode a stored record of any known schema version.
pub fn decode_collection(bytes: &[u8]) -> StorageResult<Vec<Recipe>> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| StorageError::Decode(e.to_string()))?;

    let recipes = match value {
        Value::Array(_) => migrate_v0(value)?,
        Value::Object(_) => {
            let envelope: EnvelopeIn =
                serde_json::from_value(value).map_err(|e| StorageError::Decode(e.to_string()))?;
            match envelope.version {
                0 => migrate_v0(envelope.recipes)?,
                1 => recipes_from_value(envelope.recipes)?,
                found => {
                    return Err(StorageError::UnsupportedVersion {
                        found,
                        supported: CURRENT_SCHEMA_VERSION,
                    })
                }
            }
        }
        other => {
            return Err(StorageError::Decode(format!(
                "expected a recipe list or versioned record, found {}",
                json_kind(&other)
            )))
        }
    };
    Ok(recipes)
}

/// Version 0 differs only in field naming, which [`Recipe`] accepts through
/// serde aliases.
fn migrate_v0(value: Value) -> StorageResult<Vec<Recipe>> {
    recipes_from_value(value)
}

fn recipes_from_value(value: Value) -> StorageResult<Vec<Recipe>> {
    serde_json::from_value(value).map_err(|e| StorageError::Decode(e.to_string()))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
