//! Serializable session state

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Why a save state was refused
#[derive(Debug, thiserror::Error)]
pub enum RestoreError {
    #[error("save state does not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("board is {found_width}x{found_height}, expected {width}x{height}")]
    Dimensions {
        width: usize,
        height: usize,
        found_width: usize,
        found_height: usize,
    },

    #[error("invalid cell value {value} at ({x}, {y})")]
    InvalidCell { x: usize, y: usize, value: u8 },

    #[error("unknown piece id {0}")]
    UnknownPiece(u8),

    #[error("invalid direction ({0}, {1})")]
    InvalidDirection(i32, i32),

    #[error("invalid body: {0}")]
    InvalidBody(&'static str),
}

/// Field name → primitive/array value mapping handed to a persistence sink
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveState(Map<String, Value>);

impl SaveState {
    /// Build from any struct that serializes to a JSON object
    pub fn from_fields<T: Serialize>(fields: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(fields)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(serde::ser::Error::custom(format!(
                "save state must be an object, got {other}"
            ))),
        }
    }

    /// Decode into a typed save struct
    pub fn to_fields<T: DeserializeOwned>(&self) -> Result<T, RestoreError> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) {
        self.0.insert(field.into(), value);
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
