use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::models::{DecodeError, StoreError, TodoView};

pub const UNKNOWN_ACTION: &str = "unknown action";

/// A decoded client frame.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Request {
    Get,
    Add {
        #[serde(default)]
        description: String,
    },
    Update {
        #[serde(default)]
        id: Option<Number>,
    },
    #[serde(other)]
    Unknown,
}

impl Request {
    /// Decode one frame.
    ///
    /// Anything that is valid JSON but carries no string `action` is an
    /// unknown action rather than a decode error.
    pub fn decode(frame: &str) -> Result<Self, DecodeError> {
        let value: Value = serde_json::from_str(frame)?;
        if !value.get("action").is_some_and(Value::is_string) {
            return Ok(Request::Unknown);
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Error body: `{"error":"..."}`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn unknown_action() -> Self {
        Self { error: UNKNOWN_ACTION.to_string() }
    }
}

impl From<StoreError> for ErrorResponse {
    fn from(e: StoreError) -> Self {
        Self { error: e.to_string() }
    }
}

/// Everything the server writes to a client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Response {
    List(Vec<TodoView>),
    Item(TodoView),
    Error(ErrorResponse),
}

impl Response {
    /// Encode as one newline-terminated frame.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}
