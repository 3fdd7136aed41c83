use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::FetchError;

/// Status value that hides the whole status section.
pub const HIDDEN_STATUS: &str = "none";

/// First row of the profile sheet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default, deserialize_with = "cell_text")]
    pub username: String,
    #[serde(default, deserialize_with = "cell_text")]
    pub status: String,
    #[serde(default, rename = "onlinestatus", deserialize_with = "cell_text")]
    pub online_status: String,
    #[serde(default, rename = "avatar", deserialize_with = "optional_cell_text")]
    pub avatar_url: Option<String>,
}

impl ProfileSnapshot {
    pub fn status_hidden(&self) -> bool {
        self.status.trim() == HIDDEN_STATUS
    }
}

#[derive(Debug, Deserialize)]
struct SheetResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<Value>,
}

/// Extracts the first record of a `{success, data: [...]}` sheet response.
/// Returns the raw record, used for change detection, alongside the typed
/// snapshot.
pub fn parse_profile(body: &Value) -> Result<(Value, ProfileSnapshot), FetchError> {
    let response = SheetResponse::deserialize(body)?;
    if !response.success {
        return Err(FetchError::NoData);
    }

    let record = response.data.into_iter().next().ok_or(FetchError::NoData)?;
    if !record.is_object() {
        return Err(FetchError::Malformed(format!(
            "profile record is not an object: {record}"
        )));
    }

    let snapshot = ProfileSnapshot::deserialize(&record)?;
    Ok((record, snapshot))
}

// Spreadsheet cells come back as strings, numbers, booleans or null.
fn cell_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_cell_text(deserializer)?.unwrap_or_default())
}

fn optional_cell_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected a cell value, got {other}"
            )))
        }
    };
    Ok(text.filter(|s| !s.trim().is_empty()))
}
