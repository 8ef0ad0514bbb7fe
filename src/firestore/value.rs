//! Mapping between [`UserDocument`] and the Firestore REST document JSON.

use serde_json::{json, Map, Value};

use crate::accounts::repo_types::UserDocument;
use crate::error::StoreError;

pub const BALANCE_FIELD: &str = "balance";
pub const LAST_MINE_FIELD: &str = "last_mine";

/// `{"fields": {...}}` body for create and patch requests.
pub fn encode(doc: &UserDocument) -> Value {
    json!({
        "fields": {
            BALANCE_FIELD: { "doubleValue": doc.balance },
            LAST_MINE_FIELD: { "stringValue": doc.last_mine },
        }
    })
}

pub fn decode(user_id: &str, body: &Value) -> Result<UserDocument, StoreError> {
    let malformed = |reason: &str| StoreError::MalformedRecord {
        user_id: user_id.to_string(),
        reason: reason.to_string(),
    };

    let fields = body
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| malformed("document has no fields"))?;

    let balance = number_field(fields, BALANCE_FIELD)
        .ok_or_else(|| malformed("balance is missing or not a number"))?;
    let last_mine = fields
        .get(LAST_MINE_FIELD)
        .and_then(|v| v.get("stringValue"))
        .and_then(Value::as_str)
        .ok_or_else(|| malformed("last_mine is missing or not a string"))?
        .to_string();

    Ok(UserDocument { balance, last_mine })
}

// Integers travel as decimal strings in the REST API.
fn number_field(fields: &Map<String, Value>, name: &str) -> Option<f64> {
    let value = fields.get(name)?;
    if let Some(d) = value.get("doubleValue") {
        return d.as_f64();
    }
    match value.get("integerValue")? {
        Value::String(s) => s.parse::<i64>().ok().map(|i| i as f64),
        other => other.as_i64().map(|i| i as f64),
    }
}
