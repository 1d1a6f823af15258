//! Loosely shaped issue request bodies.
//!
//! # Purpose
//! Clients send issue fields as JSON objects or HTML form bodies with no fixed
//! schema. `IssuePayload` captures the recognized fields as optional typed
//! values so validation works on a tagged shape instead of presence checks
//! against an untyped map.
//!
//! # Decoding rules
//! - `null`, arrays, and objects count as absent.
//! - Numbers and booleans given for text fields are kept in textual form.
//! - `open` accepts a boolean or the strings `"true"` / `"false"`; any other
//!   value counts as absent.
//! - Unrecognized fields are ignored.
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use utoipa::ToSchema;

#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, ToSchema)]
pub struct IssuePayload {
    #[serde(rename = "_id", default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub issue_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub created_by: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub assigned_to: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub open: Option<bool>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Bool(flag) => Some(flag),
        Value::String(text) => match text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_values_decode_leniently() {
        let payload: IssuePayload = serde_json::from_value(serde_json::json!({
            "_id": null,
            "issue_title": 42,
            "issue_text": "text",
            "created_by": true,
            "assigned_to": ["x"],
            "open": "false",
            "priority": "high"
        }))
        .expect("payload");
        assert_eq!(payload.id, None);
        assert_eq!(payload.issue_title.as_deref(), Some("42"));
        assert_eq!(payload.issue_text.as_deref(), Some("text"));
        assert_eq!(payload.created_by.as_deref(), Some("true"));
        assert_eq!(payload.assigned_to, None);
        assert_eq!(payload.status_text, None);
        assert_eq!(payload.open, Some(false));
    }

    #[test]
    fn open_rejects_unknown_strings() {
        let payload: IssuePayload =
            serde_json::from_value(serde_json::json!({ "open": "maybe" })).expect("payload");
        assert_eq!(payload.open, None);
        let payload: IssuePayload =
            serde_json::from_value(serde_json::json!({ "open": true })).expect("payload");
        assert_eq!(payload.open, Some(true));
    }

    #[test]
    fn form_bodies_decode_like_json() {
        let payload: IssuePayload =
            serde_urlencoded::from_str("_id=abc&issue_title=New+title&open=false&status_text=")
                .expect("payload");
        assert_eq!(payload.id.as_deref(), Some("abc"));
        assert_eq!(payload.issue_title.as_deref(), Some("New title"));
        assert_eq!(payload.status_text.as_deref(), Some(""));
        assert_eq!(payload.open, Some(false));
    }

    #[test]
    fn empty_object_is_all_absent() {
        let payload: IssuePayload = serde_json::from_str("{}").expect("payload");
        assert_eq!(payload, IssuePayload::default());
    }
}
