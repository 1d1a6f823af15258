//! HTTP API request/response types.
//!
//! # Purpose
//! Defines the JSON shapes of the issue API and the system endpoints, and
//! the fixed vocabulary of update/delete outcomes.
use crate::validate::Rejection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const UPDATED: &str = "successfully updated";
pub const DELETED: &str = "successfully deleted";
pub const COULD_NOT_UPDATE: &str = "could not update";
pub const COULD_NOT_DELETE: &str = "could not delete";

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    pub storage_backend: String,
    pub durable_storage: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct HealthStatus {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub request_id: Option<String>,
}

/// Body returned by every non-listing issue outcome other than a created
/// issue: a confirmation or an `error`, plus the `_id` when one applies.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutcomeBody {
    Done {
        result: String,
        #[serde(rename = "_id")]
        id: String,
    },
    Failed {
        error: String,
        #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
    },
}

impl OutcomeBody {
    pub fn done(result: &str, id: impl Into<String>) -> Self {
        OutcomeBody::Done {
            result: result.to_string(),
            id: id.into(),
        }
    }

    pub fn failed(error: &str, id: Option<String>) -> Self {
        OutcomeBody::Failed {
            error: error.to_string(),
            id,
        }
    }

    pub fn rejected(rejection: Rejection, id: Option<String>) -> Self {
        Self::failed(&rejection.to_string(), id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_bodies_match_wire_shapes() {
        assert_eq!(
            serde_json::to_value(OutcomeBody::done(UPDATED, "abc")).expect("json"),
            serde_json::json!({ "result": "successfully updated", "_id": "abc" })
        );
        assert_eq!(
            serde_json::to_value(OutcomeBody::rejected(Rejection::MissingId, None)).expect("json"),
            serde_json::json!({ "error": "missing _id" })
        );
        assert_eq!(
            serde_json::to_value(OutcomeBody::failed(COULD_NOT_DELETE, Some("111".into())))
                .expect("json"),
            serde_json::json!({ "error": "could not delete", "_id": "111" })
        );
    }
}
