//! Response shaping for the issue resource.
//!
//! # Purpose
//! Turns handler outcomes into HTTP responses. This is the only place that
//! decides the status code of an issue outcome.
//!
//! # Key invariants
//! - Every issue outcome, success or failure, is sent as `200 OK`; clients
//!   branch on the body shape (`result` / `error` / issue / list).
//! - Transport and storage failures are not issue outcomes and are reported by
//!   [`crate::api::error::ApiError`] instead.
use crate::api::types::OutcomeBody;
use crate::model::Issue;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, Clone, PartialEq)]
pub enum IssueReply {
    Created(Issue),
    Listed(Vec<Issue>),
    Outcome(OutcomeBody),
}

fn reply_status(_reply: &IssueReply) -> StatusCode {
    StatusCode::OK
}

impl IntoResponse for IssueReply {
    fn into_response(self) -> Response {
        let status = reply_status(&self);
        match self {
            IssueReply::Created(issue) => (status, Json(issue)).into_response(),
            IssueReply::Listed(issues) => (status, Json(issues)).into_response(),
            IssueReply::Outcome(body) => (status, Json(body)).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::COULD_NOT_UPDATE;
    use crate::validate::Rejection;

    #[test]
    fn failures_are_still_ok() {
        let replies = [
            IssueReply::Outcome(OutcomeBody::rejected(
                Rejection::RequiredFieldsMissing,
                None,
            )),
            IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_UPDATE, Some("111".into()))),
            IssueReply::Listed(Vec::new()),
        ];
        for reply in replies {
            assert_eq!(reply.into_response().status(), StatusCode::OK);
        }
    }
}
