//! Request body extraction for the issue routes.
//!
//! # Purpose
//! Decodes a request body into an [`IssuePayload`] whether it arrives as JSON
//! or as an HTML form (`application/x-www-form-urlencoded`). An empty body is
//! an empty payload, so a bare `DELETE` reaches validation instead of failing
//! in the transport.
use crate::api::error::{ApiError, api_validation_error};
use crate::model::IssuePayload;
use axum::body::Bytes;
use axum::extract::{FromRequest, Request};
use axum::http::header::CONTENT_TYPE;
use serde_json::Value;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Axum extractor yielding the decoded issue payload.
pub struct IssueBody(pub IssuePayload);

#[axum::async_trait]
impl<S> FromRequest<S> for IssueBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|_| api_validation_error("failed to read request body"))?;
        decode_payload(&bytes, is_form).map(IssueBody)
    }
}

pub fn decode_payload(bytes: &[u8], is_form: bool) -> Result<IssuePayload, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(IssuePayload::default());
    }
    if is_form {
        serde_urlencoded::from_bytes(bytes).map_err(|err| {
            tracing::debug!(error = %err, "rejecting malformed form body");
            api_validation_error("malformed form body")
        })
    } else {
        let value: Value = serde_json::from_slice(bytes).map_err(|err| {
            tracing::debug!(error = %err, "rejecting malformed json body");
            api_validation_error("malformed json body")
        })?;
        // Derived struct decoding also fills fields from a sequence by position.
        if !value.is_object() {
            return Err(api_validation_error("json body must be an object"));
        }
        serde_json::from_value(value).map_err(|err| {
            tracing::debug!(error = %err, "rejecting malformed json body");
            api_validation_error("malformed json body")
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn empty_body_is_empty_payload() {
        assert_eq!(
            decode_payload(b"", false).expect("empty"),
            IssuePayload::default()
        );
        assert_eq!(
            decode_payload(b"  \n", true).expect("blank"),
            IssuePayload::default()
        );
    }

    #[test]
    fn decodes_json_and_form() {
        let json = decode_payload(br#"{"_id":"abc","open":false}"#, false).expect("json");
        assert_eq!(json.id.as_deref(), Some("abc"));
        assert_eq!(json.open, Some(false));

        let form = decode_payload(b"_id=abc&open=false", true).expect("form");
        assert_eq!(form, json);
    }

    #[test]
    fn malformed_json_is_a_transport_error() {
        let err = decode_payload(b"{not json", false).expect_err("malformed");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.body.code, "validation_error");

        let not_objects: [&[u8]; 4] = [b"[1,2]", br#"[null,"t","x","u"]"#, b"\"text\"", b"7"];
        for body in not_objects {
            let err = decode_payload(body, false).expect_err("not an object");
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.body.code, "validation_error");
        }
    }
}
