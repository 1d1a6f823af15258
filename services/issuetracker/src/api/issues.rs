//! Issue API handlers.
//!
//! # Purpose
//! Implements create, list, update, and delete for `/api/issues/{project}`.
//! Each handler asks the validator for a decision, applies it to the store,
//! and reports the outcome through [`IssueReply`].
//!
//! # Key invariants
//! - Validation rejections and unknown or malformed ids are outcomes, not
//!   errors: they never produce an [`ApiError`].
//! - Update and delete echo the `_id` exactly as the client sent it.
use crate::api::body::IssueBody;
use crate::api::error::{ApiError, api_internal};
use crate::api::response::IssueReply;
use crate::api::types::{COULD_NOT_DELETE, COULD_NOT_UPDATE, DELETED, OutcomeBody, UPDATED};
use crate::app::AppState;
use crate::model::{IssueFilter, IssueId};
use crate::store::StoreError;
use crate::validate::{
    CreateDecision, DeleteDecision, UpdateDecision, validate_create, validate_delete_id,
    validate_update,
};
use axum::extract::{Path, Query, State};
use std::collections::HashMap;

fn record(op: &'static str, outcome: &'static str) {
    metrics::counter!("issuetracker_requests_total", "op" => op, "outcome" => outcome)
        .increment(1);
}

#[utoipa::path(
    post,
    path = "/api/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "Project namespace")
    ),
    request_body(
        content = crate::model::IssuePayload,
        description = "Issue fields as JSON or application/x-www-form-urlencoded"
    ),
    responses(
        (status = 200, description = "Created issue, or `{error}` when a required field is missing", body = crate::model::Issue),
        (status = 400, description = "Body could not be decoded", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_issue(
    Path(project): Path<String>,
    State(state): State<AppState>,
    IssueBody(payload): IssueBody,
) -> Result<IssueReply, ApiError> {
    let new_issue = match validate_create(&payload) {
        CreateDecision::Complete(new_issue) => new_issue,
        CreateDecision::Rejected(rejection) => {
            record("create", "rejected");
            return Ok(IssueReply::Outcome(OutcomeBody::rejected(rejection, None)));
        }
    };
    let issue = state
        .store
        .create_issue(&project, new_issue)
        .await
        .map_err(|err| api_internal("failed to create issue", &err))?;
    tracing::info!(%project, issue_id = %issue.id, "issue created");
    record("create", "created");
    Ok(IssueReply::Created(issue))
}

#[utoipa::path(
    get,
    path = "/api/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "Project namespace"),
        ("_id" = Option<String>, Query, description = "Exact issue id"),
        ("issue_title" = Option<String>, Query, description = "Exact title"),
        ("issue_text" = Option<String>, Query, description = "Exact text"),
        ("created_by" = Option<String>, Query, description = "Exact author"),
        ("assigned_to" = Option<String>, Query, description = "Exact assignee"),
        ("status_text" = Option<String>, Query, description = "Exact status text"),
        ("open" = Option<bool>, Query, description = "Open flag"),
        ("created_on" = Option<String>, Query, description = "Exact creation timestamp"),
        ("updated_on" = Option<String>, Query, description = "Exact update timestamp")
    ),
    responses(
        (status = 200, description = "Issues matching every filter", body = [crate::model::Issue])
    )
)]
pub(crate) async fn list_issues(
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(state): State<AppState>,
) -> Result<IssueReply, ApiError> {
    let filter = match IssueFilter::from_params(&params) {
        Ok(filter) => filter,
        Err(err) => {
            // A filter value no issue can carry matches nothing.
            tracing::debug!(%project, error = %err, "unsatisfiable issue filter");
            record("list", "listed");
            return Ok(IssueReply::Listed(Vec::new()));
        }
    };
    let items = state
        .store
        .list_issues(&project, &filter)
        .await
        .map_err(|err| api_internal("failed to list issues", &err))?;
    record("list", "listed");
    Ok(IssueReply::Listed(items))
}

#[utoipa::path(
    put,
    path = "/api/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "Project namespace")
    ),
    request_body(
        content = crate::model::IssuePayload,
        description = "`_id` plus the fields to change"
    ),
    responses(
        (status = 200, description = "`{result, _id}` on success, `{error, _id?}` otherwise", body = crate::api::types::OutcomeBody),
        (status = 400, description = "Body could not be decoded", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn update_issue(
    Path(project): Path<String>,
    State(state): State<AppState>,
    IssueBody(payload): IssueBody,
) -> IssueReply {
    let (raw_id, patch) = match validate_update(&payload) {
        UpdateDecision::Acceptable { id, patch } => (id, patch),
        UpdateDecision::Rejected { rejection, id } => {
            record("update", "rejected");
            return IssueReply::Outcome(OutcomeBody::rejected(rejection, id));
        }
    };
    let Ok(id) = raw_id.parse::<IssueId>() else {
        record("update", "not_found");
        return IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_UPDATE, Some(raw_id)));
    };
    match state.store.update_issue(&project, &id, patch).await {
        Ok(_) => {
            tracing::info!(%project, issue_id = %id, "issue updated");
            record("update", "updated");
            IssueReply::Outcome(OutcomeBody::done(UPDATED, raw_id))
        }
        Err(StoreError::NotFound(_)) => {
            record("update", "not_found");
            IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_UPDATE, Some(raw_id)))
        }
        Err(err) => {
            tracing::error!(error = ?err, %project, issue_id = %id, "failed to update issue");
            record("update", "error");
            IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_UPDATE, Some(raw_id)))
        }
    }
}

#[utoipa::path(
    delete,
    path = "/api/issues/{project}",
    tag = "issues",
    params(
        ("project" = String, Path, description = "Project namespace")
    ),
    request_body(
        content = crate::model::IssuePayload,
        description = "`_id` of the issue to delete"
    ),
    responses(
        (status = 200, description = "`{result, _id}` on success, `{error, _id?}` otherwise", body = crate::api::types::OutcomeBody),
        (status = 400, description = "Body could not be decoded", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_issue(
    Path(project): Path<String>,
    State(state): State<AppState>,
    IssueBody(payload): IssueBody,
) -> IssueReply {
    let raw_id = match validate_delete_id(&payload) {
        DeleteDecision::Proceed { id } => id,
        DeleteDecision::Rejected(rejection) => {
            record("delete", "rejected");
            return IssueReply::Outcome(OutcomeBody::rejected(rejection, None));
        }
    };
    let Ok(id) = raw_id.parse::<IssueId>() else {
        record("delete", "not_found");
        return IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_DELETE, Some(raw_id)));
    };
    match state.store.delete_issue(&project, &id).await {
        Ok(()) => {
            tracing::info!(%project, issue_id = %id, "issue deleted");
            record("delete", "deleted");
            IssueReply::Outcome(OutcomeBody::done(DELETED, raw_id))
        }
        Err(StoreError::NotFound(_)) => {
            record("delete", "not_found");
            IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_DELETE, Some(raw_id)))
        }
        Err(err) => {
            tracing::error!(error = ?err, %project, issue_id = %id, "failed to delete issue");
            record("delete", "error");
            IssueReply::Outcome(OutcomeBody::failed(COULD_NOT_DELETE, Some(raw_id)))
        }
    }
}
