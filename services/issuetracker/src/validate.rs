//! Issue request validation.
//!
//! # Purpose
//! Pure decision logic for the issue resource: whether a creation payload is
//! complete, whether an update payload is well formed, and whether a delete
//! names an id. Nothing here performs I/O; handlers act on the returned
//! decisions.
//!
//! # Key invariants
//! - A required creation field counts as missing when absent or empty.
//! - Update checks run in a fixed order: missing `_id` first, then the
//!   absence of any update field.
//! - Empty strings are valid update values.
use crate::model::{IssuePatch, IssuePayload, NewIssue};
use thiserror::Error;

/// Reason a payload was turned away before touching the store.
///
/// The display text is the exact `error` string returned to clients.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    #[error("required field(s) missing")]
    RequiredFieldsMissing,
    #[error("missing _id")]
    MissingId,
    #[error("no update field(s) sent")]
    NoUpdateFields,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateDecision {
    Complete(NewIssue),
    Rejected(Rejection),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateDecision {
    Acceptable {
        id: String,
        patch: IssuePatch,
    },
    /// `id` is echoed back to the client when it was supplied.
    Rejected {
        rejection: Rejection,
        id: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteDecision {
    Proceed { id: String },
    Rejected(Rejection),
}

pub fn validate_create(payload: &IssuePayload) -> CreateDecision {
    let (Some(issue_title), Some(issue_text), Some(created_by)) = (
        present(&payload.issue_title),
        present(&payload.issue_text),
        present(&payload.created_by),
    ) else {
        return CreateDecision::Rejected(Rejection::RequiredFieldsMissing);
    };
    CreateDecision::Complete(NewIssue {
        issue_title: issue_title.to_string(),
        issue_text: issue_text.to_string(),
        created_by: created_by.to_string(),
        assigned_to: payload.assigned_to.clone().unwrap_or_default(),
        status_text: payload.status_text.clone().unwrap_or_default(),
        open: payload.open.unwrap_or(true),
    })
}

pub fn validate_update(payload: &IssuePayload) -> UpdateDecision {
    let Some(id) = present(&payload.id) else {
        return UpdateDecision::Rejected {
            rejection: Rejection::MissingId,
            id: None,
        };
    };
    let patch = IssuePatch {
        issue_title: payload.issue_title.clone(),
        issue_text: payload.issue_text.clone(),
        created_by: payload.created_by.clone(),
        assigned_to: payload.assigned_to.clone(),
        status_text: payload.status_text.clone(),
        open: payload.open,
    };
    if patch.is_empty() {
        return UpdateDecision::Rejected {
            rejection: Rejection::NoUpdateFields,
            id: Some(id.to_string()),
        };
    }
    UpdateDecision::Acceptable {
        id: id.to_string(),
        patch,
    }
}

pub fn validate_delete_id(payload: &IssuePayload) -> DeleteDecision {
    match present(&payload.id) {
        Some(id) => DeleteDecision::Proceed { id: id.to_string() },
        None => DeleteDecision::Rejected(Rejection::MissingId),
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|text| !text.is_empty())
}
