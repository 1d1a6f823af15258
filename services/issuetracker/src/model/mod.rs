//! Issue tracker data model module.
//!
//! # Purpose
//! Re-exports the issue record, identifier, patch, filter, and request payload
//! types used by the validator, API, and store layers.
mod issue;
mod payload;

pub use issue::{
    Issue, IssueFilter, IssueId, IssuePatch, ModelError, NewIssue, format_timestamp,
    parse_timestamp, timestamp_now,
};
pub use payload::IssuePayload;
