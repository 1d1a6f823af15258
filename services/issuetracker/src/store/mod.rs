//! Issue persistence.
//!
//! # Purpose
//! Defines the [`IssueStore`] trait the HTTP layer depends on, the shared
//! error type, and the in-memory and Postgres implementations.
//!
//! # Key invariants
//! - Every operation is scoped by project; an issue is only visible through
//!   the project it was created in.
//! - Ids are generated by the store and never reused.
//! - Single-issue create/update/delete are atomic; nothing spans issues.
use crate::model::{Issue, IssueFilter, IssueId, IssuePatch, NewIssue};
use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Persist a validated issue, assigning its id and timestamps.
    async fn create_issue(&self, project: &str, issue: NewIssue) -> StoreResult<Issue>;
    /// Issues of `project` matching every filter field, in insertion order.
    async fn list_issues(&self, project: &str, filter: &IssueFilter) -> StoreResult<Vec<Issue>>;
    /// Apply `patch` and refresh `updated_on`.
    async fn update_issue(
        &self,
        project: &str,
        id: &IssueId,
        patch: IssuePatch,
    ) -> StoreResult<Issue>;
    async fn delete_issue(&self, project: &str, id: &IssueId) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}
