//! In-memory implementation of the issue store.
//!
//! # Purpose
//! Implements [`IssueStore`] with a `HashMap` of project to issue list guarded
//! by a `tokio::sync::RwLock`. It exists for:
//! - local development and tests (no external dependencies)
//! - deployments where durability is not required
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - Mutations take the write lock, so each single-issue operation is atomic
//!   within the process. Concurrent updates to one issue are last-write-wins.
//!
//! # Ordering
//! Issues are kept per project in insertion order, which is the natural order
//! returned by listing.
use super::{IssueStore, StoreError, StoreResult};
use crate::model::{Issue, IssueFilter, IssueId, IssuePatch, NewIssue, timestamp_now};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    /// Issues keyed by project, each list in insertion order.
    projects: Arc<RwLock<HashMap<String, Vec<Issue>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn record_total(projects: &HashMap<String, Vec<Issue>>) {
    let total: usize = projects.values().map(Vec::len).sum();
    metrics::gauge!("issuetracker_issues_total").set(total as f64);
}

#[async_trait]
impl IssueStore for InMemoryStore {
    async fn create_issue(&self, project: &str, issue: NewIssue) -> StoreResult<Issue> {
        let created = Issue::create(IssueId::generate(), issue, timestamp_now());
        let mut projects = self.projects.write().await;
        projects
            .entry(project.to_string())
            .or_default()
            .push(created.clone());
        record_total(&projects);
        Ok(created)
    }

    async fn list_issues(&self, project: &str, filter: &IssueFilter) -> StoreResult<Vec<Issue>> {
        let projects = self.projects.read().await;
        let items = projects
            .get(project)
            .map(|issues| {
                issues
                    .iter()
                    .filter(|issue| filter.matches(issue))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(items)
    }

    async fn update_issue(
        &self,
        project: &str,
        id: &IssueId,
        patch: IssuePatch,
    ) -> StoreResult<Issue> {
        let mut projects = self.projects.write().await;
        let issue = projects
            .get_mut(project)
            .and_then(|issues| issues.iter_mut().find(|issue| issue.id == *id))
            .ok_or_else(|| StoreError::NotFound("issue".into()))?;
        issue.apply(&patch, timestamp_now());
        Ok(issue.clone())
    }

    async fn delete_issue(&self, project: &str, id: &IssueId) -> StoreResult<()> {
        let mut projects = self.projects.write().await;
        let issues = projects
            .get_mut(project)
            .ok_or_else(|| StoreError::NotFound("issue".into()))?;
        let position = issues
            .iter()
            .position(|issue| issue.id == *id)
            .ok_or_else(|| StoreError::NotFound("issue".into()))?;
        issues.remove(position);
        if issues.is_empty() {
            projects.remove(project);
        }
        record_total(&projects);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
