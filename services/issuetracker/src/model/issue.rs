//! Issue records, identifiers, partial updates, and list filters.
//!
//! # Purpose
//! Defines the stored issue shape shared by the store backends and the HTTP
//! API, plus the field-merge rules applied on update and the exact-match
//! predicate applied on listing.
//!
//! # Key invariants
//! - `created_on <= updated_on` for every issue; [`Issue::apply`] never moves
//!   `updated_on` backwards.
//! - Timestamps are kept at millisecond precision so their serialized form
//!   round-trips exactly when used as a list filter.
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid issue id: {0}")]
    InvalidId(String),
    #[error("invalid value for filter {field}: {value}")]
    InvalidFilter { field: &'static str, value: String },
}

/// Store-assigned identifier of an issue.
///
/// Rendered as a lower-case hyphenated UUID, the only accepted input form.
/// Any other string (including upper-case, braced, `urn:` or unhyphenated
/// spellings of the same UUID) is rejected with [`ModelError::InvalidId`],
/// which callers report as "could not update" or "could not delete" rather
/// than as a fault.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(transparent)]
pub struct IssueId(Uuid);

impl IssueId {
    // Fresh random id for a new issue.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    // Wrap an existing UUID when decoding from storage.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for IssueId {
    type Err = ModelError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let uuid = Uuid::parse_str(input).map_err(|_| ModelError::InvalidId(input.into()))?;
        // Ids compare as strings on the wire; only the rendered form is an id.
        if uuid.hyphenated().to_string() != input {
            return Err(ModelError::InvalidId(input.into()));
        }
        Ok(Self(uuid))
    }
}

/// Current time truncated to whole milliseconds.
pub fn timestamp_now() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// Render a timestamp as ISO-8601 UTC with millisecond precision.
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

fn serialize_millis<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&format_timestamp(value))
}

/// A stored issue as returned by create and list.
///
/// Field order matches the wire shape clients expect.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq)]
pub struct Issue {
    #[serde(rename = "_id")]
    #[schema(value_type = String)]
    pub id: IssueId,
    pub issue_title: String,
    pub issue_text: String,
    #[serde(serialize_with = "serialize_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub created_on: DateTime<Utc>,
    #[serde(serialize_with = "serialize_millis")]
    #[schema(value_type = String, format = DateTime)]
    pub updated_on: DateTime<Utc>,
    pub created_by: String,
    pub assigned_to: String,
    pub open: bool,
    pub status_text: String,
}

/// Validated creation input with defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIssue {
    pub issue_title: String,
    pub issue_text: String,
    pub created_by: String,
    pub assigned_to: String,
    pub status_text: String,
    pub open: bool,
}

/// Field-level partial update. `None` leaves the stored value untouched.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IssuePatch {
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
}

impl IssuePatch {
    pub fn is_empty(&self) -> bool {
        self.issue_title.is_none()
            && self.issue_text.is_none()
            && self.created_by.is_none()
            && self.assigned_to.is_none()
            && self.status_text.is_none()
            && self.open.is_none()
    }
}

impl Issue {
    /// Materialize a new issue with `created_on == updated_on == now`.
    pub fn create(id: IssueId, new: NewIssue, now: DateTime<Utc>) -> Self {
        Self {
            id,
            issue_title: new.issue_title,
            issue_text: new.issue_text,
            created_on: now,
            updated_on: now,
            created_by: new.created_by,
            assigned_to: new.assigned_to,
            open: new.open,
            status_text: new.status_text,
        }
    }

    /// Merge the present patch fields and refresh `updated_on`.
    pub fn apply(&mut self, patch: &IssuePatch, now: DateTime<Utc>) {
        if let Some(value) = &patch.issue_title {
            self.issue_title = value.clone();
        }
        if let Some(value) = &patch.issue_text {
            self.issue_text = value.clone();
        }
        if let Some(value) = &patch.created_by {
            self.created_by = value.clone();
        }
        if let Some(value) = &patch.assigned_to {
            self.assigned_to = value.clone();
        }
        if let Some(value) = &patch.status_text {
            self.status_text = value.clone();
        }
        if let Some(value) = patch.open {
            self.open = value;
        }
        // A wall clock stepping backwards must not break created_on <= updated_on.
        self.updated_on = now.max(self.updated_on);
    }
}

/// Conjunction of exact-match field filters used when listing a project.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct IssueFilter {
    pub id: Option<IssueId>,
    pub issue_title: Option<String>,
    pub issue_text: Option<String>,
    pub created_by: Option<String>,
    pub assigned_to: Option<String>,
    pub status_text: Option<String>,
    pub open: Option<bool>,
    pub created_on: Option<DateTime<Utc>>,
    pub updated_on: Option<DateTime<Utc>>,
}

impl IssueFilter {
    /// Build a filter from query parameters.
    ///
    /// Unrecognized parameters are ignored. A recognized parameter whose value
    /// cannot be interpreted yields an error; callers treat that as a filter
    /// matching nothing.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ModelError> {
        let mut filter = IssueFilter::default();
        for (key, value) in params {
            match key.as_str() {
                "_id" => filter.id = Some(value.parse()?),
                "issue_title" => filter.issue_title = Some(value.clone()),
                "issue_text" => filter.issue_text = Some(value.clone()),
                "created_by" => filter.created_by = Some(value.clone()),
                "assigned_to" => filter.assigned_to = Some(value.clone()),
                "status_text" => filter.status_text = Some(value.clone()),
                "open" => {
                    filter.open = Some(match value.as_str() {
                        "true" => true,
                        "false" => false,
                        _ => return Err(invalid_filter("open", value)),
                    })
                }
                "created_on" => {
                    filter.created_on = Some(
                        parse_timestamp(value).ok_or_else(|| invalid_filter("created_on", value))?,
                    )
                }
                "updated_on" => {
                    filter.updated_on = Some(
                        parse_timestamp(value).ok_or_else(|| invalid_filter("updated_on", value))?,
                    )
                }
                _ => {}
            }
        }
        Ok(filter)
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        fn eq<T: PartialEq>(expected: &Option<T>, actual: &T) -> bool {
            expected.as_ref().is_none_or(|value| value == actual)
        }
        eq(&self.id, &issue.id)
            && eq(&self.issue_title, &issue.issue_title)
            && eq(&self.issue_text, &issue.issue_text)
            && eq(&self.created_by, &issue.created_by)
            && eq(&self.assigned_to, &issue.assigned_to)
            && eq(&self.status_text, &issue.status_text)
            && eq(&self.open, &issue.open)
            && eq(&self.created_on, &issue.created_on)
            && eq(&self.updated_on, &issue.updated_on)
    }
}

fn invalid_filter(field: &'static str, value: &str) -> ModelError {
    ModelError::InvalidFilter {
        field,
        value: value.to_string(),
    }
}
