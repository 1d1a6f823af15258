//! OpenAPI schema aggregation for the issue tracker API.
use crate::api::{
    issues, system,
    types::{ErrorResponse, HealthStatus, OutcomeBody, SystemInfo},
};
use crate::model::{Issue, IssuePayload};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "issuetracker",
        version = "v1",
        description = "Per-project issue tracker HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        issues::create_issue,
        issues::list_issues,
        issues::update_issue,
        issues::delete_issue
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        Issue,
        IssuePayload,
        OutcomeBody
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "issues", description = "Issue management, scoped by project")
    )
)]
pub struct ApiDoc;
