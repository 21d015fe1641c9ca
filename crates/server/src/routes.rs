//! API route definitions
//!
//! Every client-input failure answers `200 OK` with an `error` field in the
//! body; only backend failures produce a non-200 status. Bodies may be JSON
//! or form-encoded (see [`BodyFields`]).

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::extract::BodyFields;
use tracker::domain::{Issue, IssueFilter, IssueUpdate, NewIssue};
use tracker::validation::is_blank;
use tracker::{IssueError, IssueService, IssueStore};

/// Shared application state
pub type AppState<S> = Arc<IssueService<S>>;

/// Create API routes
pub fn create_routes<S: IssueStore + 'static>(service: Arc<IssueService<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/projects", get(list_projects::<S>))
        .route(
            "/issues/:project",
            get(list_issues::<S>)
                .post(create_issue::<S>)
                .put(update_issue::<S>)
                .delete(delete_issue::<S>),
        )
        .with_state(service)
}

/// Successful update/delete body
#[derive(Debug, Serialize, Deserialize)]
pub struct ResultResponse {
    pub result: String,
    #[serde(rename = "_id")]
    pub id: String,
}

/// Error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Maps service errors onto the API's response contract
#[derive(Debug)]
pub struct ApiError(IssueError);

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let IssueError::Storage(e) = &self.0 {
            tracing::error!("Storage failure: {:#}", e);
            let body = ErrorResponse {
                error: "internal storage error".to_string(),
                id: None,
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response();
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            id: self.0.issue_id().map(str::to_string),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "tracker-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// List projects that hold issues
async fn list_projects<S: IssueStore>(
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<String>>, ApiError> {
    Ok(Json(service.list_projects()?))
}

/// List a project's issues, filtered by any query parameters
///
/// A filter value that cannot be interpreted matches nothing.
async fn list_issues<S: IssueStore>(
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    State(service): State<AppState<S>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let pairs = params.iter().map(|(k, v)| (k.as_str(), v.as_str()));
    let Some(filter) = IssueFilter::from_params(pairs) else {
        tracing::debug!(project = %project, "Unusable filter, nothing matches");
        return Ok(Json(Vec::new()));
    };

    let issues = service.filter_issues(&project, &filter)?;
    tracing::debug!(project = %project, count = issues.len(), "Listed issues");
    Ok(Json(issues))
}

/// Create an issue
///
/// A missing or undecodable body is treated as an empty one, which fails
/// validation like any other request without the required fields.
async fn create_issue<S: IssueStore>(
    Path(project): Path<String>,
    State(service): State<AppState<S>>,
    body: BodyFields,
) -> Result<Json<Issue>, ApiError> {
    let fields = body.decode::<NewIssue>().unwrap_or_else(|e| {
        tracing::debug!(project = %project, "Unusable issue fields: {}", e);
        NewIssue::default()
    });
    let issue = service.create_issue(&project, fields)?;
    tracing::info!(project = %project, id = %issue.id, "Created issue");
    Ok(Json(issue))
}

/// Update some fields of an issue
///
/// `_id` is read before the other fields are decoded, so a field of the
/// wrong type reports `could not update` against the sent ID.
async fn update_issue<S: IssueStore>(
    Path(project): Path<String>,
    State(service): State<AppState<S>>,
    body: BodyFields,
) -> Result<Json<ResultResponse>, ApiError> {
    let update = match body.decode::<IssueUpdate>() {
        Ok(update) => update,
        Err(e) => {
            let id = body
                .id()
                .filter(|id| !is_blank(Some(id.as_str())))
                .ok_or(IssueError::MissingId)?;
            tracing::debug!(project = %project, id = %id, "Unusable update fields: {}", e);
            return Err(IssueError::UpdateFailed { id }.into());
        }
    };
    let affected = service.update_issue(&project, &update)?;
    tracing::info!(project = %project, id = %affected.id, "Updated issue");
    Ok(Json(ResultResponse {
        result: "successfully updated".to_string(),
        id: affected.id,
    }))
}

/// Delete an issue
async fn delete_issue<S: IssueStore>(
    Path(project): Path<String>,
    State(service): State<AppState<S>>,
    body: BodyFields,
) -> Result<Json<ResultResponse>, ApiError> {
    let affected = service.delete_issue(&project, body.id().as_deref())?;
    tracing::info!(project = %project, id = %affected.id, "Deleted issue");
    Ok(Json(ResultResponse {
        result: "successfully deleted".to_string(),
        id: affected.id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use tracker::storage::InMemoryStorage;

    fn create_test_app() -> (TestServer, Arc<IssueService<InMemoryStorage>>) {
        let service = Arc::new(IssueService::new(InMemoryStorage::new()));
        let app = create_routes(service.clone());
        (TestServer::new(app).unwrap(), service)
    }

    fn new_issue(title: &str) -> NewIssue {
        NewIssue {
            issue_title: Some(title.to_string()),
            issue_text: Some("Text".to_string()),
            created_by: Some("tester".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let (server, _) = create_test_app();
        let response = server.get("/health").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({
            "status": "ok",
            "service": "tracker-api",
            "version": env!("CARGO_PKG_VERSION")
        }));
    }

    #[tokio::test]
    async fn test_list_issues_empty() {
        let (server, _) = create_test_app();
        let response = server.get("/issues/apitest").await;
        response.assert_status_ok();
        let issues: Vec<Issue> = response.json();
        assert_eq!(issues.len(), 0);
    }

    #[tokio::test]
    async fn test_list_projects() {
        let (server, service) = create_test_app();
        service.create_issue("zeta", new_issue("z")).unwrap();
        service.create_issue("alpha", new_issue("a")).unwrap();

        let response = server.get("/projects").await;
        response.assert_status_ok();
        let projects: Vec<String> = response.json();
        assert_eq!(projects, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_missing_body_is_reported_in_band() {
        let (server, _) = create_test_app();

        let response = server.post("/issues/apitest").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "error": "required field(s) missing" }));

        let response = server.put("/issues/apitest").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "error": "missing _id" }));

        let response = server.delete("/issues/apitest").await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "error": "missing _id" }));
    }

    #[tokio::test]
    async fn test_unusable_filter_matches_nothing() {
        let (server, service) = create_test_app();
        service.create_issue("apitest", new_issue("a")).unwrap();

        for (key, value) in [("open", "yes"), ("created_on", "yesterday")] {
            let response = server.get("/issues/apitest").add_query_param(key, value).await;
            response.assert_status_ok();
            response.assert_json(&serde_json::json!([]));
        }
    }

    #[tokio::test]
    async fn test_mistyped_update_field_keeps_id() {
        let (server, service) = create_test_app();
        let issue = service.create_issue("apitest", new_issue("a")).unwrap();

        for body in [
            serde_json::json!({ "_id": issue.id, "issue_title": "x", "open": "maybe" }),
            serde_json::json!({ "_id": issue.id, "issue_title": 42 }),
        ] {
            let response = server.put("/issues/apitest").json(&body).await;
            response.assert_status_ok();
            response.assert_json(&serde_json::json!({
                "error": "could not update",
                "_id": issue.id
            }));
        }

        // Nothing was written
        assert_eq!(
            service.storage().load_issue("apitest", &issue.id).unwrap(),
            issue
        );

        let response = server
            .put("/issues/apitest")
            .json(&serde_json::json!({ "issue_title": 42 }))
            .await;
        response.assert_json(&serde_json::json!({ "error": "missing _id" }));
    }

    #[tokio::test]
    async fn test_numeric_delete_id_is_echoed() {
        let (server, _) = create_test_app();

        let response = server
            .delete("/issues/apitest")
            .json(&serde_json::json!({ "_id": 42 }))
            .await;
        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "error": "could not delete", "_id": "42" }));
    }

    #[test]
    fn test_storage_failure_maps_to_500() {
        let response = ApiError(IssueError::Storage(anyhow::anyhow!("disk full"))).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_client_error_maps_to_200() {
        let response = ApiError(IssueError::DeleteFailed {
            id: "abc".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
