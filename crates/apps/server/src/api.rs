use axum::extract::rejection::JsonRejection;
use axum::extract::{Path as AxumPath, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use issues::models::{group_model_areas, ListingError, ModelAreas};
use issues::{facility_catalog, Facility, FacilityInfo, Issue, IssueError, NewIssue};
use serde_json::{json, Value};
use tracing::error;

use crate::AppState;

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

#[derive(Debug)]
pub enum ApiError {
    Issue(IssueError),
    Listing(ListingError),
    /// Request body is not a well-formed issue.
    Body(JsonRejection),
}

impl From<IssueError> for ApiError {
    fn from(err: IssueError) -> Self {
        ApiError::Issue(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Body(rejection)
    }
}

impl From<ListingError> for ApiError {
    fn from(err: ListingError) -> Self {
        ApiError::Listing(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Issue(IssueError::Validation(_)) | ApiError::Body(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Issue(IssueError::Capacity { .. }) => StatusCode::INSUFFICIENT_STORAGE,
            ApiError::Issue(IssueError::Storage(_)) | ApiError::Listing(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match self {
            ApiError::Issue(IssueError::Storage(err)) => {
                error!("issue storage failed: {err}");
                "Failed to access issue storage".to_string()
            }
            ApiError::Issue(err) => err.to_string(),
            ApiError::Body(rejection) => rejection.body_text(),
            ApiError::Listing(err) => {
                error!("model listing failed: {err}");
                "Failed to list facility models".to_string()
            }
        };
        api_error(status, message).into_response()
    }
}

pub async fn list_facilities() -> Json<Vec<FacilityInfo>> {
    Json(facility_catalog())
}

pub async fn get_model_areas(
    State(state): State<AppState>,
    AxumPath(facility): AxumPath<String>,
) -> Result<Json<ModelAreas>, ApiError> {
    let facility: Facility = facility
        .parse()
        .map_err(|e| ApiError::Issue(IssueError::Validation(e)))?;
    let objects = state.listing.objects().await?;
    Ok(Json(group_model_areas(&objects, facility)))
}

pub async fn list_issues(
    State(state): State<AppState>,
    AxumPath(facility): AxumPath<String>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = state.issues.list(&facility).await?;
    Ok(Json(issues))
}

pub async fn create_issue(
    State(state): State<AppState>,
    AxumPath(facility): AxumPath<String>,
    body: Result<Json<NewIssue>, JsonRejection>,
) -> Result<Json<Issue>, ApiError> {
    let Json(new) = body?;
    let issue = state.issues.create(&facility, new).await?;
    Ok(Json(issue))
}
