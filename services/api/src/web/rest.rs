//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use campus_vault_core::accounts::{SeedResult, SeedStatus};
use campus_vault_core::filter::{available_subjects, available_years, filter_resources};
use campus_vault_core::preview::{PreviewWindow, EXPIRED_RETENTION};
use campus_vault_core::submissions::StatusCounts;
use campus_vault_core::{
    Account, ApprovalStatus, ChatMessage, ChatRole, Department, Resource, ResourceType, Role,
    StudentSubmission,
};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;
use utoipa::OpenApi;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::profile_id;
use crate::web::protocol::{
    BookmarkToggleResponse, BookmarksResponse, ChatRequest, ErrorBody, FacetQueryParams,
    FacetsResponse, LabelEntry, LabelsResponse, PreviewResponse, PreviewState,
    PreviewStatusResponse, PyqQueryParams, RejectRequest, ResourceQueryParams, SeedResponse,
    SubmissionListParams, SubmissionRequest,
};
use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_resources_handler,
        list_pyqs_handler,
        pyq_facets_handler,
        labels_handler,
        list_bookmarks_handler,
        toggle_bookmark_handler,
        create_submission_handler,
        my_submissions_handler,
        approved_submissions_handler,
        list_submissions_handler,
        submission_stats_handler,
        approve_submission_handler,
        reject_submission_handler,
        open_preview_handler,
        preview_status_handler,
        close_preview_handler,
        seed_users_handler,
        crate::web::chat::chat_handler,
    ),
    components(
        schemas(
            Resource, ResourceType, Department, StudentSubmission, ApprovalStatus,
            SubmissionRequest, RejectRequest, StatusCounts, FacetsResponse,
            BookmarksResponse, BookmarkToggleResponse, ChatRequest, ChatMessage, ChatRole,
            SeedResponse, SeedResult, SeedStatus, Role, PreviewResponse, PreviewState,
            PreviewStatusResponse, LabelEntry, LabelsResponse, ErrorBody
        )
    ),
    tags(
        (name = "CampusVault API", description = "Academic resources, student submissions and the FAQ assistant.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Catalog
//=========================================================================================

/// Browse notes, timetables, syllabi and assignments.
#[utoipa::path(
    get,
    path = "/resources",
    params(
        ResourceQueryParams,
        ("x-profile-id" = Option<String>, Header, description = "Bookmark profile used with `bookmarked=true`.")
    ),
    responses(
        (status = 200, description = "Matching resources in catalog order", body = [Resource]),
        (status = 400, description = "Unknown filter value", body = ErrorBody)
    )
)]
pub async fn list_resources_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(params): Query<ResourceQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut query = params.to_query()?;
    if params.bookmarked.unwrap_or(false) {
        let ids = state.bookmarks(profile_id(&headers)).await.list().await?;
        query.bookmarks = Some(ids.into_iter().collect::<HashSet<_>>());
    }
    let matches: Vec<Resource> = filter_resources(&state.catalog.resources, &query)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matches))
}

/// Browse previous-year question papers.
#[utoipa::path(
    get,
    path = "/pyqs",
    params(PyqQueryParams),
    responses(
        (status = 200, description = "Matching papers in catalog order", body = [Resource]),
        (status = 400, description = "Unknown filter value", body = ErrorBody)
    )
)]
pub async fn list_pyqs_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PyqQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let query = params.to_query()?;
    let matches: Vec<Resource> = filter_resources(&state.catalog.past_papers, &query)
        .into_iter()
        .cloned()
        .collect();
    Ok(Json(matches))
}

/// The year and subject choices offered by the paper browser.
#[utoipa::path(
    get,
    path = "/pyqs/facets",
    params(FacetQueryParams),
    responses(
        (status = 200, description = "Available years and subjects", body = FacetsResponse),
        (status = 400, description = "Unknown department", body = ErrorBody)
    )
)]
pub async fn pyq_facets_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FacetQueryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let department = params.department()?;
    let papers = &state.catalog.past_papers;
    Ok(Json(FacetsResponse {
        years: available_years(papers),
        subjects: available_subjects(papers, &department),
    }))
}

/// Display text for every department, resource type and review status.
#[utoipa::path(
    get,
    path = "/labels",
    responses((status = 200, description = "Stored values with their display labels", body = LabelsResponse))
)]
pub async fn labels_handler() -> Json<LabelsResponse> {
    Json(LabelsResponse::all())
}

//=========================================================================================
// Bookmarks
//=========================================================================================

#[utoipa::path(
    get,
    path = "/bookmarks",
    params(("x-profile-id" = Option<String>, Header, description = "Bookmark profile; the default profile when absent.")),
    responses((status = 200, description = "Bookmarked ids in the order they were added", body = BookmarksResponse))
)]
pub async fn list_bookmarks_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let bookmarks = state.bookmarks(profile_id(&headers)).await.list().await?;
    Ok(Json(BookmarksResponse { bookmarks }))
}

/// Adds the resource to the bookmarks, or removes it if already there.
#[utoipa::path(
    post,
    path = "/bookmarks/{id}",
    params(
        ("id" = String, Path, description = "Catalog resource id"),
        ("x-profile-id" = Option<String>, Header, description = "Bookmark profile")
    ),
    responses(
        (status = 200, description = "New bookmark state", body = BookmarkToggleResponse),
        (status = 404, description = "No such resource", body = ErrorBody)
    )
)]
pub async fn toggle_bookmark_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.contains(&id) {
        return Err(campus_vault_core::PortError::NotFound(format!("resource {}", id)).into());
    }
    let bookmarked = state.bookmarks(profile_id(&headers)).await.toggle(&id).await?;
    Ok(Json(BookmarkToggleResponse {
        resource_id: id,
        bookmarked,
    }))
}

//=========================================================================================
// Submissions
//=========================================================================================

/// Submit material for faculty review.
#[utoipa::path(
    post,
    path = "/submissions",
    request_body = SubmissionRequest,
    params(("x-user-email" = String, Header, description = "Email of the signed-in account")),
    responses(
        (status = 201, description = "Stored as pending", body = StudentSubmission),
        (status = 400, description = "Missing or invalid fields", body = ErrorBody),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn create_submission_handler(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
    Json(request): Json<SubmissionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new = request.into_new_submission(&account.name, &account.email);
    let submission = state.workflow.submit(new).await?;
    info!("{} submitted {}.", account.email, submission.id);
    Ok((StatusCode::CREATED, Json(submission)))
}

/// The caller's own submissions with their review state.
#[utoipa::path(
    get,
    path = "/submissions/mine",
    params(("x-user-email" = String, Header, description = "Email of the signed-in account")),
    responses(
        (status = 200, description = "In submission order", body = [StudentSubmission]),
        (status = 401, description = "Not signed in", body = ErrorBody)
    )
)]
pub async fn my_submissions_handler(
    State(state): State<Arc<AppState>>,
    Extension(account): Extension<Account>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.submissions().list_for_student(&account.email).await?))
}

/// Approved submissions, published alongside the catalog.
#[utoipa::path(
    get,
    path = "/submissions/approved",
    responses((status = 200, description = "Approved submissions", body = [StudentSubmission]))
)]
pub async fn approved_submissions_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.submissions().list_approved().await?))
}

/// The faculty review queue.
#[utoipa::path(
    get,
    path = "/submissions",
    params(
        SubmissionListParams,
        ("x-user-email" = String, Header, description = "Email of a teacher or admin")
    ),
    responses(
        (status = 200, description = "Submissions in submission order", body = [StudentSubmission]),
        (status = 401, description = "Not signed in", body = ErrorBody),
        (status = 403, description = "Not faculty", body = ErrorBody)
    )
)]
pub async fn list_submissions_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SubmissionListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") | Some("all") => None,
        Some(raw) => Some(raw.parse::<ApprovalStatus>().map_err(ApiError::BadRequest)?),
    };
    let email = params
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());

    let repository = state.submissions();
    let submissions = match (status, email) {
        (None, None) => repository.list().await?,
        (None, Some(email)) => repository.search_by_email(email).await?,
        (Some(status), None) => repository.list_by_status(status).await?,
        (Some(status), Some(email)) => repository
            .search_by_email(email)
            .await?
            .into_iter()
            .filter(|s| s.status == status)
            .collect(),
    };
    Ok(Json(submissions))
}

#[utoipa::path(
    get,
    path = "/submissions/stats",
    params(("x-user-email" = String, Header, description = "Email of a teacher or admin")),
    responses(
        (status = 200, description = "Counts per review state", body = StatusCounts),
        (status = 403, description = "Not faculty", body = ErrorBody)
    )
)]
pub async fn submission_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.submissions().status_counts().await?))
}

#[utoipa::path(
    post,
    path = "/submissions/{id}/approve",
    params(
        ("id" = String, Path, description = "Submission id"),
        ("x-user-email" = String, Header, description = "Email of a teacher or admin")
    ),
    responses(
        (status = 200, description = "Approved", body = StudentSubmission),
        (status = 403, description = "Not faculty", body = ErrorBody),
        (status = 404, description = "No such submission", body = ErrorBody),
        (status = 409, description = "Already reviewed", body = ErrorBody)
    )
)]
pub async fn approve_submission_handler(
    State(state): State<Arc<AppState>>,
    Extension(reviewer): Extension<Account>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.workflow.approve(&id, &reviewer.name).await?))
}

#[utoipa::path(
    post,
    path = "/submissions/{id}/reject",
    request_body = RejectRequest,
    params(
        ("id" = String, Path, description = "Submission id"),
        ("x-user-email" = String, Header, description = "Email of a teacher or admin")
    ),
    responses(
        (status = 200, description = "Rejected", body = StudentSubmission),
        (status = 400, description = "Blank reason", body = ErrorBody),
        (status = 403, description = "Not faculty", body = ErrorBody),
        (status = 404, description = "No such submission", body = ErrorBody),
        (status = 409, description = "Already reviewed", body = ErrorBody)
    )
)]
pub async fn reject_submission_handler(
    State(state): State<Arc<AppState>>,
    Extension(reviewer): Extension<Account>,
    Path(id): Path<String>,
    Json(request): Json<RejectRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(
        state
            .workflow
            .reject(&id, &reviewer.name, &request.reason)
            .await?,
    ))
}

//=========================================================================================
// Guest Previews
//=========================================================================================

/// Starts a timed guest preview of a catalog resource.
#[utoipa::path(
    post,
    path = "/previews/{id}",
    params(("id" = String, Path, description = "Catalog id of the resource to preview")),
    responses(
        (status = 201, description = "Preview window opened", body = PreviewResponse),
        (status = 404, description = "No such resource", body = ErrorBody)
    )
)]
pub async fn open_preview_handler(
    State(state): State<Arc<AppState>>,
    Path(resource_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.catalog.contains(&resource_id) {
        return Err(
            campus_vault_core::PortError::NotFound(format!("resource {}", resource_id)).into(),
        );
    }

    let duration = state.config.preview_duration;
    let preview_id = format!("preview-{}", Uuid::new_v4());
    let mut previews = state.previews.lock().await;
    previews.retain(|_, window| !window.is_stale(EXPIRED_RETENTION));
    previews.insert(
        preview_id.clone(),
        PreviewWindow::open(resource_id.clone(), duration),
    );

    Ok((
        StatusCode::CREATED,
        Json(PreviewResponse {
            preview_id,
            resource_id,
            seconds: duration.as_secs(),
        }),
    ))
}

/// Whether a guest preview may still be shown.
#[utoipa::path(
    get,
    path = "/previews/{id}",
    params(("id" = String, Path, description = "Preview id returned when the preview was opened")),
    responses(
        (status = 200, description = "Preview state", body = PreviewStatusResponse),
        (status = 404, description = "Unknown, closed or long-expired preview", body = ErrorBody)
    )
)]
pub async fn preview_status_handler(
    State(state): State<Arc<AppState>>,
    Path(preview_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let previews = state.previews.lock().await;
    let window = previews.get(&preview_id).ok_or_else(|| {
        campus_vault_core::PortError::NotFound(format!("preview {}", preview_id))
    })?;
    Ok(Json(PreviewStatusResponse {
        preview_id: preview_id.clone(),
        resource_id: window.resource_id().to_string(),
        state: if window.is_closed() {
            PreviewState::Expired
        } else {
            PreviewState::Open
        },
    }))
}

/// The guest navigated away; stops the preview timer.
#[utoipa::path(
    delete,
    path = "/previews/{id}",
    params(("id" = String, Path, description = "Preview id returned when the preview was opened")),
    responses(
        (status = 204, description = "Preview closed"),
        (status = 404, description = "Unknown, closed or long-expired preview", body = ErrorBody)
    )
)]
pub async fn close_preview_handler(
    State(state): State<Arc<AppState>>,
    Path(preview_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let window = state
        .previews
        .lock()
        .await
        .remove(&preview_id)
        .ok_or_else(|| campus_vault_core::PortError::NotFound(format!("preview {}", preview_id)))?;
    window.cancel();
    Ok(StatusCode::NO_CONTENT)
}

//=========================================================================================
// Administration
//=========================================================================================

/// Provisions the demo admin, teacher and student accounts. Idempotent.
#[utoipa::path(
    post,
    path = "/admin/seed-users",
    responses((status = 200, description = "One result per demo account", body = SeedResponse))
)]
pub async fn seed_users_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let results = state.accounts.seed_demo_accounts().await?;
    Ok(Json(SeedResponse { results }))
}
