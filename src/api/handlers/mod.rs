use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use super::AppState;
use crate::error::WorkspaceError;
use crate::models::*;

/// Default number of cards per page in the other-projects listing.
const DEFAULT_PAGE_SIZE: usize = 6;

// ============================================================
// Error Handling
// ============================================================

/// Map a workspace error onto a status code and client-facing message.
///
/// I/O failures are logged in full and reported with a generic message; the
/// other variants describe caller mistakes and are returned as-is.
fn workspace_error(e: WorkspaceError) -> (StatusCode, String) {
    let status = match &e {
        WorkspaceError::NotFound(_) => StatusCode::NOT_FOUND,
        WorkspaceError::Configuration
        | WorkspaceError::Conflict(_)
        | WorkspaceError::SessionRequired
        | WorkspaceError::InvalidName(_) => StatusCode::BAD_REQUEST,
        WorkspaceError::Io(_) => {
            tracing::error!("Internal error: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            );
        }
    };

    tracing::warn!("Request rejected: {}", e);
    (status, e.to_string())
}

fn bad_request(e: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, e.to_string())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(State(state): State<AppState>) -> Json<ProjectListResponse> {
    Json(ProjectListResponse {
        projects: state.store.list().into_iter().map(|p| p.name).collect(),
        current_project: state.store.active(),
    })
}

pub async fn create_project(
    State(state): State<AppState>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<CreateProjectResponse>), (StatusCode, String)> {
    state
        .store
        .create(&input.name)
        .map(|p| {
            (
                StatusCode::CREATED,
                Json(CreateProjectResponse {
                    message: format!("Project {} created", p.name),
                    project: p.name,
                }),
            )
        })
        .map_err(workspace_error)
}

pub async fn select_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<SelectProjectResponse>, (StatusCode, String)> {
    let selection = state.store.select(&name).map_err(workspace_error)?;
    Ok(Json(SelectProjectResponse {
        message: format!("Switched to project {}", selection.session.name),
        current_project: selection.session,
        has_html: selection.has_artifact,
    }))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.delete(&name).map_err(workspace_error)?;
    Ok(Json(serde_json::json!({
        "message": format!("Project {} deleted", name.trim())
    })))
}

pub async fn rename_project(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(input): Json<RenameProjectInput>,
) -> Result<Json<RenameProjectResponse>, (StatusCode, String)> {
    state
        .store
        .rename(&name, &input.new_name)
        .map(Json)
        .map_err(workspace_error)
}

pub async fn exit_project(State(state): State<AppState>) -> Json<ExitSessionResponse> {
    state.store.exit();
    Json(ExitSessionResponse {
        message: "Exited current project".to_string(),
        current_project: state.store.active(),
    })
}

pub async fn list_other_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectPageQuery>,
) -> Result<Json<ProjectPage>, (StatusCode, String)> {
    state
        .store
        .list_others(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
        .map(Json)
        .map_err(workspace_error)
}

// ============================================================
// Thumbnails
// ============================================================

pub async fn get_thumbnail(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let bytes = state.store.thumbnail(&name).map_err(workspace_error)?;
    Ok(([(header::CONTENT_TYPE, "image/png")], bytes))
}

/// Save the `thumbnail` field of a multipart upload as the active project's preview.
pub async fn upload_thumbnail(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    state.store.require_active().map_err(workspace_error)?;

    let mut thumbnail: Option<Bytes> = None;
    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        if field.name() == Some("thumbnail") {
            thumbnail = Some(field.bytes().await.map_err(bad_request)?);
            break;
        }
    }
    let thumbnail = thumbnail.ok_or_else(|| bad_request("No file uploaded"))?;

    state.store.store_thumbnail(&thumbnail).map_err(|e| {
        tracing::warn!("Failed to save thumbnail: {}", e);
        workspace_error(e)
    })?;

    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Thumbnail saved"
    })))
}

// ============================================================
// Generation
// ============================================================

pub async fn generate(
    State(state): State<AppState>,
    Json(input): Json<GenerateInput>,
) -> Result<Json<GenerationOutcome>, (StatusCode, String)> {
    state
        .generator
        .generate(&input.prompt)
        .await
        .map(Json)
        .map_err(workspace_error)
}

pub async fn get_html(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let bytes = state.store.artifact().map_err(workspace_error)?;
    Ok(([(header::CONTENT_TYPE, "text/html; charset=utf-8")], bytes))
}

pub async fn get_prompts(
    State(state): State<AppState>,
) -> Result<Json<PromptHistoryResponse>, (StatusCode, String)> {
    let prompts = state.store.history().map_err(workspace_error)?;
    Ok(Json(PromptHistoryResponse {
        prompts,
        current_project: state.store.active(),
    }))
}
