use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::autosave::AutosaveStatus;
use crate::cv::completeness::{compute_completeness_report, CompletenessReport};
use crate::cv::models::{CvContent, CvDocument, CvSummary};
use crate::cv::validation::{validate_content, ValidationIssue};
use crate::errors::AppError;
use crate::state::AppState;
use crate::templates::{self, DEFAULT_TEMPLATE_ID};

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

#[derive(Deserialize)]
pub struct CreateCvRequest {
    pub user_id: Uuid,
    pub template_id: Option<String>,
    #[serde(default)]
    pub content: CvContent,
}

#[derive(Deserialize)]
pub struct DraftUpdate {
    pub user_id: Uuid,
    pub template_id: String,
    pub content: CvContent,
}

#[derive(Serialize)]
pub struct DraftAccepted {
    pub autosave: AutosaveStatus,
    pub issues: Vec<ValidationIssue>,
}

fn require_template(template_id: &str) -> Result<(), AppError> {
    templates::find(template_id)
        .map(|_| ())
        .ok_or_else(|| AppError::Validation(format!("Unknown template '{template_id}'")))
}

async fn load_owned(state: &AppState, user_id: Uuid, cv_id: Uuid) -> Result<CvDocument, AppError> {
    state
        .store
        .load(user_id, cv_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {cv_id} not found")))
}

/// POST /api/v1/cvs
pub async fn handle_create_cv(
    State(state): State<AppState>,
    Json(req): Json<CreateCvRequest>,
) -> Result<(StatusCode, Json<CvDocument>), AppError> {
    let template_id = req
        .template_id
        .unwrap_or_else(|| DEFAULT_TEMPLATE_ID.to_string());
    require_template(&template_id)?;

    let doc = CvDocument::new(req.user_id, template_id, req.content);
    state.store.upsert(&doc).await?;
    info!("Created CV {} for user {}", doc.id, doc.user_id);

    Ok((StatusCode::CREATED, Json(doc)))
}

/// GET /api/v1/cvs
pub async fn handle_list_cvs(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<CvSummary>>, AppError> {
    Ok(Json(state.store.list(params.user_id).await?))
}

/// GET /api/v1/cvs/:id
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CvDocument>, AppError> {
    Ok(Json(load_owned(&state, params.user_id, id).await?))
}

/// PUT /api/v1/cvs/:id/draft
///
/// Accepts every keystroke-level change; the write itself happens once the
/// editor has been quiet for the configured period.
pub async fn handle_save_draft(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DraftUpdate>,
) -> Result<(StatusCode, Json<DraftAccepted>), AppError> {
    require_template(&req.template_id)?;
    load_owned(&state, req.user_id, id).await?;

    let report = validate_content(&req.content);
    let doc = CvDocument {
        id,
        user_id: req.user_id,
        template_id: req.template_id,
        content: req.content,
        updated_at: Utc::now(),
    };
    let autosave = state.autosave.trigger(doc);

    Ok((
        StatusCode::ACCEPTED,
        Json(DraftAccepted {
            autosave,
            issues: report.issues,
        }),
    ))
}

/// GET /api/v1/cvs/:id/autosave
pub async fn handle_autosave_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<AutosaveStatus>, AppError> {
    load_owned(&state, params.user_id, id).await?;
    Ok(Json(state.autosave.status(id)))
}

/// GET /api/v1/cvs/:id/health
pub async fn handle_cv_health(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<CompletenessReport>, AppError> {
    let doc = load_owned(&state, params.user_id, id).await?;
    Ok(Json(compute_completeness_report(&doc.content)))
}
