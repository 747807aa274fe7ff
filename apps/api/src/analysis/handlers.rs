use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::analysis::pipeline::{analyse_resume, AnalyseRequest};
use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRecord;
use crate::state::AppState;
use crate::storage::UploadedFile;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "jobDescription";

#[derive(Debug, Serialize)]
pub struct AnalyseResponse {
    pub message: String,
    pub resume: AnalysisRecord,
}

/// POST /resume/analyse
///
/// Multipart body: `resume` (PDF or DOCX) and an optional `jobDescription`.
pub async fn handle_analyse(
    State(state): State<AppState>,
    authed: AuthedUser,
    mut multipart: Multipart,
) -> Result<Json<AnalyseResponse>, AppError> {
    let mut file: Option<UploadedFile> = None;
    let mut job_description = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        match field.name() {
            Some(RESUME_FIELD) => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
                file = Some(UploadedFile {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            Some(JOB_DESCRIPTION_FIELD) => {
                job_description = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid job description: {e}")))?;
            }
            _ => {}
        }
    }

    let file = file
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("No resume file provided".to_string()))?;

    info!(
        user_id = %authed.id,
        file_name = %file.file_name,
        size = file.bytes.len(),
        "Resume analysis requested"
    );

    state
        .users
        .ensure_user(authed.id, &authed.email)
        .await
        .map_err(AppError::Persistence)?;

    let record = analyse_resume(
        &state,
        AnalyseRequest {
            owner_id: authed.id,
            file,
            job_description,
        },
    )
    .await?;

    Ok(Json(AnalyseResponse {
        message: "Resume analyzed successfully".to_string(),
        resume: record,
    }))
}
