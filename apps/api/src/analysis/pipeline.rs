//! Analysis pipeline.
//!
//! extract → request analysis → normalize → upload original → save and append to owner.
//!
//! A failure before normalization stores nothing. A failure after the upload may
//! leave an orphaned file behind. The record and its owner link are written by
//! `AnalysisStore::save_for_owner` as one unit, so a record is never counted in
//! statistics without also appearing in its owner's list.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{DocumentFormat, ExtractionError, TextExtractor};
use crate::analysis::normalizer::{clean_text, normalize};
use crate::errors::AppError;
use crate::models::analysis::AnalysisRecord;
use crate::state::AppState;
use crate::storage::UploadedFile;

pub struct AnalyseRequest {
    pub owner_id: Uuid,
    pub file: UploadedFile,
    pub job_description: String,
}

pub async fn analyse_resume(
    state: &AppState,
    request: AnalyseRequest,
) -> Result<AnalysisRecord, AppError> {
    let AnalyseRequest {
        owner_id,
        file,
        job_description,
    } = request;

    let format = DocumentFormat::resolve(file.content_type.as_deref(), Some(&file.file_name))?;
    let extracted_text = clean_text(&extract_text(state.extractor.clone(), &file, format).await?);
    if extracted_text.is_empty() {
        warn!(%owner_id, %format, "Extraction yielded no text");
    }

    let raw = state
        .requester
        .request_analysis(&extracted_text, &job_description)
        .await
        .map_err(|e| AppError::Llm(e.to_string()))?;

    let analysis = normalize(&raw);

    let source_link = state
        .storage
        .upload(owner_id, &file)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

    let record = AnalysisRecord::new(owner_id, source_link, extracted_text, analysis);
    let record_id = state
        .analyses
        .save_for_owner(&record)
        .await
        .map_err(AppError::Persistence)?;

    info!(
        %owner_id,
        %record_id,
        score = record.analysis.score,
        ats_friendly = record.analysis.ats_friendly.as_str(),
        "Resume analysed"
    );
    Ok(record)
}

/// Runs the extractor off the async runtime.
async fn extract_text(
    extractor: Arc<dyn TextExtractor>,
    file: &UploadedFile,
    format: DocumentFormat,
) -> Result<String, ExtractionError> {
    let bytes = file.bytes.clone();
    tokio::task::spawn_blocking(move || extractor.extract(&bytes, format))
        .await
        .map_err(|e| ExtractionError::Corrupt {
            format,
            reason: format!("extraction task failed: {e}"),
        })?
}
