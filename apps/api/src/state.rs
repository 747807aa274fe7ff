use std::sync::Arc;

use crate::analysis::extractor::TextExtractor;
use crate::analysis::requester::AnalysisRequester;
use crate::config::Config;
use crate::storage::FileStorage;
use crate::store::{AnalysisStore, UserStore};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every collaborator sits behind a trait object so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub analyses: Arc<dyn AnalysisStore>,
    pub users: Arc<dyn UserStore>,
    /// Default: `LlmClient` (Gemini).
    pub requester: Arc<dyn AnalysisRequester>,
    /// Default: `DocumentTextExtractor` (PDF + DOCX).
    pub extractor: Arc<dyn TextExtractor>,
    /// Default: `S3FileStorage`.
    pub storage: Arc<dyn FileStorage>,
}
