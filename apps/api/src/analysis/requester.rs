//! Analysis Requester — the seam between the pipeline and the model.
//!
//! `AppState` holds an `Arc<dyn AnalysisRequester>`; production uses
//! `LlmClient`, tests substitute canned replies.

use async_trait::async_trait;
use tracing::info;

use crate::analysis::prompts::{build_analysis_prompt, ANALYSIS_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

/// Returns the model's raw reply. No structure is promised: the reply goes
/// through `normalizer::normalize` before anything reads it.
#[async_trait]
pub trait AnalysisRequester: Send + Sync {
    async fn request_analysis(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, LlmError>;
}

#[async_trait]
impl AnalysisRequester for LlmClient {
    async fn request_analysis(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<String, LlmError> {
        let prompt = build_analysis_prompt(resume_text, job_description);
        let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");
        let reply = self.call_text(&prompt, &system).await?;
        info!(reply_len = reply.len(), "Received analysis reply from model");
        Ok(reply)
    }
}
