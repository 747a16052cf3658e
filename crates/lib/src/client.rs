//! # Analysis Client
//!
//! Wires the pure pipeline stages to the three collaborators: the image
//! labeler, the knowledge store and the text generator. Only invalid input is
//! returned as an error; every collaborator failure is recovered from locally
//! and recorded in [`AssessmentResult::issues`].

use crate::{
    composer::{self, ComposedContext},
    constants::LABEL_FAILURE_SENTINEL,
    errors::PetCareError,
    prompts::tasks::{ANALYSIS_SYSTEM_PROMPT, IMAGE_LABELING_PROMPT},
    providers::{
        ai::{AiProvider, ImageLabeler},
        db::storage::KnowledgeStore,
    },
    types::{AnalysisIssue, AnalysisRequest, AssessmentResult, ImageInput, RetryPolicy},
};
use serde::Serialize;
use std::{future::Future, time::Duration};
use tracing::{debug, info, warn};

/// The result of one analysis together with what was sent to the generator.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub result: AssessmentResult,
    pub context: ComposedContext,
    pub prompt: String,
}

/// The analysis orchestrator. Cheap to clone; all collaborators are shared.
#[derive(Clone, Debug)]
pub struct AnalysisClient {
    ai_provider: Box<dyn AiProvider>,
    image_labeler: Option<Box<dyn ImageLabeler>>,
    knowledge_store: Box<dyn KnowledgeStore>,
    retry_policy: RetryPolicy,
    system_prompt: String,
    labeling_prompt: String,
}

/// A builder for creating an [`AnalysisClient`].
#[derive(Default)]
pub struct AnalysisClientBuilder {
    ai_provider: Option<Box<dyn AiProvider>>,
    image_labeler: Option<Box<dyn ImageLabeler>>,
    knowledge_store: Option<Box<dyn KnowledgeStore>>,
    retry_policy: Option<RetryPolicy>,
    system_prompt: Option<String>,
    labeling_prompt: Option<String>,
}

impl AnalysisClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text generator.
    pub fn ai_provider(mut self, ai_provider: Box<dyn AiProvider>) -> Self {
        self.ai_provider = Some(ai_provider);
        self
    }

    /// Sets the image labeler. Without one, every uploaded photo gets the
    /// failure label.
    pub fn image_labeler(mut self, image_labeler: Box<dyn ImageLabeler>) -> Self {
        self.image_labeler = Some(image_labeler);
        self
    }

    /// Sets the knowledge store used to match image labels.
    pub fn knowledge_store(mut self, knowledge_store: Box<dyn KnowledgeStore>) -> Self {
        self.knowledge_store = Some(knowledge_store);
        self
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = Some(retry_policy);
        self
    }

    /// Overrides the system prompt sent with every analysis.
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    /// Overrides the instruction sent with every photo.
    pub fn labeling_prompt(mut self, labeling_prompt: impl Into<String>) -> Self {
        self.labeling_prompt = Some(labeling_prompt.into());
        self
    }

    /// Builds the client.
    ///
    /// Fails with [`PetCareError::MissingProvider`] if the text generator or the
    /// knowledge store was not set.
    pub fn build(self) -> Result<AnalysisClient, PetCareError> {
        let ai_provider = self.ai_provider.ok_or_else(|| {
            PetCareError::MissingProvider("an AI provider is required".to_string())
        })?;
        let knowledge_store = self.knowledge_store.ok_or_else(|| {
            PetCareError::MissingProvider("a knowledge store is required".to_string())
        })?;
        let retry_policy = self.retry_policy.unwrap_or_default();
        if retry_policy.max_attempts == 0 {
            return Err(PetCareError::InvalidInput(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if retry_policy.timeout_secs == 0 {
            return Err(PetCareError::InvalidInput(
                "retry.timeout_secs must be at least 1".to_string(),
            ));
        }

        Ok(AnalysisClient {
            ai_provider,
            image_labeler: self.image_labeler,
            knowledge_store,
            retry_policy,
            system_prompt: self
                .system_prompt
                .unwrap_or_else(|| ANALYSIS_SYSTEM_PROMPT.to_string()),
            labeling_prompt: self
                .labeling_prompt
                .unwrap_or_else(|| IMAGE_LABELING_PROMPT.to_string()),
        })
    }
}

fn backoff_delay(policy: RetryPolicy, attempt: u32) -> Duration {
    Duration::from_millis(policy.backoff_ms.saturating_mul(u64::from(attempt)))
}

/// Runs `op` up to `policy.max_attempts` times, sleeping `backoff_ms * n`
/// after the n-th failure. Each attempt is cut off after `timeout_secs`.
async fn with_retry<T, F, Fut>(policy: RetryPolicy, what: &str, mut op: F) -> Result<T, PetCareError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PetCareError>>,
{
    let attempts = policy.max_attempts.max(1);
    let limit = Duration::from_secs(policy.timeout_secs);
    let mut attempt = 1;
    loop {
        let outcome = tokio::time::timeout(limit, op())
            .await
            .unwrap_or_else(|_| Err(PetCareError::Timeout(what.to_string(), policy.timeout_secs)));
        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if attempt < attempts => {
                warn!("{what} failed (attempt {attempt}/{attempts}): {e}");
                tokio::time::sleep(backoff_delay(policy, attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

impl AnalysisClient {
    /// The knowledge store this client matches labels against.
    pub fn knowledge_store(&self) -> &dyn KnowledgeStore {
        self.knowledge_store.as_ref()
    }

    /// Runs the full pipeline for one request.
    pub async fn analyze(&self, request: AnalysisRequest) -> Result<AssessmentResult, PetCareError> {
        Ok(self.analyze_detailed(request).await?.result)
    }

    /// Same as [`AnalysisClient::analyze`], also returning the composed
    /// context and the prompt that was sent.
    pub async fn analyze_detailed(
        &self,
        request: AnalysisRequest,
    ) -> Result<AnalysisReport, PetCareError> {
        request.validate()?;
        info!(
            species = %request.species,
            has_text = request.observation().is_some(),
            has_image = request.image.is_some(),
            behaviors = request.selected_behaviors.len(),
            "[analyze] starting analysis"
        );

        let mut issues = Vec::new();

        let (image_label, matched) = match &request.image {
            Some(image) => {
                let label = self.label_image(image, &mut issues).await;
                let matched = match self.knowledge_store.query_by_label_substring(&label).await {
                    Ok(matched) => matched,
                    Err(e) => {
                        warn!("[analyze] knowledge store unavailable: {e}");
                        issues.push(AnalysisIssue::StoreUnavailable(e.to_string()));
                        Vec::new()
                    }
                };
                debug!("[analyze] label matched {} condition(s)", matched.len());
                (Some(label), matched)
            }
            None => (None, Vec::new()),
        };

        let bundle = composer::build_evidence(&request, image_label, matched);
        let context = composer::compose(&bundle);
        let prompt = composer::build_prompt(&bundle.species, &context);
        debug!(user_prompt = %prompt, "--> Sending analysis prompt to AI provider");

        let narrative = with_retry(self.retry_policy, "text generation", || {
            self.ai_provider.generate(&self.system_prompt, &prompt)
        })
        .await
        .map_err(|e| {
            warn!("[analyze] text generation failed: {e}");
            issues.push(AnalysisIssue::GenerationServiceFailure(e.to_string()));
            format!("분석 중 오류가 발생했습니다: {e}")
        });

        let (behavior, obesity) = composer::rule_based_assessments(&bundle);
        let mut result = composer::finalize(bundle, narrative, behavior, obesity);
        result.image_path = request.image.as_ref().and_then(|i| i.stored_path.clone());
        result.issues = issues;

        info!(
            matched = result.matched_conditions.len(),
            issues = result.issues.len(),
            "[analyze] analysis finished"
        );
        Ok(AnalysisReport {
            result,
            context,
            prompt,
        })
    }

    async fn label_image(&self, image: &ImageInput, issues: &mut Vec<AnalysisIssue>) -> String {
        let Some(labeler) = &self.image_labeler else {
            warn!("[analyze] no image labeler configured");
            issues.push(AnalysisIssue::LabelServiceFailure(
                "no image labeler configured".to_string(),
            ));
            return LABEL_FAILURE_SENTINEL.to_string();
        };

        match with_retry(self.retry_policy, "image labeling", || {
            labeler.label(&self.labeling_prompt, image)
        })
        .await
        {
            Ok(label) => {
                let label = label.trim().to_string();
                info!("[analyze] image label: {label}");
                label
            }
            Err(e) => {
                warn!("[analyze] image labeling failed: {e}");
                issues.push(AnalysisIssue::LabelServiceFailure(e.to_string()));
                LABEL_FAILURE_SENTINEL.to_string()
            }
        }
    }
}
