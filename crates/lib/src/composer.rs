//! # Context Composer
//!
//! Turns a validated request plus the collaborator outputs into the evidence
//! bundle, the ordered prompt context and, once the narrative is back, the
//! final [`AssessmentResult`]. Everything here is synchronous and pure.

use crate::{
    behavior::analyze_behaviors,
    body_condition,
    prompts::{
        render,
        tasks::{
            ANALYSIS_USER_PROMPT, CONTEXT_BLOCK_SEPARATOR, KNOWLEDGE_BLOCK_HEADER,
            LABEL_BLOCK_HEADER, MISSION_COMBINED, MISSION_IMAGE_ONLY, MISSION_TEXT_ONLY,
            NO_MATCH_PLACEHOLDER, OBSERVATION_BLOCK_HEADER,
        },
    },
    types::{
        AnalysisRequest, AssessmentResult, BehaviorResult, ConditionRecord, EvidenceBundle,
        ObesityResult, Species,
    },
};
use chrono::Utc;
use pulldown_cmark::{html, Event, Options, Parser};
use serde::Serialize;

/// The prompt context derived from one evidence bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedContext {
    /// Blocks in prompt order: knowledge, observation, label.
    pub context_blocks: Vec<String>,
    pub mission: &'static str,
}

/// Builds the per-request evidence bundle.
///
/// `image_label` is `None` only when no photo was uploaded; a failed labeling
/// call still passes the failure sentinel.
pub fn build_evidence(
    request: &AnalysisRequest,
    image_label: Option<String>,
    matched_conditions: Vec<ConditionRecord>,
) -> EvidenceBundle {
    EvidenceBundle {
        species: request.species.clone(),
        symptom_text: request.observation().map(str::to_string),
        image_supplied: request.image.is_some(),
        image_label,
        matched_conditions,
        selected_behaviors: request.selected_behaviors.clone(),
        age_years: request.age_years,
        weight_kg: request.weight_kg,
    }
}

/// One line per matched record.
pub fn format_conditions(records: &[ConditionRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "- {} | 경고 수준: {} | 관련 증상: {} | 조언: {}",
                r.disease_name, r.warning_level, r.text_symptoms, r.advice
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn non_empty(text: &Option<String>) -> Option<&str> {
    text.as_deref().filter(|t| !t.is_empty())
}

/// Derives the ordered context blocks and the mission instruction.
pub fn compose(bundle: &EvidenceBundle) -> ComposedContext {
    let mut context_blocks = Vec::with_capacity(3);
    let observation = non_empty(&bundle.symptom_text);

    if bundle.image_supplied {
        let knowledge = if bundle.matched_conditions.is_empty() {
            NO_MATCH_PLACEHOLDER.to_string()
        } else {
            format_conditions(&bundle.matched_conditions)
        };
        context_blocks.push(format!("{KNOWLEDGE_BLOCK_HEADER}\n{knowledge}"));
    }

    if let Some(text) = observation {
        context_blocks.push(format!("{OBSERVATION_BLOCK_HEADER}\n{text}"));
    }

    let mission = match (bundle.image_supplied, observation.is_some()) {
        (true, true) => MISSION_COMBINED,
        (true, false) => MISSION_IMAGE_ONLY,
        (false, _) => MISSION_TEXT_ONLY,
    };

    if let Some(label) = &bundle.image_label {
        context_blocks.push(format!("{LABEL_BLOCK_HEADER}\n{label}"));
    }

    ComposedContext {
        context_blocks,
        mission,
    }
}

/// Renders the user prompt for the text generator.
pub fn build_prompt(species: &Species, context: &ComposedContext) -> String {
    let joined = context.context_blocks.join(CONTEXT_BLOCK_SEPARATOR);
    render(
        ANALYSIS_USER_PROMPT,
        &[
            ("pet_type", species.display_name()),
            ("context", &joined),
            ("mission", context.mission),
        ],
    )
}

/// Runs the two rule-based assessments the bundle asks for. Behavior analysis
/// only runs when the owner ticked at least one behavior.
pub fn rule_based_assessments(
    bundle: &EvidenceBundle,
) -> (Option<Vec<BehaviorResult>>, Option<ObesityResult>) {
    let behavior = (!bundle.selected_behaviors.is_empty()).then(|| {
        analyze_behaviors(
            &bundle.selected_behaviors[..],
            bundle.symptom_text.as_deref().unwrap_or_default(),
        )
    });
    let obesity = body_condition::assess(&bundle.species, bundle.age_years, bundle.weight_kg);
    (behavior, obesity)
}

/// Renders the generator's Markdown to HTML. Raw HTML in the input is
/// escaped rather than passed through.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
        .map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            other => other,
        });
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Merges the generated narrative and the rule-based assessments.
///
/// A failed generation becomes `error`; the assessments are kept either way.
/// `image_path` and `issues` are left for the caller to fill in.
pub fn finalize(
    bundle: EvidenceBundle,
    narrative: Result<String, String>,
    behavior_analysis: Option<Vec<BehaviorResult>>,
    obesity_analysis: Option<ObesityResult>,
) -> AssessmentResult {
    let (narrative, narrative_html, error) = match narrative {
        Ok(text) => {
            let html = render_markdown(&text);
            (Some(text), Some(html), None)
        }
        Err(message) => (None, None, Some(message)),
    };
    AssessmentResult {
        species: bundle.species,
        symptom_text: bundle.symptom_text,
        image_label: bundle.image_label,
        image_path: None,
        matched_conditions: bundle.matched_conditions,
        behavior_analysis,
        obesity_analysis,
        narrative,
        narrative_html,
        error,
        issues: Vec::new(),
        generated_at: Utc::now(),
    }
}
