//! # Shared Data Types
//!
//! Plain data structures passed between the pipeline stages. Everything here is
//! owned, `Send`, and free of request-scoped state so the pure stages can run in
//! any execution context.

use crate::errors::PetCareError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// --- Species ---

/// The animal a request is about.
///
/// Only cats and dogs have a body-condition assessment. Any other value is kept
/// verbatim so it can still be echoed back and used in the prompt persona.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Species {
    #[default]
    Cat,
    Dog,
    Other(String),
}

impl Species {
    /// The canonical wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Species::Cat => "cat",
            Species::Dog => "dog",
            Species::Other(s) => s,
        }
    }

    /// The name used when addressing the text generator.
    pub fn display_name(&self) -> &str {
        match self {
            Species::Cat => "고양이",
            Species::Dog => "강아지",
            Species::Other(s) => s,
        }
    }
}

impl From<&str> for Species {
    fn from(s: &str) -> Self {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "cat" | "고양이" => Species::Cat,
            "dog" | "강아지" => Species::Dog,
            _ => Species::Other(trimmed.to_string()),
        }
    }
}

impl FromStr for Species {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Species::from(s))
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Species {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Species {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Species::from(raw.as_str()))
    }
}

// --- Knowledge base records ---

/// One row of the `diseases` reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub id: i64,
    pub disease_name: String,
    /// Comma-separated keywords describing what the condition looks like in a photo.
    pub image_labels: String,
    /// Comma-separated keywords describing what an owner might observe.
    pub text_symptoms: String,
    pub warning_level: String,
    pub advice: String,
}

impl ConditionRecord {
    /// Trimmed, non-empty image keywords.
    pub fn image_keywords(&self) -> impl Iterator<Item = &str> {
        split_keywords(&self.image_labels)
    }
}

fn split_keywords(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|k| !k.is_empty())
}

/// A record to be inserted when seeding. It has no id until the store assigns one.
#[derive(Debug, Clone, Copy)]
pub struct ConditionSeed {
    pub disease_name: &'static str,
    pub image_labels: &'static str,
    pub text_symptoms: &'static str,
    pub warning_level: &'static str,
    pub advice: &'static str,
}

/// What `ensure_seeded` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "count", rename_all = "snake_case")]
pub enum SeedOutcome {
    /// The table was empty and this many records were inserted.
    Seeded(usize),
    /// The table already held this many records and was left untouched.
    AlreadyPresent(usize),
}

// --- Request ---

/// An uploaded photo.
#[derive(Clone)]
pub struct ImageInput {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    /// Where the boundary stored the file, relative to the public root.
    pub stored_path: Option<String>,
}

impl fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageInput")
            .field("len", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("stored_path", &self.stored_path)
            .finish()
    }
}

/// The typed request accepted by [`crate::AnalysisClient::analyze`].
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub species: Species,
    pub symptom_text: Option<String>,
    pub image: Option<ImageInput>,
    pub selected_behaviors: Vec<String>,
    pub age_years: f64,
    pub weight_kg: f64,
}

/// Form defaults used when the owner leaves age or weight empty.
pub const DEFAULT_AGE_YEARS: f64 = 2.0;
pub const DEFAULT_WEIGHT_KG: f64 = 4.5;

impl Default for AnalysisRequest {
    fn default() -> Self {
        Self {
            species: Species::default(),
            symptom_text: None,
            image: None,
            selected_behaviors: Vec::new(),
            age_years: DEFAULT_AGE_YEARS,
            weight_kg: DEFAULT_WEIGHT_KG,
        }
    }
}

impl AnalysisRequest {
    /// The trimmed symptom text, or `None` if it is absent or blank.
    pub fn observation(&self) -> Option<&str> {
        self.symptom_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Rejects requests the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), PetCareError> {
        if self.observation().is_none() && self.image.is_none() {
            return Err(PetCareError::InvalidInput(
                "사진 또는 증상 중 하나는 반드시 입력해야 합니다.".to_string(),
            ));
        }
        if !self.age_years.is_finite() || self.age_years < 0.0 {
            return Err(PetCareError::InvalidInput(format!(
                "age must be a non-negative number, got {}",
                self.age_years
            )));
        }
        if !self.weight_kg.is_finite() || self.weight_kg < 0.0 {
            return Err(PetCareError::InvalidInput(format!(
                "weight must be a non-negative number, got {}",
                self.weight_kg
            )));
        }
        Ok(())
    }
}

// --- Evidence ---

/// The normalized per-request evidence consumed by the composer.
#[derive(Debug, Clone, Serialize)]
pub struct EvidenceBundle {
    pub species: Species,
    pub symptom_text: Option<String>,
    /// True when a photo was uploaded, even if labeling it failed.
    pub image_supplied: bool,
    pub image_label: Option<String>,
    pub matched_conditions: Vec<ConditionRecord>,
    pub selected_behaviors: Vec<String>,
    pub age_years: f64,
    pub weight_kg: f64,
}

// --- Assessments ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
}

/// Coaching for one selected behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorResult {
    pub behavior: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub possible_causes: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coaching: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObesityStatus {
    Normal,
    Overweight,
    Obese,
    /// A qualitative self-assessment guide instead of a verdict.
    Guide,
}

impl ObesityStatus {
    pub fn label_ko(&self) -> &'static str {
        match self {
            ObesityStatus::Normal => "정상",
            ObesityStatus::Overweight => "과체중",
            ObesityStatus::Obese => "비만",
            ObesityStatus::Guide => "평가 가이드",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObesityResult {
    pub assessable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ObesityStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ideal_weight_kg: Option<f64>,
    pub message: String,
}

/// A collaborator failure the pipeline recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AnalysisIssue {
    StoreUnavailable(String),
    LabelServiceFailure(String),
    GenerationServiceFailure(String),
}

/// The final per-request result handed to the rendering boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub species: Species,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub symptom_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default)]
    pub matched_conditions: Vec<ConditionRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub behavior_analysis: Option<Vec<BehaviorResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub obesity_analysis: Option<ObesityResult>,
    /// The generated opinion in Markdown. `None` only when generation failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative: Option<String>,
    /// `narrative` rendered to HTML for display. Set exactly when `narrative` is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_html: Option<String>,
    /// Set instead of `narrative` when the text generator failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default)]
    pub issues: Vec<AnalysisIssue>,
    pub generated_at: DateTime<Utc>,
}

// --- Provider configuration ---

/// A reusable configuration for a specific AI provider instance.
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// The type of provider ("gemini" or "local").
    pub provider: String,
    /// The API URL. Optional for Gemini, where it is derived from the model name.
    pub api_url: Option<String>,
    /// The API key, which can be null for local providers.
    pub api_key: Option<String>,
    pub model_name: String,
}

/// Bounded retry for the two outbound calls.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Upper bound for a single attempt; an attempt that runs longer fails.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    1
}

fn default_backoff_ms() -> u64 {
    500
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_ms: default_backoff_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_accepts_korean_and_english_names() {
        assert_eq!("고양이".parse::<Species>().unwrap(), Species::Cat);
        assert_eq!("Dog".parse::<Species>().unwrap(), Species::Dog);
        assert_eq!(
            " 햄스터 ".parse::<Species>().unwrap(),
            Species::Other("햄스터".to_string())
        );
    }

    #[test]
    fn keywords_skip_blank_tokens() {
        let record = ConditionRecord {
            id: 1,
            disease_name: "x".into(),
            image_labels: " 붉은 눈, ,눈곱,".into(),
            text_symptoms: "눈곱".into(),
            warning_level: "".into(),
            advice: "".into(),
        };
        assert_eq!(record.image_keywords().collect::<Vec<_>>(), ["붉은 눈", "눈곱"]);
    }

    #[test]
    fn validate_requires_text_or_image() {
        let request = AnalysisRequest {
            symptom_text: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(
            request.validate(),
            Err(PetCareError::InvalidInput(_))
        ));

        let request = AnalysisRequest {
            symptom_text: Some("기침을 해요".into()),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let request = AnalysisRequest {
            symptom_text: Some("기침".into()),
            weight_kg: -1.0,
            ..Default::default()
        };
        assert!(request.validate().is_err());
    }
}
