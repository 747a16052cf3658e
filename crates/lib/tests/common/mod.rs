#![allow(dead_code)]
//! # Common Test Utilities
//!
//! Mock collaborators for the analysis pipeline, so client tests are isolated
//! and repeatable without a network or a database file.

use async_trait::async_trait;
use dotenvy::dotenv;
use petcare::{
    errors::PetCareError,
    providers::{
        ai::{AiProvider, ImageLabeler},
        db::storage::KnowledgeStore,
    },
    types::{ConditionRecord, ConditionSeed, ImageInput, SeedOutcome},
};
use std::fmt::Debug;
use std::sync::{Arc, Once, RwLock};

#[cfg(test)]
static INIT: Once = Once::new();

/// Initializes the tracing subscriber and loads .env for tests.
#[cfg(test)]
pub fn setup_tracing() {
    INIT.call_once(|| {
        dotenv().ok();
        tracing_subscriber::fmt::init();
    });
}

// --- Mock text generator ---
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    pub call_history: Arc<RwLock<Vec<(String, String)>>>,
    pub responses: Arc<RwLock<Vec<Result<String, String>>>>,
}

impl MockAiProvider {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            call_history: Arc::new(RwLock::new(Vec::new())),
            responses: Arc::new(RwLock::new(responses.into_iter().rev().collect())),
        }
    }

    pub fn answering(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub fn failing(message: &str) -> Self {
        Self::new(vec![Err(message.to_string())])
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.call_history.read().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PetCareError> {
        self.call_history
            .write()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));

        match self.responses.write().unwrap().pop() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PetCareError::AiApi(message)),
            None => Ok("Default mock response".to_string()),
        }
    }
}

// --- Mock image labeler ---
#[derive(Clone, Debug)]
pub struct MockLabeler {
    pub label: Result<String, String>,
    pub calls: Arc<RwLock<usize>>,
}

impl MockLabeler {
    pub fn returning(label: &str) -> Self {
        Self {
            label: Ok(label.to_string()),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            label: Err(message.to_string()),
            calls: Arc::new(RwLock::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.read().unwrap()
    }
}

#[async_trait]
impl ImageLabeler for MockLabeler {
    async fn label(&self, _instruction: &str, _image: &ImageInput) -> Result<String, PetCareError> {
        *self.calls.write().unwrap() += 1;
        self.label.clone().map_err(PetCareError::AiApi)
    }
}

// --- A store that is always down ---
#[derive(Clone, Debug)]
pub struct BrokenStore;

#[async_trait]
impl KnowledgeStore for BrokenStore {
    fn name(&self) -> &str {
        "broken"
    }
    async fn load(&self) -> Result<Vec<ConditionRecord>, PetCareError> {
        Err(PetCareError::StoreUnavailable("database is locked".to_string()))
    }
    async fn count(&self) -> Result<usize, PetCareError> {
        Err(PetCareError::StoreUnavailable("database is locked".to_string()))
    }
    async fn ensure_seeded(&self, _defaults: &[ConditionSeed]) -> Result<SeedOutcome, PetCareError> {
        Err(PetCareError::StoreUnavailable("database is locked".to_string()))
    }
    async fn reseed(&self, _defaults: &[ConditionSeed]) -> Result<usize, PetCareError> {
        Err(PetCareError::StoreUnavailable("database is locked".to_string()))
    }
}

/// A tiny PNG-ish payload; the mocks never decode it.
pub fn sample_image() -> ImageInput {
    ImageInput {
        bytes: vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a],
        mime_type: "image/png".to_string(),
        stored_path: Some("uploads/cat_1234.png".to_string()),
    }
}
