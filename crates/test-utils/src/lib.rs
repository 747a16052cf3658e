use anyhow::Result;
use async_trait::async_trait;
use petcare::errors::PetCareError;
use petcare::knowledge::DEFAULT_CONDITIONS;
use petcare::providers::ai::{AiProvider, ImageLabeler};
use petcare::providers::db::{sqlite::SqliteProvider, storage::KnowledgeStore};
use petcare::types::ImageInput;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Test Setup ---

/// A helper struct to manage database creation for each test.
pub struct TestSetup {
    pub store: SqliteProvider,
}

impl TestSetup {
    /// Creates a new, isolated in-memory database with the schema and the
    /// default condition records.
    pub async fn new() -> Result<Self> {
        let store = Self::empty().await?.store;
        store.ensure_seeded(DEFAULT_CONDITIONS).await?;
        Ok(Self { store })
    }

    /// Creates an in-memory database with the schema but no rows.
    pub async fn empty() -> Result<Self> {
        let store = SqliteProvider::new(":memory:").await?;
        store.initialize_schema().await?;
        Ok(Self { store })
    }
}

// --- Mock AI Provider ---

/// A programmable stand-in for both the text generator and the image labeler.
#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    label: Arc<Mutex<Option<String>>>,
    failure: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            label: Arc::new(Mutex::new(None)),
            failure: Arc::new(Mutex::new(None)),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system or user prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Sets the label returned for every image.
    pub fn set_label(&self, label: &str) {
        *self.label.lock().unwrap() = Some(label.to_string());
    }

    /// Makes every subsequent call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    /// Retrieves the recorded calls for assertion. Image labeling calls are
    /// recorded with the instruction as the system prompt and `<image>` as
    /// the user prompt.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn check_failure(&self) -> Result<(), PetCareError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(message) => Err(PetCareError::AiApi(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, PetCareError> {
        self.calls
            .lock()
            .unwrap()
            .push((system_prompt.to_string(), user_prompt.to_string()));
        self.check_failure()?;

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) || user_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PetCareError::AiApi(format!(
            "MockAiProvider: No response programmed for prompt. Got: '{user_prompt}'"
        )))
    }
}

#[async_trait]
impl ImageLabeler for MockAiProvider {
    async fn label(&self, instruction: &str, _image: &ImageInput) -> Result<String, PetCareError> {
        self.calls
            .lock()
            .unwrap()
            .push((instruction.to_string(), "<image>".to_string()));
        self.check_failure()?;

        self.label.lock().unwrap().clone().ok_or_else(|| {
            PetCareError::AiApi("MockAiProvider: No label programmed.".to_string())
        })
    }
}
