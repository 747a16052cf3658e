pub mod gemini;
pub mod local;

use crate::{errors::PetCareError, types::ImageInput};
use async_trait::async_trait;
use dyn_clone::DynClone;
use std::fmt::Debug;

/// A trait for interacting with a text-generation provider.
///
/// This trait defines a common interface for producing prose from a system and
/// user prompt using different Large Language Models (e.g., Gemini, local models).
#[async_trait]
pub trait AiProvider: Send + Sync + Debug + DynClone {
    /// Generates a response from a given system and user prompt.
    ///
    /// The result should be a string containing the AI's response.
    async fn generate(&self, system_prompt: &str, user_prompt: &str)
        -> Result<String, PetCareError>;
}

dyn_clone::clone_trait_object!(AiProvider);

/// A trait for turning a photo into a short descriptive label.
///
/// Implemented by the multimodal providers. The `instruction` tells the model
/// what to describe; the returned text is used verbatim as the image label.
#[async_trait]
pub trait ImageLabeler: Send + Sync + Debug + DynClone {
    async fn label(&self, instruction: &str, image: &ImageInput) -> Result<String, PetCareError>;
}

dyn_clone::clone_trait_object!(ImageLabeler);
