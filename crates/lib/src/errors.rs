use thiserror::Error;

/// Custom error types for the `petcare` library.
///
/// The first four variants are the recoverable/irrecoverable kinds the
/// analysis pipeline reasons about. The remaining ones describe transport
/// and configuration problems raised by the providers; the `AnalysisClient`
/// folds those into one of the pipeline kinds before recording them.
#[derive(Error, Debug)]
pub enum PetCareError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Knowledge store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Image labeling failed: {0}")]
    LabelServiceFailure(String),
    #[error("Text generation failed: {0}")]
    GenerationServiceFailure(String),
    #[error("Failed to build Reqwest client: {0}")]
    ReqwestClientBuild(reqwest::Error),
    #[error("Failed to send request to AI provider: {0}")]
    AiRequest(reqwest::Error),
    #[error("Failed to deserialize AI provider response: {0}")]
    AiDeserialization(reqwest::Error),
    #[error("AI provider returned an error: {0}")]
    AiApi(String),
    #[error("Provider is not configured: {0}")]
    MissingProvider(String),
    #[error("{0} timed out after {1}s")]
    Timeout(String, u64),
}

impl From<turso::Error> for PetCareError {
    fn from(err: turso::Error) -> Self {
        PetCareError::StoreUnavailable(err.to_string())
    }
}
