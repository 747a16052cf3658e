//! # AI Provider Factory
//!
//! This module centralizes the logic for creating AI provider instances from a
//! `ProviderConfig`. Both the server and the CLI go through it, so a provider
//! entry in `config.yml` and the CLI's environment variables resolve the same way.

use crate::{
    errors::PetCareError,
    providers::ai::{gemini::GeminiProvider, local::LocalAiProvider, AiProvider, ImageLabeler},
    types::ProviderConfig,
};
use tracing::info;

/// A configured provider. Every supported backend can both generate text and
/// label images, so callers pick the role they need.
#[derive(Clone, Debug)]
pub enum ConfiguredProvider {
    Gemini(GeminiProvider),
    Local(LocalAiProvider),
}

impl ConfiguredProvider {
    pub fn generator(&self) -> Box<dyn AiProvider> {
        match self {
            ConfiguredProvider::Gemini(p) => Box::new(p.clone()),
            ConfiguredProvider::Local(p) => Box::new(p.clone()),
        }
    }

    pub fn labeler(&self) -> Box<dyn ImageLabeler> {
        match self {
            ConfiguredProvider::Gemini(p) => Box::new(p.clone()),
            ConfiguredProvider::Local(p) => Box::new(p.clone()),
        }
    }
}

/// Creates a provider instance from its configuration.
///
/// - `gemini` requires an API key; the URL is derived from the model name when absent.
/// - `local` requires an API URL; the key is optional.
pub fn create_provider(
    name: &str,
    config: &ProviderConfig,
) -> Result<ConfiguredProvider, PetCareError> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    PetCareError::MissingProvider(format!(
                        "api_key is required for gemini provider '{name}'"
                    ))
                })?;
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .unwrap_or_else(|| GeminiProvider::endpoint_for_model(&config.model_name));
            info!("Configuring Gemini provider '{name}' with URL: {api_url}");
            Ok(ConfiguredProvider::Gemini(GeminiProvider::new(
                api_url, api_key,
            )?))
        }
        "local" => {
            let api_url = config
                .api_url
                .clone()
                .filter(|u| !u.is_empty())
                .ok_or_else(|| {
                    PetCareError::MissingProvider(format!(
                        "api_url is required for local provider '{name}'. Please set LOCAL_AI_API_URL in your .env file."
                    ))
                })?;
            info!("Configuring local AI provider '{name}' with URL: {api_url}");
            Ok(ConfiguredProvider::Local(LocalAiProvider::new(
                api_url,
                config.api_key.clone().filter(|k| !k.is_empty()),
                Some(config.model_name.clone()),
            )?))
        }
        other => Err(PetCareError::MissingProvider(format!(
            "unsupported AI provider type '{other}' for provider '{name}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(provider: &str, api_url: Option<&str>, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            provider: provider.to_string(),
            api_url: api_url.map(String::from),
            api_key: api_key.map(String::from),
            model_name: "gemini-1.5-flash".to_string(),
        }
    }

    #[test]
    fn gemini_without_key_is_rejected() {
        let err = create_provider("gemini_default", &config("gemini", None, None)).unwrap_err();
        assert!(matches!(err, PetCareError::MissingProvider(_)));
    }

    #[test]
    fn local_without_url_is_rejected() {
        let err = create_provider("local_default", &config("local", None, None)).unwrap_err();
        assert!(matches!(err, PetCareError::MissingProvider(_)));
    }

    #[test]
    fn unknown_provider_type_is_rejected() {
        assert!(create_provider("x", &config("openai", Some("http://x"), None)).is_err());
    }

    #[test]
    fn gemini_url_defaults_to_model_endpoint() {
        assert_eq!(
            GeminiProvider::endpoint_for_model("gemini-1.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
        let provider = create_provider("g", &config("gemini", None, Some("key"))).unwrap();
        assert!(matches!(provider, ConfiguredProvider::Gemini(_)));
    }
}
