use crate::{knowledge::open_store, report};
use anyhow::{Context, Result};
use clap::Parser;
use petcare::{
    constants::DEFAULT_DB_FILE,
    knowledge::{StaticKnowledgeBase, DEFAULT_CONDITIONS},
    providers::{db::storage::KnowledgeStore, factory::create_provider},
    types::{ProviderConfig, RetryPolicy, DEFAULT_AGE_YEARS, DEFAULT_WEIGHT_KG},
    AnalysisClientBuilder, AnalysisRequest, ImageInput, Species,
};
use std::path::Path;
use tracing::info;

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// 고양이/cat or 강아지/dog
    #[arg(long, default_value = "고양이")]
    pub species: String,
    /// What the owner observed
    #[arg(long)]
    pub symptoms: Option<String>,
    /// Path to a photo of the pet
    #[arg(long)]
    pub image: Option<String>,
    /// A behavior from the checklist; repeat for several
    #[arg(long = "behavior")]
    pub behaviors: Vec<String>,
    /// Age in years
    #[arg(long, default_value_t = DEFAULT_AGE_YEARS)]
    pub age: f64,
    /// Weight in kilograms
    #[arg(long, default_value_t = DEFAULT_WEIGHT_KG)]
    pub weight: f64,
    /// The path to the SQLite database file
    #[arg(long, env = "DB_URL", default_value = DEFAULT_DB_FILE)]
    pub db: String,
    /// The AI backend: gemini or local
    #[arg(long, env = "AI_PROVIDER", default_value = "gemini")]
    pub provider: String,
    /// The provider endpoint; required for local, derived from the model for gemini
    #[arg(long, env = "AI_API_URL")]
    pub api_url: Option<String>,
    #[arg(long, env = "AI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
    #[arg(long, env = "AI_MODEL", default_value = "gemini-1.5-flash")]
    pub model: String,
    /// How many times each provider call is attempted
    #[arg(long, default_value_t = 1)]
    pub attempts: u32,
    /// Seconds before a single provider call is abandoned
    #[arg(long, default_value_t = 60)]
    pub timeout: u64,
    /// Print the full result as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

async fn read_image(path: &str) -> Result<ImageInput> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read image '{path}'"))?;
    Ok(ImageInput {
        bytes,
        mime_type: mime_type_for(Path::new(path)).to_string(),
        stored_path: Some(path.to_string()),
    })
}

pub async fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let image = match &args.image {
        Some(path) => Some(read_image(path).await?),
        None => None,
    };
    let request = AnalysisRequest {
        species: Species::from(args.species.as_str()),
        symptom_text: args.symptoms.clone(),
        image,
        selected_behaviors: args.behaviors.clone(),
        age_years: args.age,
        weight_kg: args.weight,
    };
    // Reject empty input before touching the database or the network.
    request.validate()?;

    let store = open_store(&args.db).await?;
    store.ensure_seeded(DEFAULT_CONDITIONS).await?;
    let knowledge_base = StaticKnowledgeBase::snapshot_of(&store).await?;

    let provider_config = ProviderConfig {
        provider: args.provider.clone(),
        api_url: args.api_url.clone(),
        api_key: args.api_key.clone(),
        model_name: args.model.clone(),
    };
    let provider = create_provider(&args.provider, &provider_config)?;
    let client = AnalysisClientBuilder::new()
        .ai_provider(provider.generator())
        .image_labeler(provider.labeler())
        .knowledge_store(Box::new(knowledge_base))
        .retry_policy(RetryPolicy {
            max_attempts: args.attempts,
            timeout_secs: args.timeout,
            ..Default::default()
        })
        .build()?;

    info!("Running analysis with provider '{}'", args.provider);
    let result = client.analyze(request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", report::render(&result));
    }
    Ok(())
}
