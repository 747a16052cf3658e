use anyhow::Result;
use clap::Parser;
use petcare::{
    behavior::BEHAVIOR_TABLE,
    constants::DEFAULT_DB_FILE,
    knowledge::DEFAULT_CONDITIONS,
    providers::db::{sqlite::SqliteProvider, storage::KnowledgeStore},
    types::SeedOutcome,
};
use tracing::info;

#[derive(Parser, Debug)]
pub struct SeedArgs {
    /// The path to the SQLite database file
    #[arg(long, env = "DB_URL", default_value = DEFAULT_DB_FILE)]
    pub db: String,
    /// Delete every existing record and insert the defaults again
    #[arg(long)]
    pub reset: bool,
}

#[derive(Parser, Debug)]
pub struct ConditionsArgs {
    /// The path to the SQLite database file
    #[arg(long, env = "DB_URL", default_value = DEFAULT_DB_FILE)]
    pub db: String,
    /// Print the records as JSON
    #[arg(long)]
    pub json: bool,
}

/// Opens the database and makes sure the schema exists.
pub async fn open_store(db: &str) -> Result<SqliteProvider> {
    let store = SqliteProvider::new(db).await?;
    store.initialize_schema().await?;
    Ok(store)
}

pub async fn handle_seed(args: &SeedArgs) -> Result<()> {
    info!("Seeding database at '{}' (reset: {})", args.db, args.reset);
    let store = open_store(&args.db).await?;

    if args.reset {
        let count = store.reseed(DEFAULT_CONDITIONS).await?;
        println!("✅ Reseeded {count} condition records into '{}'.", args.db);
        return Ok(());
    }

    match store.ensure_seeded(DEFAULT_CONDITIONS).await? {
        SeedOutcome::Seeded(count) => {
            println!("✅ Seeded {count} condition records into '{}'.", args.db)
        }
        SeedOutcome::AlreadyPresent(count) => println!(
            "Database '{}' already contains {count} condition records. Use --reset to replace them.",
            args.db
        ),
    }
    Ok(())
}

pub async fn handle_conditions(args: &ConditionsArgs) -> Result<()> {
    let store = open_store(&args.db).await?;
    let records = store.load().await?;
    info!("Loaded {} condition records from '{}'", records.len(), args.db);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }
    if records.is_empty() {
        println!("No condition records found. Run `petcare seed` first.");
        return Ok(());
    }
    for record in &records {
        println!(
            "[{}] {} ({})\n    image: {}\n    symptoms: {}",
            record.id,
            record.disease_name,
            record.warning_level,
            record.image_labels,
            record.text_symptoms
        );
    }
    Ok(())
}

pub fn handle_behaviors() -> Result<()> {
    for entry in BEHAVIOR_TABLE {
        println!("- {}: {}", entry.name, entry.possible_causes.join(", "));
    }
    Ok(())
}
