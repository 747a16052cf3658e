use crate::{
    errors::PetCareError,
    providers::db::storage::KnowledgeStore,
    types::{ConditionRecord, ConditionSeed, SeedOutcome},
};
use async_trait::async_trait;
use std::fmt::{self, Debug};
use tracing::{debug, error, info, warn};
use turso::{params, Connection, Database, Row, Value as TursoValue};

pub mod sql;

/// A provider for interacting with a local SQLite database using Turso.
///
/// This provider holds a `Database` instance. When cloned, it shares the same
/// underlying database, so an in-memory instance can be shared by cloning.
#[derive(Clone)]
pub struct SqliteProvider {
    /// The Turso database instance. It's cloneable and thread-safe.
    pub db: Database,
}

impl SqliteProvider {
    /// Creates a new `SqliteProvider` from a file path or in-memory.
    ///
    /// # Arguments
    ///
    /// * `db_path`: The path to the SQLite database file. Use ":memory:" for a unique,
    ///   isolated in-memory database.
    pub async fn new(db_path: &str) -> Result<Self, PetCareError> {
        if db_path != ":memory:" {
            if let Some(parent) = std::path::Path::new(db_path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        PetCareError::StoreUnavailable(format!(
                            "cannot create database directory '{}': {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = turso::Builder::new_local(db_path)
            .build()
            .await
            .map_err(|e| PetCareError::StoreUnavailable(e.to_string()))?;

        // WAL has no effect on in-memory databases but is safe to run.
        let conn = db
            .connect()
            .map_err(|e| PetCareError::StoreUnavailable(e.to_string()))?;
        conn.query("PRAGMA journal_mode=WAL;", ())
            .await
            .map_err(|e| PetCareError::StoreUnavailable(e.to_string()))?;

        Ok(Self { db })
    }

    fn connect(&self) -> Result<Connection, PetCareError> {
        self.db
            .connect()
            .map_err(|e| PetCareError::StoreUnavailable(e.to_string()))
    }

    /// A helper for tests to pre-populate data by executing multiple SQL statements.
    pub async fn initialize_with_data(&self, init_sql: &str) -> Result<(), PetCareError> {
        let conn = self.connect()?;
        for statement in init_sql.split(';').filter(|s| !s.trim().is_empty()) {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    /// Ensures that all required application tables exist.
    /// This function is idempotent and safe to call on every application startup.
    pub async fn initialize_schema(&self) -> Result<(), PetCareError> {
        let conn = self.connect()?;
        for statement in sql::ALL_TABLE_CREATION_SQL {
            conn.execute(statement, ()).await?;
        }
        Ok(())
    }

    async fn count_with(conn: &Connection) -> Result<usize, PetCareError> {
        let mut rows = conn.query(sql::COUNT_DISEASES, ()).await?;
        let count = match rows.next().await? {
            Some(row) => match row.get_value(0)? {
                TursoValue::Integer(n) => n.max(0) as usize,
                _ => 0,
            },
            None => 0,
        };
        Ok(count)
    }

    async fn insert_seeds(conn: &Connection, seeds: &[ConditionSeed]) -> Result<(), turso::Error> {
        for seed in seeds {
            conn.execute(
                sql::INSERT_DISEASE,
                params![
                    seed.disease_name,
                    seed.image_labels,
                    seed.text_symptoms,
                    seed.warning_level,
                    seed.advice
                ],
            )
            .await?;
        }
        Ok(())
    }

    /// Inserts `seeds` in one transaction, optionally clearing the table first.
    async fn replace_rows(
        conn: &Connection,
        seeds: &[ConditionSeed],
        delete_first: bool,
    ) -> Result<(), PetCareError> {
        conn.execute("BEGIN TRANSACTION", ()).await?;
        let result = async {
            if delete_first {
                conn.execute(sql::DELETE_ALL_DISEASES, ()).await?;
            }
            Self::insert_seeds(conn, seeds).await
        }
        .await;

        match result {
            Ok(()) => {
                conn.execute("COMMIT", ()).await?;
                Ok(())
            }
            Err(e) => {
                warn!("Seeding failed, rolling back: {e}");
                if let Err(rollback) = conn.execute("ROLLBACK", ()).await {
                    error!("Rollback after failed seeding also failed: {rollback}");
                }
                Err(e.into())
            }
        }
    }
}

impl Debug for SqliteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteProvider").finish_non_exhaustive()
    }
}

fn text_at(row: &Row, index: usize) -> Result<String, PetCareError> {
    Ok(match row.get_value(index)? {
        TursoValue::Text(s) => s,
        TursoValue::Integer(i) => i.to_string(),
        TursoValue::Real(f) => f.to_string(),
        TursoValue::Null | TursoValue::Blob(_) => String::new(),
    })
}

fn record_from_row(row: &Row) -> Result<ConditionRecord, PetCareError> {
    let id = match row.get_value(0)? {
        TursoValue::Integer(i) => i,
        other => {
            return Err(PetCareError::StoreUnavailable(format!(
                "unexpected id value in diseases table: {other:?}"
            )))
        }
    };
    Ok(ConditionRecord {
        id,
        disease_name: text_at(row, 1)?,
        image_labels: text_at(row, 2)?,
        text_symptoms: text_at(row, 3)?,
        warning_level: text_at(row, 4)?,
        advice: text_at(row, 5)?,
    })
}

#[async_trait]
impl KnowledgeStore for SqliteProvider {
    fn name(&self) -> &str {
        "SQLite"
    }

    async fn load(&self) -> Result<Vec<ConditionRecord>, PetCareError> {
        let conn = self.connect()?;
        let mut rows = conn.query(sql::SELECT_ALL_DISEASES, ()).await?;

        let mut records = Vec::new();
        while let Some(row) = rows.next().await? {
            records.push(record_from_row(&row)?);
        }
        debug!("Loaded {} condition records from SQLite.", records.len());
        Ok(records)
    }

    async fn count(&self) -> Result<usize, PetCareError> {
        let conn = self.connect()?;
        Self::count_with(&conn).await
    }

    async fn ensure_seeded(&self, defaults: &[ConditionSeed]) -> Result<SeedOutcome, PetCareError> {
        let conn = self.connect()?;
        let existing = Self::count_with(&conn).await?;
        if existing > 0 {
            info!("SQLite: {existing} condition records already present, skipping seed.");
            return Ok(SeedOutcome::AlreadyPresent(existing));
        }

        info!("SQLite: diseases table is empty, inserting default records.");
        Self::replace_rows(&conn, defaults, false).await?;
        info!("SQLite: inserted {} default condition records.", defaults.len());
        Ok(SeedOutcome::Seeded(defaults.len()))
    }

    async fn reseed(&self, defaults: &[ConditionSeed]) -> Result<usize, PetCareError> {
        let conn = self.connect()?;
        Self::replace_rows(&conn, defaults, true).await?;
        let count = Self::count_with(&conn).await?;
        info!("SQLite: diseases table reset with {count} records.");
        Ok(count)
    }
}
