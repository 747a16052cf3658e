//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the SQLite provider.

pub const CREATE_DISEASES_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS diseases (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        disease_name TEXT NOT NULL,
        image_labels TEXT,
        text_symptoms TEXT,
        warning_level TEXT,
        advice TEXT
    );
";

/// All statements needed to bring an empty database to the current schema.
pub const ALL_TABLE_CREATION_SQL: &[&str] = &[CREATE_DISEASES_TABLE];

pub const SELECT_ALL_DISEASES: &str = "
    SELECT id, disease_name, image_labels, text_symptoms, warning_level, advice
    FROM diseases
    ORDER BY id ASC;
";

pub const COUNT_DISEASES: &str = "SELECT COUNT(*) FROM diseases;";

pub const DELETE_ALL_DISEASES: &str = "DELETE FROM diseases;";

pub const INSERT_DISEASE: &str = "
    INSERT INTO diseases (disease_name, image_labels, text_symptoms, warning_level, advice)
    VALUES (?, ?, ?, ?, ?);
";
