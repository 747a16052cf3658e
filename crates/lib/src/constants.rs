//! # Shared Constants
//!
//! Constants shared by the library, the server and the CLI, so the same paths
//! and sentinel strings are used everywhere.

/// The default path for the application SQLite database.
pub const DEFAULT_DB_FILE: &str = "db/petcare.db";

/// The default directory uploaded photos are written to.
pub const DEFAULT_UPLOADS_DIR: &str = "static/uploads";

/// The label substituted when the image labeler fails.
pub const LABEL_FAILURE_SENTINEL: &str = "이미지 분석 실패";

/// The note attached to a selected behavior that has no table entry.
pub const UNKNOWN_BEHAVIOR_NOTE: &str = "추가 정보 없음";
