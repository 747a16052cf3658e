//! # Knowledge Base Handlers
//!
//! Read-only views of the two reference tables: the behavior checklist the
//! upload form offers and the condition records loaded at startup.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    Json,
};
use petcare::{
    behavior::behavior_names, providers::db::storage::KnowledgeStore, types::ConditionRecord,
};
use serde_json::json;
use tracing::info;

/// The handler for `GET /behaviors`. Lists the canonical behavior names in
/// checklist order.
pub async fn behaviors_handler(
    debug_params: Query<DebugParams>,
) -> Json<ApiResponse<Vec<&'static str>>> {
    let names = behavior_names();
    let debug_info = json!({ "count": names.len() });
    wrap_response(names, debug_params, Some(debug_info))
}

/// The handler for `GET /conditions`. Returns the condition records of the
/// startup snapshot in id order.
pub async fn conditions_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
) -> Result<Json<ApiResponse<Vec<ConditionRecord>>>, AppError> {
    let records = app_state.knowledge_base.load().await?;
    info!("Serving {} condition record(s)", records.len());

    let debug_info = json!({
        "store": app_state.knowledge_base.name(),
        "db_url": app_state.config.db_url,
        "count": records.len(),
    });
    Ok(wrap_response(records, debug_params, Some(debug_info)))
}
