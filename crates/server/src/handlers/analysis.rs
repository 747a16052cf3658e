//! # Analysis Handler
//!
//! `POST /analyze` accepts the owner's upload form as `multipart/form-data`:
//!
//! | field       | meaning                                        |
//! |-------------|------------------------------------------------|
//! | `pet_type`  | `고양이`/`cat` or `강아지`/`dog`; anything else is passed through |
//! | `symptoms`  | free-text observation                          |
//! | `age`       | years, empty means the form default            |
//! | `weight`    | kilograms, empty means the form default        |
//! | `behaviors` | repeated, one checklist item per field         |
//! | `image`     | the photo                                      |
//!
//! The photo is stored under `uploads_dir` before the pipeline runs so the
//! result can point back at it.

use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use axum::{
    extract::{Query, State},
    Json,
};
use axum_extra::extract::Multipart;
use petcare::{
    types::{DEFAULT_AGE_YEARS, DEFAULT_WEIGHT_KG},
    AnalysisRequest, AssessmentResult, ImageInput, PetCareError, Species,
};
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};
use uuid::Uuid;

/// Extensions accepted for uploads and the MIME type each maps to.
const ALLOWED_IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

/// An uploaded file as read from the form, before it is stored.
struct UploadedFile {
    file_name: String,
    content_type: Option<String>,
    bytes: Vec<u8>,
}

/// Reduces a client-supplied file name to a safe ASCII stem.
pub(crate) fn secure_stem(file_name: &str) -> String {
    let base = file_name.rsplit(['/', '\\']).next().unwrap_or(file_name);
    let stem = Path::new(base)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == '_').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

/// Resolves the stored extension and MIME type of an upload, or rejects it.
pub(crate) fn resolve_image_type(
    file_name: &str,
    content_type: Option<&str>,
) -> Result<(&'static str, &'static str), AppError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    if let Some(found) = extension
        .as_deref()
        .and_then(|ext| ALLOWED_IMAGE_TYPES.iter().find(|(e, _)| *e == ext))
    {
        return Ok(*found);
    }
    if let Some(found) =
        content_type.and_then(|ct| ALLOWED_IMAGE_TYPES.iter().find(|(_, m)| *m == ct))
    {
        return Ok(*found);
    }
    Err(AppError::Upload(format!(
        "unsupported file type for '{file_name}'"
    )))
}

fn parse_number(field: &str, raw: &str, default: f64) -> Result<f64, PetCareError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<f64>()
        .map_err(|_| PetCareError::InvalidInput(format!("{field} must be a number, got '{raw}'")))
}

/// Writes the photo under `uploads_dir` and returns the path relative to the
/// public root, e.g. `uploads/cat_<uuid>.png`.
async fn store_upload(
    uploads_dir: &str,
    file_name: &str,
    extension: &str,
    bytes: &[u8],
) -> Result<String, AppError> {
    let stored_name = format!("{}_{}.{extension}", secure_stem(file_name), Uuid::new_v4());
    let target = Path::new(uploads_dir).join(&stored_name);
    tokio::fs::write(&target, bytes)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to store upload at {}: {e}", target.display()))?;
    info!("Stored upload at {}", target.display());

    let public_dir = Path::new(uploads_dir)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("uploads");
    Ok(format!("{public_dir}/{stored_name}"))
}

/// The handler for `POST /analyze`.
pub async fn analyze_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AssessmentResult>>, AppError> {
    let mut request = AnalysisRequest::default();
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or("").to_string();

        match name.as_str() {
            "pet_type" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    request.species = Species::from(text.trim());
                }
            }
            "symptoms" => {
                request.symptom_text = Some(field.text().await?);
            }
            "age" => {
                let text = field.text().await?;
                request.age_years = parse_number("age", &text, DEFAULT_AGE_YEARS)?;
            }
            "weight" => {
                let text = field.text().await?;
                request.weight_kg = parse_number("weight", &text, DEFAULT_WEIGHT_KG)?;
            }
            "behaviors" => {
                let text = field.text().await?;
                if !text.trim().is_empty() {
                    request.selected_behaviors.push(text.trim().to_string());
                }
            }
            "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?.to_vec();
                // Browsers send an empty part when no file was chosen.
                if !file_name.is_empty() && !bytes.is_empty() {
                    upload = Some(UploadedFile {
                        file_name,
                        content_type,
                        bytes,
                    });
                }
            }
            other => warn!("Ignoring unknown multipart field '{other}'"),
        }
    }

    let image_type = upload
        .as_ref()
        .map(|u| resolve_image_type(&u.file_name, u.content_type.as_deref()))
        .transpose()?;

    if let (Some(file), Some((_, mime_type))) = (&upload, image_type) {
        request.image = Some(ImageInput {
            bytes: file.bytes.clone(),
            mime_type: mime_type.to_string(),
            stored_path: None,
        });
    }
    request.validate()?;

    if let (Some(file), Some((extension, _)), Some(image)) =
        (&upload, image_type, request.image.as_mut())
    {
        image.stored_path = Some(
            store_upload(
                &app_state.config.uploads_dir,
                &file.file_name,
                extension,
                &file.bytes,
            )
            .await?,
        );
    }

    info!(
        "Received analysis request for {} with {} behavior(s)",
        request.species,
        request.selected_behaviors.len()
    );
    let report = app_state.analysis_client.analyze_detailed(request).await?;

    let debug_info = json!({
        "prompt": report.prompt,
        "context_blocks": report.context.context_blocks,
        "mission": report.context.mission,
    });
    Ok(wrap_response(report.result, debug_params, Some(debug_info)))
}
