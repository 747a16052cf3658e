use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::MultipartError;
use petcare::PetCareError;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors originating from the `petcare` library.
    Analysis(PetCareError),
    /// The uploaded file could not be accepted.
    Upload(String),
    /// The multipart body could not be read, e.g. it exceeded the size limit.
    Multipart(MultipartError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

/// Conversion from `PetCareError` to `AppError`.
impl From<PetCareError> for AppError {
    fn from(err: PetCareError) -> Self {
        AppError::Analysis(err)
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Multipart(err)
    }
}

/// Conversion from `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::Analysis(err) => {
                // Log the original error for debugging purposes
                error!("PetCareError: {:?}", err);
                match err {
                    PetCareError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
                    PetCareError::MissingProvider(_) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly.".to_string(),
                    ),
                    PetCareError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    PetCareError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    PetCareError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    PetCareError::LabelServiceFailure(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Image labeling failed: {e}"),
                    ),
                    PetCareError::GenerationServiceFailure(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Text generation failed: {e}"),
                    ),
                    PetCareError::StoreUnavailable(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Knowledge store is unavailable: {e}"),
                    ),
                    PetCareError::Timeout(what, secs) => (
                        StatusCode::GATEWAY_TIMEOUT,
                        format!("{what} timed out after {secs}s"),
                    ),
                    PetCareError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::Upload(msg) => {
                warn!("Rejected upload: {msg}");
                (
                    StatusCode::BAD_REQUEST,
                    format!("이미지 파일을 처리할 수 없습니다: {msg}"),
                )
            }
            AppError::Multipart(err) => {
                let status = err.status();
                warn!("Rejected multipart body ({status}): {}", err.body_text());
                let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                    "업로드 용량이 허용된 크기를 초과했습니다.".to_string()
                } else {
                    format!("요청 양식을 읽을 수 없습니다: {}", err.body_text())
                };
                (status, message)
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}
