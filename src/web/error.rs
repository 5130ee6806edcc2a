use super::pages;
use crate::imaging::{InvalidOperation, Operation, TransformError};
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tokio::task::JoinError;

/// Request-local failure. Never fatal to the server.
///
/// Every variant renders the upload form again with an inline message:
///
/// | Variant | Status |
/// |---|---|
/// | `MissingUpload`, `MissingOperation`, `InvalidOperation` | 400 |
/// | `Transform(ImageDecode)` | 422 |
/// | `Multipart` | the multipart error's own status (413 when too large) |
/// | `IncompleteResultQuery` | 400 |
/// | everything else | 500 |
#[derive(Debug, Error)]
pub enum AppError {
    #[error("no file attached")]
    MissingUpload,
    #[error("no operation selected")]
    MissingOperation,
    #[error(transparent)]
    InvalidOperation(#[from] InvalidOperation),
    #[error(transparent)]
    Transform(#[from] TransformError),
    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),
    #[error("result page needs input_image and output_image")]
    IncompleteResultQuery,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("transform worker failed: {0}")]
    Worker(#[from] JoinError),
    #[error("failed to build result URL: {0}")]
    ResultUrl(#[from] serde_urlencoded::ser::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingUpload
            | AppError::MissingOperation
            | AppError::InvalidOperation(_)
            | AppError::IncompleteResultQuery
            | AppError::Transform(TransformError::InvalidOperation(_)) => StatusCode::BAD_REQUEST,
            AppError::Transform(TransformError::ImageDecode { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Multipart(err) => err.status(),
            AppError::Transform(_) | AppError::Io(_) | AppError::Worker(_) | AppError::ResultUrl(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown on the re-rendered form.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingUpload => "Please upload an image!".to_string(),
            AppError::MissingOperation => "Please select an operation!".to_string(),
            AppError::InvalidOperation(InvalidOperation(name))
            | AppError::Transform(TransformError::InvalidOperation(InvalidOperation(name))) => {
                let valid: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
                format!(
                    "Unknown operation \"{name}\". Choose one of: {}.",
                    valid.join(", ")
                )
            }
            AppError::Transform(TransformError::ImageDecode { .. }) => {
                "The uploaded file is not a readable image.".to_string()
            }
            AppError::Multipart(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "That file is too large.".to_string()
            }
            AppError::Multipart(_) => "The upload could not be read. Please try again.".to_string(),
            AppError::IncompleteResultQuery => {
                "Nothing to show yet. Upload an image first.".to_string()
            }
            AppError::Transform(_) | AppError::Io(_) | AppError::Worker(_) | AppError::ResultUrl(_) => {
                "Something went wrong while processing the image.".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, %status, "request rejected");
        }
        let body = pages::render_index(Some(&self.user_message()));
        (status, Html(body.into_string())).into_response()
    }
}
