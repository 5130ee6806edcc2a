use super::{AppError, AppState, pages};
use crate::imaging::{Operation, TransformError, operations};
use crate::storage::result_name;
use axum::extract::{Multipart, Query, State};
use axum::response::{Html, Redirect};
use serde::{Deserialize, Serialize};

/// Query string of the result page.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultQuery {
    /// Upload key, served from `/uploads/`.
    pub input_image: Option<String>,
    /// Result file name, served from `/static/`.
    pub output_image: Option<String>,
    /// The client's original file name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Upload form fields, read in full before anything touches the disk.
#[derive(Debug, Default)]
struct UploadForm {
    image: Option<(String, Vec<u8>)>,
    operation: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "image" => {
                    let file_name = field.file_name().unwrap_or("").to_string();
                    let data = field.bytes().await?;
                    // Browsers send an empty, unnamed part when no file is chosen.
                    if !file_name.is_empty() && !data.is_empty() {
                        form.image = Some((file_name, data.to_vec()));
                    }
                }
                "operation" => {
                    let value = field.text().await?;
                    let value = value.trim();
                    if !value.is_empty() {
                        form.operation = Some(value.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(form)
    }
}

pub async fn index() -> Html<String> {
    Html(pages::render_index(None).into_string())
}

pub async fn submit(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let form = UploadForm::read(multipart).await?;
    let (original_name, bytes) = form.image.ok_or(AppError::MissingUpload)?;
    let operation: Operation = form.operation.ok_or(AppError::MissingOperation)?.parse()?;

    let upload = state.storage.store_upload(&original_name, &bytes).await?;
    let output_name = result_name(&upload.key, operation);
    let source = state.storage.upload_path(&upload.key);
    let output = state.storage.result_path(&output_name);

    let backend = state.backend.clone();
    let outcome = tokio::task::spawn_blocking(move || {
        operations::transform(backend.as_ref(), &source, &output, operation)
    })
    .await?;

    let transformed = match outcome {
        Ok(transformed) => transformed,
        Err(err @ TransformError::ImageDecode { .. }) => {
            // Identical bytes stored earlier belong to another request.
            if upload.created {
                state.storage.discard_upload(&upload.key).await?;
            }
            return Err(err.into());
        }
        Err(err) => return Err(err.into()),
    };

    tracing::info!(
        key = %upload.key,
        original = %upload.original_name,
        %operation,
        width = transformed.dimensions.width,
        height = transformed.dimensions.height,
        "image processed"
    );

    let query = ResultQuery {
        input_image: Some(upload.key),
        output_image: Some(output_name),
        name: Some(upload.original_name),
    };
    let target = format!("/result?{}", serde_urlencoded::to_string(&query)?);
    Ok(Redirect::to(&target))
}

pub async fn show_result(Query(query): Query<ResultQuery>) -> Result<Html<String>, AppError> {
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());
    let (Some(input), Some(output)) = (non_empty(query.input_image), non_empty(query.output_image))
    else {
        return Err(AppError::IncompleteResultQuery);
    };
    let page = pages::render_result(&input, &output, query.name.as_deref());
    Ok(Html(page.into_string()))
}
