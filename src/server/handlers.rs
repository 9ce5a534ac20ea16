use super::AppState;
use crate::models::{EditResult, UploadRequest};
use crate::{Error, Result};
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn multipart_error(e: MultipartError) -> Error {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        Error::PayloadTooLarge(format!("Upload too large: {}", e.body_text()))
    } else {
        Error::BadRequest(format!("Failed to parse multipart data: {}", e.body_text()))
    }
}

/// Collect the `image` file and the two branding fields from the form.
async fn read_upload(mut multipart: Multipart) -> Result<UploadRequest> {
    let mut image: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut brand_background: Option<String> = None;
    let mut brand_color: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "image" => {
                file_name = field.file_name().map(str::to_string);
                image = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            }
            "brand_background" => {
                brand_background = Some(field.text().await.map_err(multipart_error)?);
            }
            "brand_color" => {
                brand_color = Some(field.text().await.map_err(multipart_error)?);
            }
            other => {
                tracing::debug!("Ignoring unexpected multipart field '{}'", other);
            }
        }
    }

    // Browsers send an empty part when no file was picked.
    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| Error::BadRequest("Missing 'image' file field".to_string()))?;

    Ok(UploadRequest::new(
        image,
        file_name,
        brand_background,
        brand_color,
    ))
}

pub async fn process_image(
    State(state): State<AppState>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<EditResult>> {
    let multipart = multipart.map_err(|e| {
        Error::BadRequest(format!("Expected a multipart/form-data body: {}", e.body_text()))
    })?;

    let request = read_upload(multipart).await?;
    let image_url = state.app.process(request).await?;

    Ok(Json(EditResult::success(image_url)))
}
