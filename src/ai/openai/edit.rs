use super::client::OpenAiHttpClient;
use super::types::ImageEditResponse;
use crate::ai::{EditedImage, ImageEditService};
use crate::image::{detect_image_mime, PreparedImage};
use crate::{Error, Result};
use async_trait::async_trait;
use base64::Engine as _;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const EDITS_PATH: &str = "/v1/images/edits";

pub struct OpenAiImageEditClient {
    http: OpenAiHttpClient,
    model: String,
    size: String,
}

impl OpenAiImageEditClient {
    pub fn new(api_key: String, model: String, size: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, model, size, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        model: String,
        size: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, timeout, client),
            model,
            size,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.http = self.http.with_base_url(base_url);
        self
    }

    fn png_part(bytes: &[u8], file_name: &'static str) -> Result<Part> {
        Ok(Part::bytes(bytes.to_vec())
            .file_name(file_name)
            .mime_str("image/png")?)
    }

    fn build_form(&self, image: &PreparedImage, prompt: &str) -> Result<Form> {
        Ok(Form::new()
            .text("model", self.model.clone())
            .text("prompt", prompt.to_string())
            .text("n", "1")
            .text("size", self.size.clone())
            .part("image", Self::png_part(&image.png, "image.png")?)
            .part("mask", Self::png_part(&image.mask, "mask.png")?))
    }
}

/// Build a `data:` URL for an inline base64 result so callers always get a URL.
fn data_url_from_b64(b64_json: &str) -> Result<String> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64_json)
        .map_err(|e| Error::AiProvider(format!("Failed to decode base64 image: {}", e)))?;
    Ok(format!(
        "data:{};base64,{}",
        detect_image_mime(&bytes),
        b64_json
    ))
}

/// Decode a `data:<mime>;base64,<payload>` URL.
fn decode_data_url(url: &str) -> Result<Vec<u8>> {
    let (_, payload) = url
        .split_once(";base64,")
        .ok_or_else(|| Error::AiProvider("Unsupported data URL encoding".to_string()))?;
    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| Error::AiProvider(format!("Failed to decode data URL: {}", e)))
}

#[async_trait]
impl ImageEditService for OpenAiImageEditClient {
    async fn edit_image(&self, image: &PreparedImage, prompt: &str) -> Result<EditedImage> {
        tracing::debug!(
            model = %self.model,
            side = image.side,
            prompt_chars = prompt.len(),
            "Sending image edit request to OpenAI"
        );

        let form = self.build_form(image, prompt)?;
        let response: ImageEditResponse = self.http.post_multipart(EDITS_PATH, form).await?;

        let image_data = response
            .data
            .first()
            .ok_or_else(|| Error::AiProvider("No image data in OpenAI response".to_string()))?;

        let url = if let Some(url) = &image_data.url {
            url.clone()
        } else if let Some(b64_json) = &image_data.b64_json {
            data_url_from_b64(b64_json)?
        } else {
            return Err(Error::AiProvider(
                "No image data (neither URL nor base64) in response".to_string(),
            ));
        };

        Ok(EditedImage { url })
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>> {
        if url.starts_with("data:") {
            decode_data_url(url)
        } else {
            self.http.get_bytes(url).await
        }
    }
}
