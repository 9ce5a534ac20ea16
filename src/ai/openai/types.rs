//! OpenAI-specific response payloads used by the edit client.

use serde::Deserialize;

/// Top-level image edit response.
#[derive(Debug, Deserialize)]
pub struct ImageEditResponse {
    pub data: Vec<ImageData>,
}

/// One edited image item (URL or base64).
#[derive(Debug, Deserialize)]
pub struct ImageData {
    pub url: Option<String>,
    pub b64_json: Option<String>,
}

/// Error envelope OpenAI returns on non-2xx responses.
#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorDetail {
    pub message: String,
    #[serde(rename = "type")]
    pub error_type: Option<String>,
}
