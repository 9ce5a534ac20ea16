use super::types::ApiErrorBody;
use crate::{Error, Result};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    timeout: Duration,
}

impl OpenAiHttpClient {
    #[cfg(test)]
    pub fn new(api_key: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, timeout, Client::new())
    }

    pub fn new_with_client(api_key: String, timeout: Duration, client: Client) -> Self {
        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Turn a non-2xx response into a provider error, preferring the message
    /// from OpenAI's error envelope over the raw body.
    async fn error_for_status(response: Response) -> Error {
        let status = response.status();
        let error_text = match response.text().await {
            Ok(text) => text,
            Err(e) => return Error::Http(e),
        };
        tracing::error!("OpenAI API error (status {}): {}", status, error_text);

        let message = match serde_json::from_str::<ApiErrorBody>(&error_text) {
            Ok(body) => {
                tracing::debug!(error_type = ?body.error.error_type, "OpenAI error envelope");
                body.error.message
            }
            Err(_) => error_text,
        };
        Error::AiProvider(format!("OpenAI API error (status {}): {}", status, message))
    }

    pub async fn post_multipart<Resp: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<Resp> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send request to OpenAI: {}", e);
                e
            })?;

        if !response.status().is_success() {
            return Err(Self::error_for_status(response).await);
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse OpenAI response: {}", e))
        })
    }

    /// Plain GET for vendor-hosted result URLs. These are pre-signed, so no
    /// credential is attached.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to download edited image: {}", e);
                e
            })?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!("Edited image download failed (status {})", status);
            return Err(Error::AiProvider(format!(
                "Failed to download edited image (status {})",
                status
            )));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Echo {
        ok: bool,
    }

    fn make_client(server: &MockServer) -> OpenAiHttpClient {
        OpenAiHttpClient::new("sk-test".to_string(), Duration::from_secs(5))
            .with_base_url(format!("{}/", server.uri()))
    }

    #[tokio::test]
    async fn test_post_multipart_sends_bearer_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let echo: Echo = make_client(&server)
            .post_multipart("/v1/echo", Form::new().text("k", "v"))
            .await
            .unwrap();
        assert!(echo.ok);
    }

    #[tokio::test]
    async fn test_error_envelope_message_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "message": "Invalid image", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .post_multipart::<Echo>("/v1/echo", Form::new())
            .await
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("400"));
        assert!(message.contains("Invalid image"));
    }

    #[tokio::test]
    async fn test_unparsable_body_is_provider_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/echo"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = make_client(&server)
            .post_multipart::<Echo>("/v1/echo", Form::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }

    #[tokio::test]
    async fn test_get_bytes_reports_failed_download() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/files/gone.png"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = make_client(&server);
        let err = client
            .get_bytes(&format!("{}/files/gone.png", server.uri()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("404"));
    }
}
