//! Data models and structures
//!
//! Defines the request/response shapes of the image edit handler and the
//! service configuration.

use crate::ai::openai::client::DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BRAND_BACKGROUND: &str = "default background";
pub const DEFAULT_BRAND_COLOR: &str = "blue";

/// One uploaded image plus the branding selections that go with it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub image: Vec<u8>,
    pub file_name: Option<String>,
    pub brand_background: String,
    pub brand_color: String,
}

impl UploadRequest {
    /// Build a request, falling back to the default branding for absent fields.
    pub fn new(
        image: Vec<u8>,
        file_name: Option<String>,
        brand_background: Option<String>,
        brand_color: Option<String>,
    ) -> Self {
        Self {
            image,
            file_name,
            brand_background: brand_background
                .unwrap_or_else(|| DEFAULT_BRAND_BACKGROUND.to_string()),
            brand_color: brand_color.unwrap_or_else(|| DEFAULT_BRAND_COLOR.to_string()),
        }
    }
}

/// JSON body returned by `POST /process_image`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EditResult {
    Success { image_url: String },
    Failure { error: String },
}

impl EditResult {
    pub fn success(image_url: impl Into<String>) -> Self {
        Self::Success {
            image_url: image_url.into(),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub edit_model: String,
    pub edit_size: String,
    pub max_image_side: u32,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub request_timeout: Duration,
    pub bind_addr: SocketAddr,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Config("OPENAI_API_KEY not set".to_string()))?;

        Ok(Self {
            openai_api_key,
            openai_base_url: lookup("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            edit_model: lookup("IMAGE_EDIT_MODEL").unwrap_or_else(|| "dall-e-2".to_string()),
            edit_size: lookup("IMAGE_EDIT_SIZE").unwrap_or_else(|| "1024x1024".to_string()),
            max_image_side: parse_var(&lookup, "MAX_IMAGE_SIDE", 1024)?,
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
            request_timeout: parse_timeout(&lookup)?,
            bind_addr: parse_var(&lookup, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 5000)))?,
        })
    }
}

fn parse_timeout<F>(lookup: &F) -> crate::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    match parse_var(lookup, "REQUEST_TIMEOUT_SECS", 120u64)? {
        0 => Err(crate::Error::Config(
            "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
        )),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn parse_var<F, T>(lookup: &F, key: &str, default: T) -> crate::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| crate::Error::Config(format!("Invalid {} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}
