//! Data models and structures
//!
//! Defines the story request/result types exchanged with callers, the
//! progress events emitted while a book is assembled, and the runtime
//! configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lyrics submitted by the caller, optionally with the song title.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoryRequest {
    pub lyrics: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl StoryRequest {
    pub fn new(lyrics: impl Into<String>, title: Option<String>) -> Self {
        Self {
            lyrics: lyrics.into(),
            title,
        }
    }
}

/// One narrative beat as written by the text model, before illustration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryPageDraft {
    pub text: String,
    pub image_prompt: String,
}

/// Titled, ordered page list returned by the text model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryDraft {
    #[serde(default)]
    pub title: String,
    pub pages: Vec<StoryPageDraft>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StoryPage {
    pub text: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

impl StoryPage {
    pub fn from_draft(draft: StoryPageDraft, image_url: String) -> Self {
        Self {
            text: draft.text,
            image_url,
            image_prompt: Some(draft.image_prompt),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoryResult {
    pub title: String,
    pub pages: Vec<StoryPage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressEvent {
    pub stage: String,
    pub percent: f64,
}

impl ProgressEvent {
    pub fn new(stage: impl Into<String>, percent: f64) -> Self {
        Self {
            stage: stage.into(),
            percent,
        }
    }
}

// Configuration
const DEFAULT_GATEWAY_BASE_URL: &str = "https://ai.gateway.lovable.dev";
const DEFAULT_STORY_MODEL: &str = "google/gemini-3-flash-preview";
const DEFAULT_IMAGE_MODEL: &str = "google/gemini-2.5-flash-image";
const DEFAULT_STORAGE_REGION: &str = "us-east-1";
const DEFAULT_STORAGE_BUCKET: &str = "story-images";
const DEFAULT_DRY_RUN_BASE_URL: &str = "https://mock-cdn.example.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub gateway_api_key: String,
    pub gateway_base_url: String,
    pub story_model: String,
    pub image_model: String,
    pub story_timeout: Duration,
    pub illustration_timeout: Duration,
    pub max_concurrent_illustrations: usize,
    pub storage_access_key_id: Option<String>,
    pub storage_secret_access_key: Option<String>,
    pub storage_endpoint: Option<String>,
    pub storage_region: String,
    pub storage_bucket: String,
    pub storage_public_base_url: String,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds and validates a config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let require = |key: &str| {
            get(key).ok_or_else(|| crate::Error::Config(format!("{} not set", key)))
        };

        let dry_run = match get("DRY_RUN") {
            Some(v) => parse_bool("DRY_RUN", &v)?,
            None => false,
        };

        let max_concurrent_illustrations = parse_number("MAX_CONCURRENT_ILLUSTRATIONS", get, 8)?;
        if max_concurrent_illustrations == 0 {
            return Err(crate::Error::Config(
                "MAX_CONCURRENT_ILLUSTRATIONS must be at least 1".to_string(),
            ));
        }

        let (access_key, secret_key, endpoint, public_base_url) = if dry_run {
            (
                get("STORAGE_ACCESS_KEY_ID"),
                get("STORAGE_SECRET_ACCESS_KEY"),
                get("STORAGE_ENDPOINT"),
                get("STORAGE_PUBLIC_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_DRY_RUN_BASE_URL.to_string()),
            )
        } else {
            (
                Some(require("STORAGE_ACCESS_KEY_ID")?),
                Some(require("STORAGE_SECRET_ACCESS_KEY")?),
                Some(require("STORAGE_ENDPOINT")?),
                require("STORAGE_PUBLIC_BASE_URL")?,
            )
        };

        Ok(Self {
            gateway_api_key: require("AI_GATEWAY_API_KEY")?,
            gateway_base_url: get("AI_GATEWAY_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GATEWAY_BASE_URL.to_string()),
            story_model: get("STORY_MODEL").unwrap_or_else(|| DEFAULT_STORY_MODEL.to_string()),
            image_model: get("IMAGE_MODEL").unwrap_or_else(|| DEFAULT_IMAGE_MODEL.to_string()),
            story_timeout: Duration::from_secs(parse_number("STORY_TIMEOUT_SECS", get, 60)?),
            illustration_timeout: Duration::from_secs(parse_number(
                "ILLUSTRATION_TIMEOUT_SECS",
                get,
                120,
            )?),
            max_concurrent_illustrations,
            storage_access_key_id: access_key,
            storage_secret_access_key: secret_key,
            storage_endpoint: endpoint,
            storage_region: get("STORAGE_REGION")
                .unwrap_or_else(|| DEFAULT_STORAGE_REGION.to_string()),
            storage_bucket: get("STORAGE_BUCKET")
                .unwrap_or_else(|| DEFAULT_STORAGE_BUCKET.to_string()),
            storage_public_base_url: public_base_url.trim_end_matches('/').to_string(),
            dry_run,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> crate::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(crate::Error::Config(format!(
            "{} must be a boolean, got '{}'",
            key, other
        ))),
    }
}

fn parse_number<T, G>(key: &str, get: G, default: T) -> crate::Result<T>
where
    T: std::str::FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw.trim().parse().map_err(|_| {
            crate::Error::Config(format!("{} must be a non-negative integer, got '{}'", key, raw))
        }),
        None => Ok(default),
    }
}
