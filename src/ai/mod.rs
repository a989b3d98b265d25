//! AI service integration for story and illustration generation
//!
//! Talks to an OpenAI-compatible chat-completions gateway: one text model
//! writes the storybook pages, one image model paints each page.

pub mod data_uri;
pub mod gateway;
pub mod mock;

pub use data_uri::{decode_data_uri, GeneratedImage};
pub use gateway::{GatewayImageClient, GatewayStoryClient};
pub use mock::{MockFailure, MockImageGenerationClient, MockStoryClient};

use crate::models::StoryDraft;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait StoryService: Send + Sync {
    /// Writes an ordered, titled page list inspired by `lyrics`.
    async fn generate_story(&self, lyrics: &str, title: Option<&str>) -> Result<StoryDraft>;
}

#[async_trait]
pub trait ImageGenerationService: Send + Sync {
    /// Paints one storybook illustration for a page description.
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage>;
}
