use super::client::GatewayHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::StoryService;
use crate::models::StoryDraft;
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GatewayStoryClient {
    http: GatewayHttpClient,
    model: String,
}

impl GatewayStoryClient {
    pub fn new(api_key: String, base_url: String, model: String, timeout: Duration) -> Self {
        Self::new_with_client(api_key, base_url, model, timeout, reqwest::Client::new())
    }

    pub fn new_with_client(
        api_key: String,
        base_url: String,
        model: String,
        timeout: Duration,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: GatewayHttpClient::new_with_client(api_key, base_url, timeout, client),
            model,
        }
    }
}

#[async_trait]
impl StoryService for GatewayStoryClient {
    async fn generate_story(&self, lyrics: &str, title: Option<&str>) -> Result<StoryDraft> {
        if lyrics.trim().is_empty() {
            return Err(Error::InvalidInput("Lyrics are required".to_string()));
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompts::STORY_SYSTEM),
                ChatMessage::user(prompts::story_user_message(lyrics, title)),
            ],
            modalities: None,
        };

        let response = self.http.chat_completion(&request).await?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| Error::Parse("no story text in AI response".to_string()))?;

        parse_story_content(content)
    }
}

/// Returns the body of the first fenced block, or the trimmed input if unfenced.
pub fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };

    let after_open = &trimmed[open + 3..];
    let body = after_open.strip_prefix("json").unwrap_or(after_open);

    match body.find("```") {
        Some(close) => body[..close].trim(),
        None => trimmed,
    }
}

/// Parses the story model's reply into a draft with at least one page.
pub fn parse_story_content(content: &str) -> Result<StoryDraft> {
    let json = strip_code_fence(content);
    let draft: StoryDraft = serde_json::from_str(json).map_err(|e| {
        tracing::error!("Failed to parse story JSON: {}\nContent: {}", e, content);
        Error::Parse(e.to_string())
    })?;

    if draft.pages.is_empty() {
        return Err(Error::Parse("story contained no pages".to_string()));
    }

    Ok(draft)
}
