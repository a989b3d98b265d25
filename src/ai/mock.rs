use super::{GeneratedImage, ImageGenerationService, StoryService};
use crate::models::{StoryDraft, StoryPageDraft};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Failure a mock service can be told to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    RateLimited,
    QuotaExhausted,
    Parse,
    NoImageGenerated,
    Upstream,
}

impl MockFailure {
    pub fn into_error(self) -> Error {
        match self {
            MockFailure::RateLimited => Error::RateLimited,
            MockFailure::QuotaExhausted => Error::QuotaExhausted,
            MockFailure::Parse => Error::Parse("mock parse failure".to_string()),
            MockFailure::NoImageGenerated => Error::NoImageGenerated,
            MockFailure::Upstream => Error::Upstream {
                status: 500,
                body: "mock upstream failure".to_string(),
            },
        }
    }
}

#[derive(Clone, Default)]
pub struct MockStoryClient {
    draft: Arc<Mutex<Option<StoryDraft>>>,
    failure: Arc<Mutex<Option<MockFailure>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockStoryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_draft(self, draft: StoryDraft) -> Self {
        *self.draft.lock().unwrap() = Some(draft);
        self
    }

    pub fn with_failure(self, failure: MockFailure) -> Self {
        *self.failure.lock().unwrap() = Some(failure);
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

/// Four-page draft echoing the request, used when no draft is configured.
fn default_draft(lyrics: &str, title: Option<&str>) -> StoryDraft {
    let first_line = lyrics.lines().next().unwrap_or_default().trim();
    StoryDraft {
        title: title.unwrap_or("A Song Story").to_string(),
        pages: (1..=4)
            .map(|n| StoryPageDraft {
                text: format!("Page {} of a story about \"{}\"", n, first_line),
                image_prompt: format!("Illustration {} for \"{}\"", n, first_line),
            })
            .collect(),
    }
}

#[async_trait]
impl StoryService for MockStoryClient {
    async fn generate_story(&self, lyrics: &str, title: Option<&str>) -> Result<StoryDraft> {
        *self.call_count.lock().unwrap() += 1;

        if let Some(failure) = *self.failure.lock().unwrap() {
            return Err(failure.into_error());
        }

        let configured = self.draft.lock().unwrap().clone();
        Ok(configured.unwrap_or_else(|| default_draft(lyrics, title)))
    }
}

/// Tiny PNG returned when no image responses are configured.
const DEFAULT_PNG: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Clone, Default)]
pub struct MockImageGenerationClient {
    image_responses: Arc<Mutex<Vec<GeneratedImage>>>,
    failures: Arc<Mutex<HashMap<String, MockFailure>>>,
    delays: Arc<Mutex<HashMap<String, Duration>>>,
    fail_all: Arc<Mutex<Option<MockFailure>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockImageGenerationClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image_response(self, image: GeneratedImage) -> Self {
        self.image_responses.lock().unwrap().push(image);
        self
    }

    /// Fail only calls whose prompt equals `prompt`.
    pub fn with_failure_for_prompt(self, prompt: &str, failure: MockFailure) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert(prompt.to_string(), failure);
        self
    }

    pub fn with_failure_for_all(self, failure: MockFailure) -> Self {
        *self.fail_all.lock().unwrap() = Some(failure);
        self
    }

    /// Sleep before answering calls whose prompt equals `prompt`.
    pub fn with_delay_for_prompt(self, prompt: &str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(prompt.to_string(), delay);
        self
    }

    pub fn get_call_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGenerationService for MockImageGenerationClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let call_index = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len() - 1
        };

        let delay = self.delays.lock().unwrap().get(prompt).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(failure) = *self.fail_all.lock().unwrap() {
            return Err(failure.into_error());
        }
        if let Some(failure) = self.failures.lock().unwrap().get(prompt).copied() {
            return Err(failure.into_error());
        }

        let responses = self.image_responses.lock().unwrap();
        if responses.is_empty() {
            Ok(GeneratedImage {
                bytes: DEFAULT_PNG.to_vec(),
                extension: "png".to_string(),
            })
        } else {
            Ok(responses[call_index % responses.len()].clone())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_story_client_default_draft() {
        let client = MockStoryClient::new();

        let draft = client
            .generate_story("Shine on, shine on\nall night", Some("Sunrise"))
            .await
            .unwrap();

        assert_eq!(draft.title, "Sunrise");
        assert_eq!(draft.pages.len(), 4);
        assert!(draft.pages[0].text.contains("Shine on, shine on"));
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_story_client_failure() {
        let client = MockStoryClient::new().with_failure(MockFailure::QuotaExhausted);
        let err = client.generate_story("la", None).await.unwrap_err();
        assert!(matches!(err, Error::QuotaExhausted));
    }

    #[tokio::test]
    async fn test_mock_image_client_cycles_responses() {
        let first = GeneratedImage {
            bytes: vec![1],
            extension: "png".to_string(),
        };
        let second = GeneratedImage {
            bytes: vec![2],
            extension: "jpeg".to_string(),
        };
        let client = MockImageGenerationClient::new()
            .with_image_response(first.clone())
            .with_image_response(second.clone());

        assert_eq!(client.generate_image("a").await.unwrap(), first);
        assert_eq!(client.generate_image("b").await.unwrap(), second);
        assert_eq!(client.generate_image("c").await.unwrap(), first);
        assert_eq!(client.get_prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_image_client_fails_selected_prompt() {
        let client = MockImageGenerationClient::new()
            .with_failure_for_prompt("bad", MockFailure::NoImageGenerated);

        assert!(client.generate_image("good").await.is_ok());
        assert!(matches!(
            client.generate_image("bad").await.unwrap_err(),
            Error::NoImageGenerated
        ));
        assert_eq!(client.get_call_count(), 2);
    }
}
