//! Page illustration: generate an image for one page and publish it.

use crate::ai::ImageGenerationService;
use crate::cdn::CdnService;
use crate::{Error, Result};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait IllustrationService: Send + Sync {
    /// Returns the public URL of a freshly painted illustration for `prompt`.
    async fn illustrate(&self, prompt: &str, page_index: usize) -> Result<String>;
}

/// Generates page images and stores them in the blob store.
pub struct Illustrator {
    image_gen: Box<dyn ImageGenerationService>,
    cdn: Box<dyn CdnService>,
}

impl Illustrator {
    pub fn new(image_gen: Box<dyn ImageGenerationService>, cdn: Box<dyn CdnService>) -> Self {
        Self { image_gen, cdn }
    }
}

/// Unique object key: random id, page number, and image extension.
pub fn storage_key(page_index: usize, extension: &str) -> String {
    format!("{}-page{}.{}", Uuid::new_v4(), page_index, extension)
}

#[async_trait]
impl IllustrationService for Illustrator {
    async fn illustrate(&self, prompt: &str, page_index: usize) -> Result<String> {
        if prompt.trim().is_empty() {
            return Err(Error::InvalidInput("imagePrompt is required".to_string()));
        }

        let image = self.image_gen.generate_image(prompt).await?;
        let key = storage_key(page_index, &image.extension);

        self.cdn
            .upload_file(&key, &image.bytes, &image.content_type())
            .await
            .map_err(|e| match e {
                Error::Storage(_) => e,
                other => Error::Storage(other.to_string()),
            })?;

        tracing::info!("[page {}] Uploaded illustration as {}", page_index, key);
        Ok(self.cdn.public_url(&key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{GeneratedImage, MockFailure, MockImageGenerationClient};
    use crate::cdn::MockCdnClient;

    fn illustrator(image_gen: MockImageGenerationClient, cdn: MockCdnClient) -> Illustrator {
        Illustrator::new(Box::new(image_gen), Box::new(cdn))
    }

    #[test]
    fn test_storage_key_includes_page_and_extension() {
        let key = storage_key(3, "jpeg");
        assert!(key.ends_with("-page3.jpeg"));
        assert_ne!(storage_key(3, "jpeg"), key);
    }

    #[tokio::test]
    async fn test_illustrate_uploads_and_returns_public_url() {
        let image_gen = MockImageGenerationClient::new().with_image_response(GeneratedImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            extension: "jpeg".to_string(),
        });
        let cdn = MockCdnClient::new().with_base_url("https://cdn.test".to_string());
        let cdn_probe = cdn.clone();

        let url = illustrator(image_gen, cdn)
            .illustrate("a fox in the snow", 2)
            .await
            .unwrap();

        assert!(url.starts_with("https://cdn.test/"));
        assert!(url.ends_with("-page2.jpeg"));

        let files = cdn_probe.get_files();
        assert_eq!(files.len(), 1);
        let stored = files.values().next().unwrap();
        assert_eq!(stored.data, vec![0xFF, 0xD8, 0xFF]);
        assert_eq!(stored.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_empty_prompt_is_invalid_input_without_generation() {
        let image_gen = MockImageGenerationClient::new();
        let image_probe = image_gen.clone();

        let err = illustrator(image_gen, MockCdnClient::new())
            .illustrate("  ", 0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(image_probe.get_call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_is_passed_through() {
        let image_gen = MockImageGenerationClient::new().with_failure_for_all(MockFailure::RateLimited);
        let cdn = MockCdnClient::new();
        let cdn_probe = cdn.clone();

        let err = illustrator(image_gen, cdn)
            .illustrate("a fox", 0)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::RateLimited));
        assert_eq!(cdn_probe.get_upload_count(), 0);
    }

    #[tokio::test]
    async fn test_upload_failure_is_storage_error() {
        let err = illustrator(
            MockImageGenerationClient::new(),
            MockCdnClient::new().with_failing_uploads(),
        )
        .illustrate("a fox", 0)
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Storage(_)));
    }
}
