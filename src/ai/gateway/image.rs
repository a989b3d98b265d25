use super::client::GatewayHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage};
use crate::ai::{decode_data_uri, GeneratedImage, ImageGenerationService};
use crate::{prompts, Error, Result};
use async_trait::async_trait;
use std::time::Duration;

pub struct GatewayImageClient {
    http: GatewayHttpClient,
    model: String,
}

impl GatewayImageClient {
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
impl ImageGenerationService for GatewayImageClient {
    async fn generate_image(&self, prompt: &str) -> Result<GeneratedImage> {
        let styled_prompt = prompts::render(prompts::IMAGE_STYLE, &[("prompt", prompt)]);

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(styled_prompt)],
            modalities: Some(vec!["image".to_string(), "text".to_string()]),
        };

        let response = self.http.chat_completion(&request).await?;

        let data_uri = response
            .choices
            .first()
            .and_then(|choice| choice.message.images.first())
            .map(|image| image.image_url.url.as_str())
            .ok_or_else(|| {
                tracing::error!("No image in AI gateway response");
                Error::NoImageGenerated
            })?;

        let image = decode_data_uri(data_uri)?;
        tracing::debug!(
            "Gateway returned {} image ({} bytes)",
            image.extension,
            image.bytes.len()
        );
        Ok(image)
    }
}
