//! Application wiring: builds the pipeline from configuration and runs it.

use crate::ai::{GatewayImageClient, GatewayStoryClient, ImageGenerationService, StoryService};
use crate::cdn::client::CdnSettings;
use crate::cdn::{CdnClient, CdnService, MockCdnClient};
use crate::illustrator::Illustrator;
use crate::models::{Config, ProgressEvent, StoryRequest, StoryResult};
use crate::pipeline::{ProgressListener, StoryPipeline};
use crate::{Error, Result};
use std::fs;
use std::path::Path;
use tracing::info;

/// Logs each progress milestone.
pub struct LogProgress;

impl ProgressListener for LogProgress {
    fn on_progress(&self, event: ProgressEvent) {
        info!("[{:>3.0}%] {}", event.percent, event.stage);
    }
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub story: Box<dyn StoryService>,
    pub image_gen: Box<dyn ImageGenerationService>,
    pub cdn: Box<dyn CdnService>,
}

pub struct App {
    pipeline: StoryPipeline,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, config: &Config) -> Self {
        let illustrator = Illustrator::new(services.image_gen, services.cdn);
        let pipeline = StoryPipeline::new(services.story, Box::new(illustrator))
            .with_max_concurrent_illustrations(config.max_concurrent_illustrations)
            .with_illustration_timeout(config.illustration_timeout);

        Self { pipeline }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        let config = Config::from_env()?;
        Self::from_config(&config).await
    }

    pub async fn from_config(config: &Config) -> Result<Self> {
        // Reuse one HTTP connection pool across both gateway clients.
        let http_client = reqwest::Client::new();

        info!(
            "Story model: {}, image model: {}",
            config.story_model, config.image_model
        );

        let story = Box::new(GatewayStoryClient::new_with_client(
            config.gateway_api_key.clone(),
            config.gateway_base_url.clone(),
            config.story_model.clone(),
            config.story_timeout,
            http_client.clone(),
        ));

        let image_gen = Box::new(GatewayImageClient::new_with_client(
            config.gateway_api_key.clone(),
            config.gateway_base_url.clone(),
            config.image_model.clone(),
            config.illustration_timeout,
            http_client,
        ));

        let cdn: Box<dyn CdnService> = if config.dry_run {
            info!("DRY_RUN enabled, illustrations are kept in memory");
            Box::new(MockCdnClient::new().with_base_url(config.storage_public_base_url.clone()))
        } else {
            Box::new(CdnClient::new(cdn_settings(config)?).await?)
        };

        Ok(Self::with_services(
            AppServices {
                story,
                image_gen,
                cdn,
            },
            config,
        ))
    }

    /// Assemble a storybook, optionally saving it as pretty JSON at `output`.
    pub async fn run(&self, request: StoryRequest, output: Option<&Path>) -> Result<StoryResult> {
        let result = self
            .pipeline
            .assemble_story(request, Some(&LogProgress))
            .await?;

        if let Some(path) = output {
            let json = serde_json::to_string_pretty(&result)?;
            fs::write(path, json)?;
            info!("Saved storybook at: {}", path.display());
        }

        Ok(result)
    }
}

fn cdn_settings(config: &Config) -> Result<CdnSettings> {
    let missing = |key: &str| Error::Config(format!("{} not set", key));

    Ok(CdnSettings {
        access_key_id: config
            .storage_access_key_id
            .clone()
            .ok_or_else(|| missing("STORAGE_ACCESS_KEY_ID"))?,
        secret_access_key: config
            .storage_secret_access_key
            .clone()
            .ok_or_else(|| missing("STORAGE_SECRET_ACCESS_KEY"))?,
        endpoint: config
            .storage_endpoint
            .clone()
            .ok_or_else(|| missing("STORAGE_ENDPOINT"))?,
        region: config.storage_region.clone(),
        bucket: config.storage_bucket.clone(),
        public_base_url: config.storage_public_base_url.clone(),
    })
}
