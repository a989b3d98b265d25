//! Story assembly: write the story, illustrate every page concurrently, and
//! merge the two into a finished book.
//!
//! Story generation failures abort the run. Illustration failures never do:
//! each failed page gets [`PLACEHOLDER_IMAGE_URL`] and the book is still
//! returned in full.

use crate::ai::StoryService;
use crate::illustrator::IllustrationService;
use crate::models::{ProgressEvent, StoryPage, StoryRequest, StoryResult};
use crate::{Error, Result};
use futures_util::stream::{self, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{error, info, warn};

/// Fallback image for pages whose illustration could not be produced.
pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1472396961693-142e6e269027?w=800";

pub const DEFAULT_MAX_CONCURRENT_ILLUSTRATIONS: usize = 8;
pub const DEFAULT_ILLUSTRATION_TIMEOUT: Duration = Duration::from_secs(120);

const FALLBACK_TITLE: &str = "Untitled Story";

/// Receives progress milestones while a story is being assembled.
pub trait ProgressListener: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

impl<F> ProgressListener for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Forwards progress events into a channel the caller drains.
pub struct ChannelProgress(pub UnboundedSender<ProgressEvent>);

impl ProgressListener for ChannelProgress {
    fn on_progress(&self, event: ProgressEvent) {
        // A dropped receiver just means nobody is watching anymore.
        let _ = self.0.send(event);
    }
}

/// Orchestrates story generation and per-page illustration.
pub struct StoryPipeline {
    story: Box<dyn StoryService>,
    illustrator: Box<dyn IllustrationService>,
    max_concurrent_illustrations: usize,
    illustration_timeout: Duration,
}

impl StoryPipeline {
    pub fn new(story: Box<dyn StoryService>, illustrator: Box<dyn IllustrationService>) -> Self {
        Self {
            story,
            illustrator,
            max_concurrent_illustrations: DEFAULT_MAX_CONCURRENT_ILLUSTRATIONS,
            illustration_timeout: DEFAULT_ILLUSTRATION_TIMEOUT,
        }
    }

    pub fn with_max_concurrent_illustrations(mut self, limit: usize) -> Self {
        self.max_concurrent_illustrations = limit.max(1);
        self
    }

    pub fn with_illustration_timeout(mut self, timeout: Duration) -> Self {
        self.illustration_timeout = timeout;
        self
    }

    /// Builds a complete storybook from `request`.
    ///
    /// Events reach `progress` while the run is in flight: 10 before the
    /// story is requested, 30 once it is written, one event per settled
    /// illustration up to 90, and 100 exactly once after every page has
    /// settled. Dropping the returned future cancels all in-flight calls.
    pub async fn assemble_story(
        &self,
        request: StoryRequest,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<StoryResult> {
        let StoryRequest { lyrics, title } = request;
        if lyrics.trim().is_empty() {
            return Err(Error::InvalidInput("Lyrics are required".to_string()));
        }

        emit(progress, "generating story", 10.0);
        info!("Generating story from {} chars of lyrics", lyrics.len());

        let draft = self
            .story
            .generate_story(&lyrics, title.as_deref())
            .await
            .map_err(|e| {
                error!("Story generation failed: {}", e);
                e
            })?;

        let total = draft.pages.len();
        info!("Story \"{}\" written with {} pages", draft.title, total);
        emit(progress, "story complete, generating illustrations", 30.0);

        let mut image_urls: Vec<Option<String>> = vec![None; total];
        {
            let mut settled = stream::iter(draft.pages.iter().enumerate())
                .map(|(index, page)| async move {
                    (index, self.illustrate_page(&page.image_prompt, index).await)
                })
                .buffer_unordered(self.max_concurrent_illustrations);

            // Only this loop touches the counter, so every completion is
            // counted once and percents only go up.
            let mut completed = 0;
            while let Some((index, outcome)) = settled.next().await {
                completed += 1;
                let url = match outcome {
                    Ok(url) => url,
                    Err(e) => {
                        warn!("[page {}] Illustration failed, using placeholder: {}", index, e);
                        PLACEHOLDER_IMAGE_URL.to_string()
                    }
                };
                image_urls[index] = Some(url);

                emit(
                    progress,
                    format!("illustrating page {} of {}", completed, total),
                    illustration_percent(completed, total),
                );
            }
        }

        let pages = draft
            .pages
            .into_iter()
            .zip(image_urls)
            .map(|(page, url)| {
                StoryPage::from_draft(
                    page,
                    url.unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
                )
            })
            .collect();

        let result = StoryResult {
            title: resolve_title(&draft.title, title.as_deref()),
            pages,
        };

        emit(progress, "storybook ready", 100.0);
        info!("Storybook \"{}\" ready", result.title);
        Ok(result)
    }

    async fn illustrate_page(&self, prompt: &str, index: usize) -> Result<String> {
        let url = tokio::time::timeout(
            self.illustration_timeout,
            self.illustrator.illustrate(prompt, index),
        )
        .await
        .map_err(|_| Error::Timeout(self.illustration_timeout.as_secs()))??;

        if url.trim().is_empty() {
            return Err(Error::Storage("blob store returned an empty URL".to_string()));
        }
        Ok(url)
    }
}

fn emit(progress: Option<&dyn ProgressListener>, stage: impl Into<String>, percent: f64) {
    if let Some(listener) = progress {
        listener.on_progress(ProgressEvent::new(stage, percent));
    }
}

/// Maps `completed` of `total` illustrations onto the 30..=90 band.
pub fn illustration_percent(completed: usize, total: usize) -> f64 {
    if total == 0 {
        return 90.0;
    }
    30.0 + (completed as f64 / total as f64) * 60.0
}

/// Prefers the model's title, then the song title, then a generic one.
fn resolve_title(story_title: &str, request_title: Option<&str>) -> String {
    [Some(story_title), request_title]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|t| !t.is_empty())
        .unwrap_or(FALLBACK_TITLE)
        .to_string()
}
