//! Blob storage for generated illustrations
//!
//! Uploads page images to S3-compatible object storage and hands back the
//! public URL the storybook links to.

pub mod client;
pub mod mock;

pub use client::CdnClient;
pub use mock::MockCdnClient;

use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait CdnService: Send + Sync {
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;
    fn public_url(&self, key: &str) -> String;
}
