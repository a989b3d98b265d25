use super::CdnService;
use crate::{Error, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::{config::Region, types::ObjectCannedAcl, Client as S3Client};

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Clone)]
pub struct CdnSettings {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub public_base_url: String,
}

pub struct CdnClient {
    client: S3Client,
    bucket: String,
    base_url: String,
}

impl CdnClient {
    pub async fn new(settings: CdnSettings) -> Result<Self> {
        let credentials = aws_sdk_s3::config::Credentials::new(
            settings.access_key_id,
            settings.secret_access_key,
            None,
            None,
            "story-image-storage",
        );

        let config = aws_config::defaults(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(settings.region))
            .endpoint_url(settings.endpoint)
            .load()
            .await;

        // Objects live at <endpoint>/<bucket>/<key>.
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: S3Client::from_conf(s3_config),
            bucket: settings.bucket,
            base_url: settings.public_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CdnService for CdnClient {
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let body = ByteStream::from(data.to_vec());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| Error::Storage(format!("Failed to upload image: {}", e)))?;

        tracing::debug!("Uploaded {} ({} bytes) to {}", key, data.len(), self.bucket);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
