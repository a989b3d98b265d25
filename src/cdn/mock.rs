use super::CdnService;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A stored object: bytes plus the content type it was uploaded with.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFile {
    pub data: Vec<u8>,
    pub content_type: String,
}

#[derive(Clone)]
pub struct MockCdnClient {
    files: Arc<Mutex<HashMap<String, StoredFile>>>,
    base_url: String,
    upload_count: Arc<Mutex<usize>>,
    fail_uploads: Arc<Mutex<bool>>,
}

impl MockCdnClient {
    pub fn new() -> Self {
        Self {
            files: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-cdn.example.com".to_string(),
            upload_count: Arc::new(Mutex::new(0)),
            fail_uploads: Arc::new(Mutex::new(false)),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_failing_uploads(self) -> Self {
        *self.fail_uploads.lock().unwrap() = true;
        self
    }

    pub fn get_upload_count(&self) -> usize {
        *self.upload_count.lock().unwrap()
    }

    pub fn get_files(&self) -> HashMap<String, StoredFile> {
        self.files.lock().unwrap().clone()
    }
}

impl Default for MockCdnClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CdnService for MockCdnClient {
    async fn upload_file(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        *self.upload_count.lock().unwrap() += 1;

        if *self.fail_uploads.lock().unwrap() {
            return Err(Error::Storage(format!("Failed to upload {}", key)));
        }

        self.files.lock().unwrap().insert(
            key.to_string(),
            StoredFile {
                data: data.to_vec(),
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}
