use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use tracing::{debug, error};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::errors::AppError;

/// Object storage for uploaded resource files. Keys are namespaced under the
/// owning user's id.
#[derive(Clone)]
pub struct ObjectStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    region: String,
}

impl ObjectStorage {
    pub async fn new(config: &AppConfig) -> Self {
        let credentials = Credentials::new(
            config.aws_access_key_id.clone(),
            config.aws_secret_access_key.clone(),
            None,
            None,
            "teachassist",
        );
        let shared_config = aws_config::from_env()
            .region(Region::new(config.aws_region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;

        ObjectStorage {
            client: aws_sdk_s3::Client::new(&shared_config),
            bucket: config.s3_bucket.clone(),
            region: config.aws_region.clone(),
        }
    }

    /// `{user_id}/{uuid}.{ext}`, the extension taken from the original
    /// filename.
    pub fn key_for(user_id: &str, filename: &str) -> String {
        let ext = filename.rsplit('.').next().unwrap_or("bin");
        format!("{}/{}.{}", user_id, Uuid::new_v4().simple(), ext)
    }

    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.bucket, self.region, key
        )
    }

    /// Recovers the storage key from a public URL produced by `public_url`.
    pub fn key_from_url(url: &str) -> Option<&str> {
        url.split(".amazonaws.com/").nth(1).filter(|k| !k.is_empty())
    }

    pub async fn upload(&self, key: &str, content_type: &str, data: Bytes) -> Result<(), AppError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("Failed to upload object {}: {:?}", key, e);
                AppError::Storage(format!("Failed to upload file: {}", e))
            })?;

        debug!("Uploaded object: {}", key);
        Ok(())
    }

    pub async fn download(&self, key: &str) -> Result<Bytes, AppError> {
        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to fetch object {}: {:?}", key, e);
                AppError::Storage("Failed to download file".to_string())
            })?;

        let data = object.body.collect().await.map_err(|e| {
            error!("Failed to read object body {}: {:?}", key, e);
            AppError::Storage("Failed to download file".to_string())
        })?;

        Ok(data.into_bytes())
    }

    pub async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to delete object {}: {:?}", key, e);
                AppError::Storage(format!("Failed to delete file: {}", e))
            })?;

        debug!("Deleted object: {}", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_under_user() {
        let key = ObjectStorage::key_for("user_abc", "lesson plan.pdf");
        assert!(key.starts_with("user_abc/"));
        assert!(key.ends_with(".pdf"));
    }

    #[test]
    fn key_roundtrips_through_public_url() {
        let url = "https://teachassist.s3.us-east-1.amazonaws.com/user_abc/file.pdf";
        assert_eq!(ObjectStorage::key_from_url(url), Some("user_abc/file.pdf"));
        assert_eq!(ObjectStorage::key_from_url("https://example.com/x.pdf"), None);
    }
}
