#[cfg(feature = "lambda")]
use crate::domain::model::UploadReceipt;
#[cfg(feature = "lambda")]
use crate::domain::ports::Uploader;
#[cfg(feature = "lambda")]
use crate::utils::error::{ReportError, Result};
#[cfg(feature = "lambda")]
use async_trait::async_trait;
#[cfg(feature = "lambda")]
use aws_sdk_s3::primitives::ByteStream;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use std::path::Path;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct S3Uploader {
    client: S3Client,
    bucket: String,
    prefix: String,
}

#[cfg(feature = "lambda")]
impl S3Uploader {
    pub fn new(client: S3Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn object_key(&self, name: &str) -> String {
        if self.prefix.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.prefix.trim_end_matches('/'), name)
        }
    }
}

#[cfg(feature = "lambda")]
#[async_trait]
impl Uploader for S3Uploader {
    async fn upload(&self, path: &Path, name: &str, mime_type: &str) -> Result<UploadReceipt> {
        let key = self.object_key(name);
        tracing::info!(
            "Uploading {} to s3://{}/{}",
            path.display(),
            self.bucket,
            key
        );

        let body = ByteStream::from_path(path)
            .await
            .map_err(|e| ReportError::upload(format!("Cannot read {}: {}", path.display(), e)))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type(mime_type)
            .body(body)
            .send()
            .await
            .map_err(|e| ReportError::upload(format!("S3 put_object failed: {}", e)))?;

        Ok(UploadReceipt {
            id: key.clone(),
            name: name.to_string(),
            location: Some(format!("s3://{}/{}", self.bucket, key)),
        })
    }
}
