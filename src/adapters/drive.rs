use crate::domain::model::UploadReceipt;
use crate::domain::ports::Uploader;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use google_drive3::api::File as DriveFile;
use google_drive3::hyper::client::HttpConnector;
use google_drive3::hyper_rustls::HttpsConnector;
use google_drive3::{hyper, hyper_rustls, oauth2, DriveHub};
use std::path::Path;

/// Pushes the rendered report into a Drive folder. When a target file id is
/// set the upload replaces that file's content instead of creating a new one.
pub struct DriveUploader {
    hub: DriveHub<HttpsConnector<HttpConnector>>,
    folder_id: String,
    target_file_id: Option<String>,
}

impl DriveUploader {
    pub async fn connect(credentials_path: &str, folder_id: impl Into<String>) -> Result<Self> {
        let key = oauth2::read_service_account_key(credentials_path)
            .await
            .map_err(|e| ReportError::ConfigError {
                message: format!(
                    "Cannot read service account key {}: {}",
                    credentials_path, e
                ),
            })?;
        let auth = oauth2::ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .map_err(|e| ReportError::ConfigError {
                message: format!("Service account authentication failed: {}", e),
            })?;

        let connector = hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .https_or_http()
            .enable_http1()
            .build();
        let client = hyper::Client::builder().build(connector);

        Ok(Self {
            hub: DriveHub::new(client, auth),
            folder_id: folder_id.into(),
            target_file_id: None,
        })
    }

    /// Route uploads to `files.update` on this file id instead of
    /// `files.create`.
    pub fn with_target_file(mut self, file_id: impl Into<String>) -> Self {
        self.target_file_id = Some(file_id.into());
        self
    }

    /// Replaces the content (and optionally the name) of an existing file.
    pub async fn update(
        &self,
        file_id: &str,
        path: &Path,
        new_name: Option<&str>,
        mime_type: &str,
    ) -> Result<UploadReceipt> {
        let mime = parse_mime(mime_type)?;
        let metadata = DriveFile {
            name: new_name.map(str::to_string),
            ..Default::default()
        };

        let (_, updated) = self
            .hub
            .files()
            .update(metadata, file_id)
            .upload(std::fs::File::open(path)?, mime)
            .await
            .map_err(|e| ReportError::upload(format!("Drive update failed: {}", e)))?;

        Ok(receipt_from(updated, file_id))
    }
}

#[async_trait]
impl Uploader for DriveUploader {
    async fn upload(&self, path: &Path, name: &str, mime_type: &str) -> Result<UploadReceipt> {
        if let Some(file_id) = &self.target_file_id {
            tracing::info!(
                "Updating Drive file {} with {} as {}",
                file_id,
                path.display(),
                name
            );
            return self.update(file_id, path, Some(name), mime_type).await;
        }

        tracing::info!(
            "Uploading {} to Drive folder {} as {}",
            path.display(),
            self.folder_id,
            name
        );
        let mime = parse_mime(mime_type)?;
        let metadata = DriveFile {
            name: Some(name.to_string()),
            mime_type: Some(mime_type.to_string()),
            parents: Some(vec![self.folder_id.clone()]),
            ..Default::default()
        };

        let (_, created) = self
            .hub
            .files()
            .create(metadata)
            .upload(std::fs::File::open(path)?, mime)
            .await
            .map_err(|e| ReportError::upload(format!("Drive create failed: {}", e)))?;

        Ok(receipt_from(created, name))
    }
}

fn parse_mime(mime_type: &str) -> Result<mime::Mime> {
    mime_type
        .parse()
        .map_err(|_| ReportError::upload(format!("Invalid mime type: {}", mime_type)))
}

fn receipt_from(file: DriveFile, fallback_name: &str) -> UploadReceipt {
    let id = file.id.unwrap_or_default();
    let location = (!id.is_empty()).then(|| format!("https://drive.google.com/file/d/{}", id));
    UploadReceipt {
        id,
        name: file.name.unwrap_or_else(|| fallback_name.to_string()),
        location,
    }
}
