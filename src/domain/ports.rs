use crate::domain::model::{RenderContext, RowRecord, SourceData, UploadReceipt};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

#[async_trait]
pub trait RelationalSource: Send + Sync {
    async fn fetch_rows(&self) -> Result<Vec<RowRecord>>;
}

#[async_trait]
pub trait SheetSource: Send + Sync {
    async fn fetch_range(&self) -> Result<Vec<Vec<String>>>;
}

/// External-tool boundary for document format conversion. Concrete
/// implementations may shell out; tests substitute a mock.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, input: &Path) -> Result<PathBuf>;
}

#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, path: &Path, name: &str, mime_type: &str) -> Result<UploadReceipt>;
}

pub trait ConfigProvider: Send + Sync {
    fn author(&self) -> &str;
    fn template_path(&self) -> &str;
    fn scratch_dir(&self) -> &str;
    fn report_name(&self) -> &str;
    fn convert_to_pdf(&self) -> bool;
    fn step_timeout_secs(&self) -> u64;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<SourceData>;
    async fn transform(&self, data: SourceData) -> Result<RenderContext>;
    async fn load(&self, context: RenderContext) -> Result<UploadReceipt>;
}
