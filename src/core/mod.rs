pub mod engine;
pub mod pipeline;

pub use crate::domain::model::{RenderContext, RowRecord, RunSummary, SourceData, UploadReceipt};
pub use crate::domain::ports::{
    ConfigProvider, Converter, Pipeline, RelationalSource, SheetSource, Uploader,
};
pub use crate::utils::error::Result;
