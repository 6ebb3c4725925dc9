use crate::core::{ConfigProvider, Converter, Pipeline, RelationalSource, SheetSource, Uploader};
use crate::domain::mapper::rows_to_records;
use crate::domain::model::{RenderContext, SourceData, UploadReceipt, MIME_ODT, MIME_PDF};
use crate::render::OdtRenderer;
use crate::utils::error::{ReportError, Result};
use std::path::Path;

/// The report pipeline over injected ports: relational source, sheet source,
/// format converter, and upload destination.
pub struct ReportPipeline<D, S, C, U, P> {
    db: D,
    sheets: S,
    renderer: OdtRenderer,
    converter: C,
    uploader: U,
    config: P,
}

impl<D, S, C, U, P> ReportPipeline<D, S, C, U, P>
where
    D: RelationalSource,
    S: SheetSource,
    C: Converter,
    U: Uploader,
    P: ConfigProvider,
{
    pub fn new(db: D, sheets: S, converter: C, uploader: U, config: P) -> Self {
        Self {
            db,
            sheets,
            renderer: OdtRenderer::new(),
            converter,
            uploader,
            config,
        }
    }
}

#[async_trait::async_trait]
impl<D, S, C, U, P> Pipeline for ReportPipeline<D, S, C, U, P>
where
    D: RelationalSource,
    S: SheetSource,
    C: Converter,
    U: Uploader,
    P: ConfigProvider,
{
    async fn extract(&self) -> Result<SourceData> {
        let db_rows = self.db.fetch_rows().await?;
        tracing::debug!("Database rows: {:?}", db_rows);

        let sheet_values = self.sheets.fetch_range().await?;

        Ok(SourceData {
            db_rows,
            sheet_values,
        })
    }

    async fn transform(&self, data: SourceData) -> Result<RenderContext> {
        let rows = rows_to_records(&data.sheet_values)?;
        Ok(RenderContext {
            author: self.config.author().to_string(),
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
            rows,
        })
    }

    async fn load(&self, context: RenderContext) -> Result<UploadReceipt> {
        let odt_path = Path::new(self.config.scratch_dir())
            .join(format!("{}.odt", self.config.report_name()));
        self.renderer
            .render(self.config.template_path(), &odt_path, &context)?;

        let (artifact, mime_type) = if self.config.convert_to_pdf() {
            (self.converter.convert(&odt_path).await?, MIME_PDF)
        } else {
            (odt_path.clone(), MIME_ODT)
        };

        let file_name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ReportError::validation(format!("Bad artifact path: {}", artifact.display()))
            })?;

        self.uploader.upload(&artifact, &file_name, mime_type).await
    }
}
