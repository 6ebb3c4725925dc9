use crate::core::Pipeline;
use crate::domain::model::{RunSummary, SourceData};
use crate::utils::error::{ReportError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Drives one pipeline run: extract, transform, load, strictly in sequence.
/// Every stage runs under a timeout. The extract stage is read-only and safe
/// to repeat, so it gets a single retry; load creates remote state and is
/// never retried.
pub struct ReportEngine<P: Pipeline> {
    pipeline: P,
    step_timeout: Duration,
}

impl<P: Pipeline> ReportEngine<P> {
    pub fn new(pipeline: P, step_timeout: Duration) -> Self {
        Self {
            pipeline,
            step_timeout,
        }
    }

    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting report pipeline");

        let data = self.extract_with_retry().await?;
        let db_rows = data.db_rows.len();
        tracing::info!(
            "Extracted {} database rows and {} sheet rows",
            db_rows,
            data.sheet_values.len()
        );

        let context = self
            .staged("transform", self.pipeline.transform(data))
            .await?;
        let report_rows = context.rows.len();
        tracing::info!("Prepared {} report rows", report_rows);

        let receipt = self.staged("load", self.pipeline.load(context)).await?;
        tracing::info!("Report uploaded as {} (id {})", receipt.name, receipt.id);

        Ok(RunSummary {
            receipt,
            db_rows,
            report_rows,
        })
    }

    async fn extract_with_retry(&self) -> Result<SourceData> {
        match self.staged("extract", self.pipeline.extract()).await {
            Ok(data) => Ok(data),
            Err(first) => {
                tracing::warn!("Extract failed, retrying once: {}", first);
                self.staged("extract", self.pipeline.extract()).await
            }
        }
    }

    async fn staged<T, F>(&self, stage: &'static str, step: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        timeout(self.step_timeout, step)
            .await
            .map_err(|_| ReportError::Timeout {
                stage,
                seconds: self.step_timeout.as_secs(),
            })?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{RenderContext, UploadReceipt};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyPipeline {
        extract_calls: AtomicUsize,
        fail_first_extract: bool,
        extract_delay: Duration,
    }

    impl FlakyPipeline {
        fn new(fail_first_extract: bool) -> Self {
            Self {
                extract_calls: AtomicUsize::new(0),
                fail_first_extract,
                extract_delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl Pipeline for FlakyPipeline {
        async fn extract(&self) -> Result<SourceData> {
            tokio::time::sleep(self.extract_delay).await;
            let call = self.extract_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_first_extract && call == 0 {
                return Err(ReportError::sheet("transient fetch failure"));
            }
            Ok(SourceData {
                db_rows: vec![],
                sheet_values: vec![
                    vec!["Warehouse".to_string()],
                    vec!["A".to_string()],
                    vec!["B".to_string()],
                ],
            })
        }

        async fn transform(&self, data: SourceData) -> Result<RenderContext> {
            Ok(RenderContext {
                author: "test".to_string(),
                date: "2024-01-01".to_string(),
                rows: crate::domain::mapper::rows_to_records(&data.sheet_values)?,
            })
        }

        async fn load(&self, _context: RenderContext) -> Result<UploadReceipt> {
            Ok(UploadReceipt {
                id: "file-1".to_string(),
                name: "report.pdf".to_string(),
                location: None,
            })
        }
    }

    #[tokio::test]
    async fn test_run_reports_counts_and_receipt() {
        let engine = ReportEngine::new(FlakyPipeline::new(false), Duration::from_secs(5));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.receipt.id, "file-1");
        assert_eq!(summary.db_rows, 0);
        assert_eq!(summary.report_rows, 2);
    }

    #[tokio::test]
    async fn test_extract_is_retried_once() {
        let engine = ReportEngine::new(FlakyPipeline::new(true), Duration::from_secs(5));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.report_rows, 2);
        assert_eq!(engine.pipeline.extract_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stage_timeout_maps_to_timeout_error() {
        let mut pipeline = FlakyPipeline::new(false);
        pipeline.extract_delay = Duration::from_millis(200);
        let engine = ReportEngine::new(pipeline, Duration::from_millis(10));

        let err = engine.run().await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::Timeout {
                stage: "extract",
                ..
            }
        ));
    }
}
