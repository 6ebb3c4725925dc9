#[cfg(feature = "lambda")]
use aws_config::BehaviorVersion;
#[cfg(feature = "lambda")]
use aws_sdk_s3::config::Region;
#[cfg(feature = "lambda")]
use aws_sdk_s3::Client as S3Client;
#[cfg(feature = "lambda")]
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
#[cfg(feature = "lambda")]
use report_etl::adapters::s3::S3Uploader;
#[cfg(feature = "lambda")]
use report_etl::adapters::{postgres::PgSource, sheets::GoogleSheetReader};
#[cfg(feature = "lambda")]
use report_etl::config::lambda::LambdaConfig;
#[cfg(feature = "lambda")]
use report_etl::config::DatabaseConfig;
#[cfg(feature = "lambda")]
use report_etl::convert::{LibreOfficeInstaller, SofficeConverter};
#[cfg(feature = "lambda")]
use report_etl::utils::{logger, validation::Validate};
#[cfg(feature = "lambda")]
use report_etl::{ReportEngine, ReportPipeline};
#[cfg(feature = "lambda")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "lambda")]
use std::time::Duration;

#[cfg(feature = "lambda")]
#[derive(Deserialize)]
pub struct Request {
    pub spreadsheet_id: Option<String>,
    pub report_name: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_prefix: Option<String>,
}

#[cfg(feature = "lambda")]
#[derive(Serialize)]
pub struct Response {
    pub message: String,
    pub file_id: String,
    pub location: Option<String>,
    pub db_rows: usize,
    pub report_rows: usize,
}

#[cfg(feature = "lambda")]
async fn function_handler(event: LambdaEvent<Request>) -> Result<Response, Error> {
    tracing::info!("Starting report Lambda function");

    // Event fields override the environment configuration
    if let Some(id) = &event.payload.spreadsheet_id {
        std::env::set_var("SPREADSHEET_ID", id);
    }
    if let Some(name) = &event.payload.report_name {
        std::env::set_var("REPORT_NAME", name);
    }
    if let Some(bucket) = &event.payload.s3_bucket {
        std::env::set_var("S3_BUCKET", bucket);
    }
    if let Some(prefix) = &event.payload.s3_prefix {
        std::env::set_var("S3_PREFIX", prefix);
    }

    let config = LambdaConfig::from_env().map_err(boxed)?;
    config.validate().map_err(boxed)?;

    let db_config = DatabaseConfig::from_env().map_err(boxed)?;
    let db = PgSource::connect(&db_config, config.db_query.clone())
        .await
        .map_err(boxed)?;
    let sheets = GoogleSheetReader::connect(
        &config.credentials_path,
        config.spreadsheet_id.clone(),
        config.sheet_range.clone(),
    )
    .await
    .map_err(boxed)?;

    let aws_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .region(Region::new(config.s3_region.clone()))
        .build();
    let s3_client = S3Client::from_conf(s3_config);
    let uploader = S3Uploader::new(s3_client, config.s3_bucket.clone(), config.s3_prefix.clone());

    let step_timeout = Duration::from_secs(config.timeout_secs);
    let mut converter = SofficeConverter::new(&config.soffice_path, step_timeout);
    if let Some(url) = &config.libreoffice_archive_url {
        converter = converter.with_installer(LibreOfficeInstaller::new(url, &config.scratch_dir));
    }

    let pipeline = ReportPipeline::new(db, sheets, converter, uploader, config);
    let engine = ReportEngine::new(pipeline, step_timeout);
    let summary = engine.run().await.map_err(boxed)?;

    tracing::info!("Report Lambda function completed successfully");
    Ok(Response {
        message: "Report generated and uploaded".to_string(),
        file_id: summary.receipt.id,
        location: summary.receipt.location,
        db_rows: summary.db_rows,
        report_rows: summary.report_rows,
    })
}

#[cfg(feature = "lambda")]
fn boxed(e: report_etl::ReportError) -> Error {
    Box::new(e) as Box<dyn std::error::Error + Send + Sync>
}

#[cfg(feature = "lambda")]
#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_lambda_logger();
    run(service_fn(function_handler)).await
}
