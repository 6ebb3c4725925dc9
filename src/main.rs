use clap::Parser;
use report_etl::adapters::{drive::DriveUploader, postgres::PgSource, sheets::GoogleSheetReader};
use report_etl::convert::{LibreOfficeInstaller, SofficeConverter};
use report_etl::utils::{logger, validation::Validate};
use report_etl::{CliConfig, ReportEngine, ReportPipeline};
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = CliConfig::parse();

    logger::init_cli_logger(config.verbose);
    tracing::info!("Starting report-etl CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("{}", e);
        std::process::exit(1);
    }

    let db = PgSource::connect(&config.database(), config.db_query.clone()).await?;
    let sheets = GoogleSheetReader::connect(
        &config.credentials,
        config.spreadsheet_id.clone(),
        config.sheet_range.clone(),
    )
    .await?;
    let mut uploader =
        DriveUploader::connect(&config.credentials, config.drive_folder_id.clone()).await?;
    if let Some(file_id) = &config.drive_file_id {
        uploader = uploader.with_target_file(file_id.clone());
    }

    let step_timeout = Duration::from_secs(config.timeout_secs);
    let mut converter = SofficeConverter::new(&config.soffice_path, step_timeout);
    if let Some(url) = &config.libreoffice_archive_url {
        converter = converter.with_installer(LibreOfficeInstaller::new(url, &config.scratch_dir));
    }

    let pipeline = ReportPipeline::new(db, sheets, converter, uploader, config);
    let engine = ReportEngine::new(pipeline, step_timeout);

    match engine.run().await {
        Ok(summary) => {
            tracing::info!("Report pipeline completed successfully");
            println!(
                "Report uploaded: {} (id {})",
                summary.receipt.name, summary.receipt.id
            );
            if let Some(location) = &summary.receipt.location {
                println!("Location: {}", location);
            }
            println!(
                "{} report rows, {} database rows",
                summary.report_rows, summary.db_rows
            );
        }
        Err(e) => {
            tracing::error!("Report pipeline failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
