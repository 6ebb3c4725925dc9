pub mod lambda;

use crate::utils::error::{ReportError, Result};
use std::env;

#[cfg(feature = "cli")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "cli")]
use clap::Parser;

pub const DEFAULT_DB_QUERY: &str = "SELECT * FROM customers";
pub const DEFAULT_SHEET_RANGE: &str = "Sheet1!A:E";

/// Connection parameters for the relational store, from the DB_* variables.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub user: String,
    pub name: String,
    pub password: String,
    pub port: u16,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: required_env("DB_HOST")?,
            user: required_env("DB_USER")?,
            name: required_env("DB_NAME")?,
            password: required_env("DB_PWD")?,
            port: env::var("DB_PORT")
                .unwrap_or_else(|_| "5432".to_string())
                .parse()
                .map_err(|_| ReportError::ConfigError {
                    message: "DB_PORT must be a port number".to_string(),
                })?,
        })
    }
}

fn required_env(field: &str) -> Result<String> {
    env::var(field).map_err(|_| ReportError::MissingConfigError {
        field: field.to_string(),
    })
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "report-etl")]
#[command(about = "Generates an ODT/PDF report from Postgres and Google Sheets data")]
pub struct CliConfig {
    #[arg(long, env = "TEMPLATE_PATH", default_value = "./report-template.odt")]
    pub template: String,

    #[arg(long, env = "SCRATCH_DIR", default_value = "/tmp")]
    pub scratch_dir: String,

    #[arg(long, env = "REPORT_NAME", default_value = "report")]
    pub report_name: String,

    #[arg(long, env = "REPORT_AUTHOR", default_value = "Reporting Service")]
    pub author: String,

    #[arg(long, env = "GOOGLE_CREDENTIALS", default_value = "./credentials.json")]
    pub credentials: String,

    #[arg(long, env = "SPREADSHEET_ID")]
    pub spreadsheet_id: String,

    #[arg(long, env = "SHEET_RANGE", default_value = DEFAULT_SHEET_RANGE)]
    pub sheet_range: String,

    #[arg(long, env = "DRIVE_FOLDER_ID")]
    pub drive_folder_id: String,

    #[arg(
        long,
        env = "DRIVE_FILE_ID",
        help = "Update this existing Drive file instead of creating a new one"
    )]
    pub drive_file_id: Option<String>,

    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    #[arg(long, env = "DB_NAME", default_value = "postgres")]
    pub db_name: String,

    #[arg(long, env = "DB_PWD", default_value = "", hide_env_values = true)]
    pub db_pwd: String,

    #[arg(long, env = "DB_PORT", default_value = "5432")]
    pub db_port: u16,

    #[arg(long, env = "DB_QUERY", default_value = DEFAULT_DB_QUERY)]
    pub db_query: String,

    #[arg(long, help = "Convert the rendered document to PDF before uploading")]
    pub pdf: bool,

    #[arg(long, env = "SOFFICE_PATH", default_value = "/tmp/instdir/program/soffice")]
    pub soffice_path: String,

    #[arg(long, env = "LIBREOFFICE_ARCHIVE_URL")]
    pub libreoffice_archive_url: Option<String>,

    #[arg(long, env = "STEP_TIMEOUT_SECS", default_value = "120")]
    pub timeout_secs: u64,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn database(&self) -> DatabaseConfig {
        DatabaseConfig {
            host: self.db_host.clone(),
            user: self.db_user.clone(),
            name: self.db_name.clone(),
            password: self.db_pwd.clone(),
            port: self.db_port,
        }
    }
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn author(&self) -> &str {
        &self.author
    }

    fn template_path(&self) -> &str {
        &self.template
    }

    fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    fn report_name(&self) -> &str {
        &self.report_name
    }

    fn convert_to_pdf(&self) -> bool {
        self.pdf
    }

    fn step_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

#[cfg(feature = "cli")]
impl crate::utils::validation::Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_path("template", &self.template)?;
        validate_file_extension("template", &self.template, "odt")?;
        validate_path("scratch_dir", &self.scratch_dir)?;
        validate_path("credentials", &self.credentials)?;
        validate_non_empty_string("report_name", &self.report_name)?;
        validate_non_empty_string("spreadsheet_id", &self.spreadsheet_id)?;
        validate_non_empty_string("sheet_range", &self.sheet_range)?;
        validate_non_empty_string("drive_folder_id", &self.drive_folder_id)?;
        if let Some(file_id) = &self.drive_file_id {
            validate_non_empty_string("drive_file_id", file_id)?;
        }
        validate_non_empty_string("db_query", &self.db_query)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 3600)?;

        if let Some(url) = &self.libreoffice_archive_url {
            validate_url("libreoffice_archive_url", url)?;
        }

        Ok(())
    }
}
