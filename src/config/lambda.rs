#[cfg(feature = "lambda")]
use crate::config::{DEFAULT_DB_QUERY, DEFAULT_SHEET_RANGE};
#[cfg(feature = "lambda")]
use crate::domain::ports::ConfigProvider;
#[cfg(feature = "lambda")]
use crate::utils::error::{ReportError, Result};
#[cfg(feature = "lambda")]
use std::env;

#[cfg(feature = "lambda")]
#[derive(Debug, Clone)]
pub struct LambdaConfig {
    pub author: String,
    pub template_path: String,
    pub scratch_dir: String,
    pub report_name: String,
    pub credentials_path: String,
    pub spreadsheet_id: String,
    pub sheet_range: String,
    pub db_query: String,
    pub s3_bucket: String,
    pub s3_prefix: String,
    pub s3_region: String,
    pub convert_to_pdf: bool,
    pub soffice_path: String,
    pub libreoffice_archive_url: Option<String>,
    pub timeout_secs: u64,
}

#[cfg(feature = "lambda")]
impl LambdaConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            author: env::var("REPORT_AUTHOR").unwrap_or_else(|_| "Reporting Service".to_string()),
            template_path: env::var("TEMPLATE_PATH")
                .unwrap_or_else(|_| "./report-template.odt".to_string()),
            scratch_dir: env::var("SCRATCH_DIR").unwrap_or_else(|_| "/tmp".to_string()),
            report_name: env::var("REPORT_NAME").unwrap_or_else(|_| "report".to_string()),
            credentials_path: env::var("GOOGLE_CREDENTIALS")
                .unwrap_or_else(|_| "./credentials.json".to_string()),
            spreadsheet_id: env::var("SPREADSHEET_ID").map_err(|_| {
                ReportError::MissingConfigError {
                    field: "SPREADSHEET_ID".to_string(),
                }
            })?,
            sheet_range: env::var("SHEET_RANGE")
                .unwrap_or_else(|_| DEFAULT_SHEET_RANGE.to_string()),
            db_query: env::var("DB_QUERY").unwrap_or_else(|_| DEFAULT_DB_QUERY.to_string()),
            s3_bucket: env::var("S3_BUCKET").map_err(|_| ReportError::MissingConfigError {
                field: "S3_BUCKET".to_string(),
            })?,
            s3_prefix: env::var("S3_PREFIX").unwrap_or_else(|_| "reports".to_string()),
            s3_region: env::var("S3_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            convert_to_pdf: env::var("CONVERT_TO_PDF")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(true),
            soffice_path: env::var("SOFFICE_PATH")
                .unwrap_or_else(|_| "/tmp/instdir/program/soffice".to_string()),
            libreoffice_archive_url: env::var("LIBREOFFICE_ARCHIVE_URL").ok(),
            timeout_secs: env::var("STEP_TIMEOUT_SECS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
        })
    }

}

#[cfg(feature = "lambda")]
impl ConfigProvider for LambdaConfig {
    fn author(&self) -> &str {
        &self.author
    }

    fn template_path(&self) -> &str {
        &self.template_path
    }

    fn scratch_dir(&self) -> &str {
        &self.scratch_dir
    }

    fn report_name(&self) -> &str {
        &self.report_name
    }

    fn convert_to_pdf(&self) -> bool {
        self.convert_to_pdf
    }

    fn step_timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

#[cfg(feature = "lambda")]
impl crate::utils::validation::Validate for LambdaConfig {
    fn validate(&self) -> Result<()> {
        use crate::utils::validation::*;

        validate_path("template_path", &self.template_path)?;
        validate_file_extension("template_path", &self.template_path, "odt")?;
        validate_non_empty_string("spreadsheet_id", &self.spreadsheet_id)?;
        validate_non_empty_string("s3_bucket", &self.s3_bucket)?;
        validate_non_empty_string("s3_region", &self.s3_region)?;
        validate_range("timeout_secs", self.timeout_secs, 1, 3600)?;

        if let Some(url) = &self.libreoffice_archive_url {
            validate_url("libreoffice_archive_url", url)?;
        }

        Ok(())
    }
}
