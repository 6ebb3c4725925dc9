use crate::domain::ports::SheetSource;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use google_sheets4::hyper::client::HttpConnector;
use google_sheets4::hyper_rustls::HttpsConnector;
use google_sheets4::{hyper, hyper_rustls, oauth2, Sheets};

/// Fetches one fixed cell range from a Google Sheet using service-account
/// credentials.
pub struct GoogleSheetReader {
    hub: Sheets<HttpsConnector<HttpConnector>>,
    spreadsheet_id: String,
    range: String,
}

impl GoogleSheetReader {
    pub async fn connect(
        credentials_path: &str,
        spreadsheet_id: impl Into<String>,
        range: impl Into<String>,
    ) -> Result<Self> {
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
            hub: Sheets::new(client, auth),
            spreadsheet_id: spreadsheet_id.into(),
            range: range.into(),
        })
    }
}

#[async_trait]
impl SheetSource for GoogleSheetReader {
    async fn fetch_range(&self) -> Result<Vec<Vec<String>>> {
        tracing::debug!(
            "Fetching range {} from spreadsheet {}",
            self.range,
            self.spreadsheet_id
        );
        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, &self.range)
            .doit()
            .await
            .map_err(|e| ReportError::sheet(e.to_string()))?;

        let values = value_range.values.unwrap_or_default();
        Ok(values
            .iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }
}

fn cell_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_to_string_unwraps_json_values() {
        assert_eq!(cell_to_string(&serde_json::json!("Apples")), "Apples");
        assert_eq!(cell_to_string(&serde_json::json!(10)), "10");
        assert_eq!(cell_to_string(&serde_json::json!(true)), "true");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }
}
