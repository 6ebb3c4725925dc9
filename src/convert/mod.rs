use crate::domain::ports::Converter;
use crate::utils::error::{ReportError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Location of the soffice binary inside the extracted archive.
pub const SOFFICE_RELATIVE_PATH: &str = "instdir/program/soffice";

/// On-demand provisioning of a headless LibreOffice install.
///
/// Serverless instances start without the binary; the installer downloads a
/// prepared tar.gz once per instance and reuses the extracted tree afterwards.
#[derive(Debug, Clone)]
pub struct LibreOfficeInstaller {
    archive_url: String,
    setup_dir: PathBuf,
    client: reqwest::Client,
}

impl LibreOfficeInstaller {
    pub fn new(archive_url: impl Into<String>, setup_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_url: archive_url.into(),
            setup_dir: setup_dir.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn executable_path(&self) -> PathBuf {
        self.setup_dir.join(SOFFICE_RELATIVE_PATH)
    }

    pub async fn ensure_installed(&self) -> Result<PathBuf> {
        let exe = self.executable_path();
        if exe.exists() {
            tracing::debug!("LibreOffice already installed at {}", exe.display());
            return Ok(exe);
        }

        tracing::info!("Downloading LibreOffice from {}", self.archive_url);
        let response = self
            .client
            .get(&self.archive_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                ReportError::conversion(format!(
                    "Could not download LibreOffice from {}: {}",
                    self.archive_url, e
                ))
            })?;
        let bytes = response.bytes().await.map_err(|e| {
            ReportError::conversion(format!("LibreOffice download interrupted: {}", e))
        })?;

        tokio::fs::create_dir_all(&self.setup_dir).await?;
        let archive_path = self.setup_dir.join("lo.tar.gz");
        tokio::fs::write(&archive_path, &bytes).await?;

        let status = Command::new("tar")
            .arg("-xf")
            .arg(&archive_path)
            .arg("-C")
            .arg(&self.setup_dir)
            .status()
            .await
            .map_err(|e| ReportError::conversion(format!("Failed to run tar: {}", e)))?;
        if !status.success() {
            return Err(ReportError::conversion(format!(
                "tar exited with {} while extracting {}",
                status,
                archive_path.display()
            )));
        }

        if !exe.exists() {
            return Err(ReportError::conversion(format!(
                "Archive did not contain {}",
                SOFFICE_RELATIVE_PATH
            )));
        }
        tracing::info!("LibreOffice extracted to {}", self.setup_dir.display());
        Ok(exe)
    }
}

/// Converts a rendered document to PDF by shelling out to soffice.
pub struct SofficeConverter {
    exe_path: PathBuf,
    installer: Option<LibreOfficeInstaller>,
    timeout: Duration,
}

impl SofficeConverter {
    pub fn new(exe_path: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            exe_path: exe_path.into(),
            installer: None,
            timeout,
        }
    }

    pub fn with_installer(mut self, installer: LibreOfficeInstaller) -> Self {
        self.installer = Some(installer);
        self
    }

    async fn ensure_executable(&self) -> Result<PathBuf> {
        if self.exe_path.exists() {
            return Ok(self.exe_path.clone());
        }
        match &self.installer {
            Some(installer) => installer.ensure_installed().await,
            None => Err(ReportError::conversion(format!(
                "Converter executable not found at {}",
                self.exe_path.display()
            ))),
        }
    }
}

#[async_trait]
impl Converter for SofficeConverter {
    async fn convert(&self, input: &Path) -> Result<PathBuf> {
        let exe = self.ensure_executable().await?;
        let out_dir = input.parent().unwrap_or_else(|| Path::new("."));
        let output = input.with_extension("pdf");

        tracing::info!("Converting {} to PDF", input.display());
        let mut cmd = Command::new(&exe);
        cmd.args([
            "--headless",
            "--invisible",
            "--nodefault",
            "--nofirststartwizard",
            "--nolockcheck",
            "--nologo",
            "--norestore",
            "--convert-to",
            "pdf",
            "--outdir",
        ])
        .arg(out_dir)
        .arg(input);
        // A hung soffice must not outlive the run: when the timeout drops the
        // output future, the child is killed instead of being orphaned.
        cmd.kill_on_drop(true);

        let result = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| ReportError::Timeout {
                stage: "conversion",
                seconds: self.timeout.as_secs(),
            })?
            .map_err(|e| ReportError::conversion(format!("Failed to spawn soffice: {}", e)))?;

        if !result.status.success() {
            return Err(ReportError::conversion(format!(
                "soffice exited with {}: {}",
                result.status,
                String::from_utf8_lossy(&result.stderr).trim()
            )));
        }

        if !output.exists() {
            return Err(ReportError::conversion(format!(
                "soffice reported success but {} was not created",
                output.display()
            )));
        }

        tracing::info!("Converted {} to {}", input.display(), output.display());
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[cfg(unix)]
    fn write_fake_soffice(dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        // Copies the input next to itself with a .pdf extension, like a
        // successful soffice --convert-to pdf run.
        let script = r#"#!/bin/sh
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "--outdir" ]; then out="$a"; fi
  prev="$a"
  last="$a"
done
base=$(basename "$last")
cp "$last" "$out/${base%.odt}.pdf"
"#;
        let path = dir.join("soffice");
        std::fs::write(&path, script).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_convert_produces_sibling_pdf() {
        let dir = TempDir::new().unwrap();
        let exe = write_fake_soffice(dir.path());
        let input = dir.path().join("report.odt");
        std::fs::write(&input, b"odt bytes").unwrap();

        let converter = SofficeConverter::new(exe, Duration::from_secs(10));
        let output = converter.convert(&input).await.unwrap();

        assert_eq!(output, dir.path().join("report.pdf"));
        assert!(output.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_conversion_kills_child_and_leaves_no_pdf() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        // Hangs past the converter timeout, then writes the PDF. A killed
        // child never reaches the cp.
        let script = r#"#!/bin/sh
sleep 1
out=""
prev=""
for a in "$@"; do
  if [ "$prev" = "--outdir" ]; then out="$a"; fi
  prev="$a"
  last="$a"
done
base=$(basename "$last")
cp "$last" "$out/${base%.odt}.pdf"
"#;
        let exe = dir.path().join("soffice");
        std::fs::write(&exe, script).unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let input = dir.path().join("report.odt");
        std::fs::write(&input, b"odt bytes").unwrap();

        let converter = SofficeConverter::new(exe, Duration::from_millis(50));
        let err = converter.convert(&input).await.unwrap_err();

        assert!(matches!(
            err,
            ReportError::Timeout {
                stage: "conversion",
                ..
            }
        ));

        // Give an orphaned child time to finish its sleep; the PDF must
        // still not appear.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("report.pdf").exists());
    }

    #[tokio::test]
    async fn test_missing_executable_without_installer_fails() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("report.odt");
        std::fs::write(&input, b"odt bytes").unwrap();

        let converter =
            SofficeConverter::new(dir.path().join("no-such-soffice"), Duration::from_secs(10));
        let err = converter.convert(&input).await.unwrap_err();

        assert!(matches!(err, ReportError::Conversion { .. }));
        assert!(!dir.path().join("report.pdf").exists());
    }

    #[tokio::test]
    async fn test_installer_reuses_existing_install() {
        let dir = TempDir::new().unwrap();
        let exe = dir.path().join(SOFFICE_RELATIVE_PATH);
        std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
        std::fs::write(&exe, b"").unwrap();

        // The URL is unreachable; an install that is already present must not
        // trigger a download.
        let installer = LibreOfficeInstaller::new("http://127.0.0.1:1/lo.tar.gz", dir.path());
        let resolved = installer.ensure_installed().await.unwrap();

        assert_eq!(resolved, exe);
    }

    #[tokio::test]
    async fn test_failed_provisioning_is_conversion_error() {
        use httpmock::prelude::*;

        let server = MockServer::start();
        let archive_mock = server.mock(|when, then| {
            when.method(GET).path("/lo.tar.gz");
            then.status(500);
        });

        let dir = TempDir::new().unwrap();
        let setup_dir = dir.path().join("lo");
        let input = dir.path().join("report.odt");
        std::fs::write(&input, b"odt bytes").unwrap();

        let installer = LibreOfficeInstaller::new(server.url("/lo.tar.gz"), &setup_dir);
        let converter = SofficeConverter::new(
            setup_dir.join(SOFFICE_RELATIVE_PATH),
            Duration::from_secs(10),
        )
        .with_installer(installer);

        let err = converter.convert(&input).await.unwrap_err();

        archive_mock.assert();
        assert!(matches!(err, ReportError::Conversion { .. }));
        assert!(!dir.path().join("report.pdf").exists());
    }
}
