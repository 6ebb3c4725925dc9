use httpmock::prelude::*;
use report_etl::convert::{LibreOfficeInstaller, SOFFICE_RELATIVE_PATH};
use std::process::Command;
use tempfile::TempDir;

fn build_archive() -> Vec<u8> {
    let build_dir = TempDir::new().unwrap();
    let program_dir = build_dir.path().join("instdir/program");
    std::fs::create_dir_all(&program_dir).unwrap();
    std::fs::write(program_dir.join("soffice"), b"#!/bin/sh\n").unwrap();

    let archive = build_dir.path().join("lo.tar.gz");
    let status = Command::new("tar")
        .arg("-czf")
        .arg(&archive)
        .arg("-C")
        .arg(build_dir.path())
        .arg("instdir")
        .status()
        .unwrap();
    assert!(status.success());
    std::fs::read(&archive).unwrap()
}

#[tokio::test]
async fn test_provisioning_downloads_and_extracts_archive() {
    let archive_bytes = build_archive();

    let server = MockServer::start();
    let archive_mock = server.mock(|when, then| {
        when.method(GET).path("/lo.tar.gz");
        then.status(200)
            .header("Content-Type", "application/gzip")
            .body(archive_bytes);
    });

    let setup_dir = TempDir::new().unwrap();
    let installer = LibreOfficeInstaller::new(server.url("/lo.tar.gz"), setup_dir.path());

    let exe = installer.ensure_installed().await.unwrap();

    archive_mock.assert();
    assert_eq!(exe, setup_dir.path().join(SOFFICE_RELATIVE_PATH));
    assert!(exe.exists());
}

#[tokio::test]
async fn test_existing_install_skips_download() {
    let server = MockServer::start();
    let archive_mock = server.mock(|when, then| {
        when.method(GET).path("/lo.tar.gz");
        then.status(200).body("never fetched");
    });

    let setup_dir = TempDir::new().unwrap();
    let exe = setup_dir.path().join(SOFFICE_RELATIVE_PATH);
    std::fs::create_dir_all(exe.parent().unwrap()).unwrap();
    std::fs::write(&exe, b"#!/bin/sh\n").unwrap();

    let installer = LibreOfficeInstaller::new(server.url("/lo.tar.gz"), setup_dir.path());
    let resolved = installer.ensure_installed().await.unwrap();

    assert_eq!(resolved, exe);
    archive_mock.assert_hits(0);
}

#[tokio::test]
async fn test_corrupt_archive_fails_provisioning() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/lo.tar.gz");
        then.status(200).body("this is not a tar archive");
    });

    let setup_dir = TempDir::new().unwrap();
    let installer = LibreOfficeInstaller::new(server.url("/lo.tar.gz"), setup_dir.path());

    let err = installer.ensure_installed().await.unwrap_err();

    assert!(matches!(err, report_etl::ReportError::Conversion { .. }));
    assert!(!setup_dir.path().join(SOFFICE_RELATIVE_PATH).exists());
}
