//! End-to-end runs of the CLI library against the `file` backends.

use appcast::AppError;
use appcast::cli::{Cli, RSA_KEY_ENV};
use appcast_core::CancellationToken;
use appcast_pipe::PipeError;
use clap::Parser;
use std::path::Path;
use tempfile::TempDir;

const KEY: &str = include_str!("../../pipe/tests/fixtures/rsa_pkcs1.pem");

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new(apk: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let releases = dir.path().join("releases");
        let public = dir.path().join("public");
        std::fs::create_dir(&releases).unwrap();
        std::fs::write(releases.join("app-x86_64.apk"), b"apk-bytes").unwrap();
        std::fs::write(dir.path().join("key.pem"), KEY).unwrap();

        let config = format!(
            "version: latest\nsource:\n  type: file\n  path: '{}'\n  version: v2.0.0\ntarget:\n  type: file\n  path: '{}'\n{apk}",
            releases.display(),
            public.display()
        );
        std::fs::write(dir.path().join("appcast.yml"), config).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> String {
        self.dir.path().join(name).display().to_string()
    }

    fn cli(&self, args: &[&str]) -> Cli {
        let config = self.path("appcast.yml");
        let mut argv = vec!["appcast", "-c", config.as_str()];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }
}

#[tokio::test]
async fn check_prints_assembled_pipe() {
    let ws = Workspace::new("apk:\n  key-name: ops@example.com.rsa.pub\n");
    let key = ws.path("key.pem");
    let cli = ws.cli(&["check", "--rsa-key", &key]);

    let out = appcast::run(&cli, &CancellationToken::new()).await.unwrap();

    assert!(out.starts_with("apk:\n"));
    assert!(out.contains(&ws.root().join("public").join("apk").display().to_string()));
    assert!(out.contains("version:    latest"));
    assert!(out.contains("key-name:   ops@example.com.rsa.pub"));
}

#[tokio::test]
async fn check_reads_key_from_environment() {
    let ws = Workspace::new("apk:\n  key-name: k\n");
    let cli = ws.cli(&["check"]);

    temp_env::async_with_vars([(RSA_KEY_ENV, Some(KEY))], async {
        let out = appcast::run(&cli, &CancellationToken::new()).await.unwrap();
        assert!(out.contains("key-name:   k"));
    })
    .await;
}

#[tokio::test]
async fn check_without_key_reports_missing_secret() {
    let ws = Workspace::new("apk:\n  key-name: k\n");
    let cli = ws.cli(&["check"]);

    temp_env::async_with_vars([(RSA_KEY_ENV, None::<&str>)], async {
        let err = appcast::run(&cli, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::Pipe(PipeError::MissingSecret { .. })
        ));
    })
    .await;
}

#[tokio::test]
async fn check_with_disabled_integration() {
    let ws = Workspace::new("apk:\n  disabled: true\n");
    let cli = ws.cli(&["check"]);

    let out = appcast::run(&cli, &CancellationToken::new()).await.unwrap();
    assert_eq!(out, "No integrations enabled\n");
}

#[tokio::test]
async fn releases_lists_source() {
    let ws = Workspace::new("");
    let cli = ws.cli(&["releases"]);

    let out = appcast::run(&cli, &CancellationToken::new()).await.unwrap();
    let lines: Vec<_> = out.lines().collect();
    assert!(lines[0].starts_with("v2.0.0 ("));
    assert_eq!(lines[1], "  app-x86_64.apk 9 bytes");
}

#[tokio::test]
async fn missing_config_file() {
    let ws = Workspace::new("");
    let missing = ws.path("absent.yml");
    let cli = Cli::try_parse_from(["appcast", "check", "-c", missing.as_str()]).unwrap();

    let err = appcast::run(&cli, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ReadConfig { .. }));
}

#[tokio::test]
async fn unreadable_key_file() {
    let ws = Workspace::new("");
    let missing = ws.path("absent.pem");
    let cli = ws.cli(&["check", "--rsa-key", &missing]);

    let err = appcast::run(&cli, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Secret(_)));
}
