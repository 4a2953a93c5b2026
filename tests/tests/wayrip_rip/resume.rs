use rstest::*;
use tempfile::TempDir;
use wayrip_rip::LEDGER_FILE;
use wayrip_test_utils::ArchiveServer;

use crate::common::{TS, options_against, ripper_against, snapshot_url};

const PAGE: &str = "http://example.com/site/index.html";

async fn two_asset_site() -> ArchiveServer {
    ArchiveServer::builder()
        .snapshot(
            TS,
            PAGE,
            r#"<link rel="stylesheet" href="style.css"><img src="logo.png">"#,
        )
        .snapshot(TS, "http://example.com/site/style.css", "body {}")
        .snapshot(TS, "http://example.com/site/logo.png", "logo")
        .start()
        .await
}

#[rstest]
#[tokio::test]
async fn second_run_refetches_only_the_page() {
    let server = two_asset_site().await;
    let dir = TempDir::new().unwrap();

    let first = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();
    assert_eq!(first.fetched, 2);
    let after_first = server.total_requests();

    let second = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();
    assert_eq!(second.fetched, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(server.total_requests(), after_first + 1);
}

#[rstest]
#[tokio::test]
async fn ledger_lists_every_downloaded_asset_with_its_hash() {
    let server = two_asset_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    let ledger = std::fs::read_to_string(dir.path().join(LEDGER_FILE)).unwrap();
    let lines: Vec<&str> = ledger.lines().collect();
    assert_eq!(lines.len(), 2);
    for line in lines {
        let (hash, path) = line.split_once('\t').unwrap();
        assert_eq!(hash.len(), 64);
        assert!(path == "style.css" || path == "logo.png");
    }
}

#[rstest]
#[tokio::test]
async fn reset_forgets_previous_downloads() {
    let server = two_asset_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    let options = options_against(&server, dir.path()).with_reset(true);
    let client = wayrip_net::HttpClient::new(options.net.clone()).unwrap();
    let report = wayrip_rip::Ripper::new(std::sync::Arc::new(client), options)
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 2);
    assert_eq!(report.skipped, 0);
}

#[rstest]
#[tokio::test]
async fn deleted_output_file_is_refetched_after_reset_only() {
    let server = two_asset_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();
    std::fs::remove_file(dir.path().join("logo.png")).unwrap();

    // The ledger still lists it, so a plain re-run trusts it.
    let rerun = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();
    assert_eq!(rerun.skipped, 2);
    assert!(!dir.path().join("logo.png").exists());
}
