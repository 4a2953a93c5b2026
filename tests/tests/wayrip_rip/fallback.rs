use rstest::*;
use tempfile::TempDir;
use wayrip_test_utils::ArchiveServer;

use crate::common::{TS, ripper_against, snapshot_url};

const PAGE: &str = "http://example.com/site/index.html";
const LATE_TS: &str = "20060115000000";

#[rstest]
#[tokio::test]
async fn asset_missing_at_page_timestamp_comes_from_the_nearest_capture() {
    // The image was only captured two weeks after the page.
    let server = ArchiveServer::builder()
        .snapshot(TS, PAGE, r#"<img src="logo.png">"#)
        .snapshot(LATE_TS, "http://example.com/site/logo.png", "late logo")
        .captures("http://example.com/site/logo.png", &[LATE_TS])
        .start()
        .await;
    let dir = TempDir::new().unwrap();

    let report = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 1);
    assert!(report.failed.is_empty());
    assert_eq!(
        std::fs::read(dir.path().join("logo.png")).unwrap(),
        b"late logo"
    );
    assert_eq!(server.request_count("/cdx"), 1);
}

#[rstest]
#[tokio::test]
async fn nearest_capture_wins_over_farther_ones() {
    let server = ArchiveServer::builder()
        .snapshot(TS, PAGE, r#"<img src="logo.png">"#)
        .snapshot("20060102000000", "http://example.com/site/logo.png", "near")
        .snapshot("20120101000000", "http://example.com/site/logo.png", "far")
        .captures(
            "http://example.com/site/logo.png",
            &["20060102000000", "20120101000000"],
        )
        .start()
        .await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(std::fs::read(dir.path().join("logo.png")).unwrap(), b"near");
}

#[rstest]
#[tokio::test]
async fn index_is_asked_only_once_per_asset() {
    let server = ArchiveServer::builder()
        .snapshot(TS, PAGE, r#"<img src="a.png"><img src="b.png">"#)
        .snapshot(LATE_TS, "http://example.com/site/a.png", "a")
        .captures("http://example.com/site/a.png", &[LATE_TS])
        .start()
        .await;
    let dir = TempDir::new().unwrap();

    let report = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    // a.png resolves through the index, b.png has no captures at all.
    assert_eq!(report.fetched, 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(server.request_count("/cdx"), 2);
}
