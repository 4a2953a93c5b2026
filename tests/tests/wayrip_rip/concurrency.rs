use rstest::*;
use tempfile::TempDir;
use wayrip_net::HttpClient;
use wayrip_rip::{MAX_CONCURRENCY, Ripper};
use wayrip_test_utils::ArchiveServer;

use crate::common::{TS, options_against, snapshot_url};

const PAGE: &str = "http://example.com/big/index.html";

async fn many_asset_site(asset_count: usize) -> ArchiveServer {
    let mut builder = ArchiveServer::builder();

    let mut page = String::new();
    for i in 0..asset_count {
        page.push_str(&format!(r#"<img src="asset{i}.png">"#));
        builder = builder.snapshot(
            TS,
            &format!("http://example.com/big/asset{i}.png"),
            format!("asset {i}"),
        );
    }
    builder.snapshot(TS, PAGE, page).start().await
}

#[rstest]
#[tokio::test]
async fn requested_concurrency_is_capped_at_the_ceiling() {
    let server = many_asset_site(12).await;
    let dir = TempDir::new().unwrap();

    let options = options_against(&server, dir.path()).with_concurrency(64);
    let client = HttpClient::new(options.net.clone()).unwrap();
    let report = Ripper::new(std::sync::Arc::new(client), options)
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 12);
    assert!(
        server.peak_concurrency() <= MAX_CONCURRENCY,
        "saw {} requests in flight",
        server.peak_concurrency()
    );
}

#[rstest]
#[tokio::test]
async fn higher_concurrency_still_downloads_everything() {
    let server = many_asset_site(9).await;
    let dir = TempDir::new().unwrap();

    let options = options_against(&server, dir.path()).with_concurrency(3);
    let client = HttpClient::new(options.net.clone()).unwrap();
    let report = Ripper::new(std::sync::Arc::new(client), options)
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 9);
    assert!(report.failed.is_empty());
    for i in 0..9 {
        assert!(dir.path().join(format!("asset{i}.png")).exists());
    }
}
