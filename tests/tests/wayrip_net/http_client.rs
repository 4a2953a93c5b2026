use rstest::*;
use url::Url;
use wayrip_archive::raw_url_with_base;
use wayrip_net::{HttpClient, Net, NetError, NetOptions};
use wayrip_test_utils::ArchiveServer;

use crate::common::TS;

fn original(path: &str) -> Url {
    Url::parse(&format!("http://example.com/{path}")).unwrap()
}

#[rstest]
#[tokio::test]
async fn fetches_a_snapshot_body() {
    let server = ArchiveServer::builder()
        .snapshot(TS, "http://example.com/a.txt", "archived text")
        .start()
        .await;
    let client = HttpClient::new(NetOptions::default()).unwrap();

    let url = raw_url_with_base(&server.archive_base(), TS.parse().unwrap(), &original("a.txt"));
    let body = client.get_bytes(url).await.unwrap();

    assert_eq!(body.as_ref(), b"archived text");
}

#[rstest]
#[tokio::test]
async fn missing_snapshot_maps_to_not_found() {
    let server = ArchiveServer::builder().start().await;
    let client = HttpClient::new(NetOptions::default()).unwrap();

    let url = raw_url_with_base(&server.archive_base(), TS.parse().unwrap(), &original("gone"));
    let err = client.get_bytes(url).await.unwrap_err();

    assert!(matches!(err, NetError::HttpStatus { status: 404, .. }));
    assert!(err.is_not_found());
    assert!(!err.is_retryable());
}

#[rstest]
#[tokio::test]
async fn unreachable_host_is_a_transport_error() {
    let client = HttpClient::new(NetOptions::default()).unwrap();

    // Reserved port on localhost with nothing listening.
    let url = Url::parse("http://127.0.0.1:1/a.txt").unwrap();
    let err = client.get_bytes(url).await.unwrap_err();

    assert!(matches!(err, NetError::Http(_) | NetError::Timeout));
    assert!(!err.is_not_found());
}
