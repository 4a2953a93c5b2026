use rstest::*;
use url::Url;
use wayrip_archive::{ArchiveError, CdxClient, Timestamp};
use wayrip_net::{HttpClient, NetOptions};
use wayrip_test_utils::ArchiveServer;

fn client_against(server: &ArchiveServer) -> CdxClient<HttpClient> {
    let http = HttpClient::new(NetOptions::default()).unwrap();
    CdxClient::new(http).with_endpoint(server.cdx_endpoint())
}

fn ts(s: &str) -> Timestamp {
    s.parse().unwrap()
}

#[rstest]
#[tokio::test]
async fn nearest_picks_the_closest_capture() {
    let server = ArchiveServer::builder()
        .captures(
            "http://example.com/logo.png",
            &["19990101000000", "20060103000000", "20150101000000"],
        )
        .start()
        .await;
    let cdx = client_against(&server);

    let original = Url::parse("http://example.com/logo.png").unwrap();
    let nearest = cdx.nearest(&original, ts("20060101000000")).await.unwrap();

    assert_eq!(nearest, ts("20060103000000"));
}

#[rstest]
#[tokio::test]
async fn unknown_url_reports_not_found() {
    let server = ArchiveServer::builder().start().await;
    let cdx = client_against(&server);

    let original = Url::parse("http://example.com/never-archived.png").unwrap();
    let err = cdx.nearest(&original, ts("20060101000000")).await.unwrap_err();

    assert!(matches!(err, ArchiveError::NotFound { .. }));
}

#[rstest]
#[tokio::test]
async fn lookup_returns_all_captures() {
    let server = ArchiveServer::builder()
        .captures("http://example.com/", &["20000101000000", "20010101000000"])
        .start()
        .await;
    let cdx = client_against(&server);

    let original = Url::parse("http://example.com/").unwrap();
    let captures = cdx.lookup(&original).await.unwrap();

    assert_eq!(captures, vec![ts("20000101000000"), ts("20010101000000")]);
}
