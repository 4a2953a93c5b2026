use rstest::*;
use tempfile::TempDir;
use wayrip_test_utils::ArchiveServer;

use crate::common::{TS, ripper_against, snapshot_url};

const PAGE: &str = "http://example.com/games/index.html";

/// A small site: a page with toolbar chrome, one stylesheet pulling in an
/// image, a script, and an image.
async fn small_site() -> ArchiveServer {
    ArchiveServer::builder()
        .snapshot(
            TS,
            PAGE,
            concat!(
                "<html><head>\n",
                "<!-- BEGIN WAYBACK TOOLBAR INSERT -->\n",
                r#"<script src="https://web-static.archive.org/_static/js/bundle.js"></script>"#,
                "\n<script>window.__wm = {}; wombat.init();</script>\n",
                r#"<link rel="stylesheet" href="css/style.css">"#,
                "\n",
                r#"<script src="js/game.js"></script>"#,
                "\n</head><body>\n",
                r#"<div id="wm-ipp-base">archive toolbar</div>"#,
                "\n",
                r#"<img src="img/logo.png">"#,
                "\n",
                r#"<a href="other/page.html">next page</a>"#,
                "\n</body></html>",
            ),
        )
        .snapshot(
            TS,
            "http://example.com/games/css/style.css",
            "body { background: url(../img/bg.png); }",
        )
        .snapshot(TS, "http://example.com/games/js/game.js", "var g = 1;")
        .snapshot(TS, "http://example.com/games/img/logo.png", "logo bytes")
        .snapshot(TS, "http://example.com/games/img/bg.png", "bg bytes")
        .start()
        .await
}

#[rstest]
#[tokio::test]
async fn downloads_the_full_asset_closure() {
    let server = small_site().await;
    let dir = TempDir::new().unwrap();

    let report = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 4);
    assert!(report.failed.is_empty());
    for file in ["index.html", "style.css", "game.js", "logo.png", "bg.png"] {
        assert!(dir.path().join(file).exists(), "{file} missing");
    }
}

#[rstest]
#[tokio::test]
async fn page_is_rewritten_to_flat_local_names() {
    let server = small_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    let page = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(page.contains(r#"href="style.css""#));
    assert!(page.contains(r#"src="game.js""#));
    assert!(page.contains(r#"src="logo.png""#));

    let css = std::fs::read_to_string(dir.path().join("style.css")).unwrap();
    assert!(css.contains("url(bg.png)"));
}

#[rstest]
#[tokio::test]
async fn archive_chrome_is_stripped() {
    let server = small_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    let page = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(!page.contains("wm-ipp"));
    assert!(!page.contains("web-static.archive.org"));
    assert!(!page.contains("wombat"));
    assert!(!page.contains("WAYBACK TOOLBAR"));
    // No request ever went out for the injected archive script.
    assert_eq!(server.request_count("_static"), 0);
}

#[rstest]
#[tokio::test]
async fn navigation_links_point_at_the_original_site() {
    let server = small_site().await;
    let dir = TempDir::new().unwrap();

    ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    let page = std::fs::read_to_string(dir.path().join("index.html")).unwrap();
    assert!(page.contains(r#"href="http://example.com/games/other/page.html""#));
}

#[rstest]
#[tokio::test]
async fn shared_asset_is_stored_once() {
    let server = ArchiveServer::builder()
        .snapshot(
            TS,
            PAGE,
            concat!(
                r#"<link rel="stylesheet" href="a.css">"#,
                r#"<link rel="stylesheet" href="b.css">"#,
            ),
        )
        .snapshot(
            TS,
            "http://example.com/games/a.css",
            "h1 { background: url(shared.png); }",
        )
        .snapshot(
            TS,
            "http://example.com/games/b.css",
            "h2 { background: url(shared.png); }",
        )
        .snapshot(TS, "http://example.com/games/shared.png", "shared bytes")
        .start()
        .await;
    let dir = TempDir::new().unwrap();

    let report = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 3);
    assert_eq!(server.request_count("shared.png"), 1);
    for css in ["a.css", "b.css"] {
        let body = std::fs::read_to_string(dir.path().join(css)).unwrap();
        assert!(body.contains("url(shared.png)"));
    }
}

#[rstest]
#[tokio::test]
async fn failed_assets_are_reported_not_fatal() {
    let server = ArchiveServer::builder()
        .snapshot(TS, PAGE, r#"<img src="present.png"><img src="absent.png">"#)
        .snapshot(TS, "http://example.com/games/present.png", "bytes")
        .start()
        .await;
    let dir = TempDir::new().unwrap();

    let report = ripper_against(&server, dir.path())
        .rip(&snapshot_url(PAGE))
        .await
        .unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.failed.len(), 1);
    assert!(
        report.failed[0]
            .url
            .as_str()
            .ends_with("absent.png")
    );
    assert!(dir.path().join("present.png").exists());
}
