use std::{path::Path, sync::Arc};

use wayrip_net::HttpClient;
use wayrip_rip::{RipOptions, Ripper};
use wayrip_test_utils::ArchiveServer;

/// Timestamp most fixtures capture their snapshots at.
pub(crate) const TS: &str = "20060101000000";

/// A snapshot URL in the canonical form users paste in. Fetches themselves
/// are redirected at the fixture by overriding the archive base.
pub(crate) fn snapshot_url(original: &str) -> String {
    format!("https://web.archive.org/web/{TS}/{original}")
}

pub(crate) fn options_against(server: &ArchiveServer, output_dir: &Path) -> RipOptions {
    let mut options = RipOptions::default().with_output_dir(output_dir);
    options.archive_base = server.archive_base();
    options.cdx_endpoint = Some(server.cdx_endpoint());
    options
}

/// Ripper wired to a real HTTP client pointed at the fixture.
pub(crate) fn ripper_against(server: &ArchiveServer, output_dir: &Path) -> Ripper<HttpClient> {
    let options = options_against(server, output_dir);
    let client = HttpClient::new(options.net.clone()).unwrap();
    Ripper::new(Arc::new(client), options)
}
