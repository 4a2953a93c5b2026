//! All integration tests for wayrip
#![expect(
    clippy::unwrap_used,
    reason = "integration test crate — unwraps are acceptable in test code"
)]

mod common;
mod wayrip_archive;
mod wayrip_net;
mod wayrip_rip;
