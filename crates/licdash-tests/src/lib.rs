//! Test infrastructure for licdash.
//!
//! Fixtures for license records, an in-memory [`LicenseSource`] and helpers
//! for mounting the license API on a `wiremock` server.
//!
//! # Usage
//!
//! ```ignore
//! use licdash_tests::{LicenseFixture, MemorySource};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let source = MemorySource::new(LicenseFixture::sample_listing());
//!     // Hand `source` to a view, poller, ...
//! }
//! ```
//!
//! [`LicenseSource`]: licdash_core::ports::LicenseSource

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;

/// Initialize test logging (call once per test binary).
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,licdash=debug")),
        )
        .with_test_writer()
        .try_init();
}
