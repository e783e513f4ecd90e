//! HTTP client for the license management API.

pub mod client;
pub mod config;

pub use client::LicenseApiClient;
pub use config::ApiConfig;
