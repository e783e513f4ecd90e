//! licdash core
//!
//! License-record model, error taxonomy and the port trait for the remote
//! license source. This crate has minimal dependencies and defines the shared
//! vocabulary used by the engine, the HTTP client and the CLI.

pub mod error;
pub mod ids;
pub mod license;
pub mod ports;
pub mod session;
pub mod timestamp;

mod lenient;

pub use error::{Error, Result};
pub use ids::*;
pub use license::*;
pub use session::Session;
