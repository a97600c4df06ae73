//! HTTP source adapters for netwatch.
//!
//! Every third-party provider lives in [`providers`] as a small type that
//! implements [`netwatch_core::SourceAdapter`]. They share one
//! [`HttpTransport`] which owns the connection pool and classifies transport
//! failures, and they are configured through [`ProviderConfig`].

mod config;
mod transport;
pub mod providers;

pub use config::*;
pub use transport::HttpTransport;
pub use netwatch_core::{SourceError, SourceResult};
