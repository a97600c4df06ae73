//! Core types and traits for the netwatch threat-intelligence backend.
//!
//! This crate provides the foundational pieces shared by every netwatch crate:
//!
//! - **Types**: normalized records for each lookup domain (IP, domain, hash,
//!   feed item) plus the partial fragments individual providers produce
//! - **Sources**: the [`SourceAdapter`] contract every provider implements
//! - **Errors**: the [`SourceError`] classification and [`IntelError`]
//! - **Scoring**: reputation, email risk and domain-age derivation
//!
//! # Example
//!
//! ```rust,ignore
//! use netwatch_core::{score, FeedItem, ThreatLevel};
//!
//! fn assess(matches: &[FeedItem]) {
//!     let (score, level) = score::domain_reputation(matches);
//!     println!("{score} {level:?}");
//! }
//! ```

mod error;
pub mod score;
pub mod source;
pub mod time;
pub mod types;

pub use error::{IntelError, Result, SourceError, SourceResult};
pub use source::*;
pub use types::*;
