mod certificate;
mod domain;
mod email;
mod feed;
mod hash;
mod ip;
mod latency;
mod news;

pub use certificate::*;
pub use domain::*;
pub use email::*;
pub use feed::*;
pub use hash::*;
pub use ip::*;
pub use latency::*;
pub use news::*;

/// Placeholder rendered for text fields no provider could supply
pub const UNKNOWN: &str = "Unknown";

/// Returns the value unless it is blank
pub(crate) fn known(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
