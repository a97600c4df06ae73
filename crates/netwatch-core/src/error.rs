use thiserror::Error;

/// Result type alias for lookup operations
pub type Result<T> = std::result::Result<T, IntelError>;

/// Result type alias for a single provider call
pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Classified failure of one provider call.
///
/// Adapters convert every transport or decoding problem into one of these
/// variants; nothing provider-specific escapes to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Network failure, timeout or non-2xx status
    #[error("{provider} unavailable: {reason}")]
    Unavailable {
        /// Provider name
        provider: &'static str,
        /// What went wrong
        reason: String,
    },

    /// Provider explicitly reported that it has no data for the query
    #[error("{provider} has no record for the query")]
    NotFound {
        /// Provider name
        provider: &'static str,
    },

    /// Response did not match the documented shape
    #[error("{provider} returned a malformed response: {reason}")]
    Malformed {
        /// Provider name
        provider: &'static str,
        /// Decoding problem
        reason: String,
    },

    /// Provider requires credentials that were not configured
    #[error("{provider} is not configured")]
    NotConfigured {
        /// Provider name
        provider: &'static str,
    },
}

impl SourceError {
    /// Build an [`SourceError::Unavailable`]
    pub fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            provider,
            reason: reason.into(),
        }
    }

    /// Build a [`SourceError::Malformed`]
    pub fn malformed(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            provider,
            reason: reason.into(),
        }
    }

    /// Name of the provider that failed
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        match self {
            Self::Unavailable { provider, .. }
            | Self::NotFound { provider }
            | Self::Malformed { provider, .. }
            | Self::NotConfigured { provider } => provider,
        }
    }

    /// Free-text cause for outages and malformed responses
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unavailable { reason, .. } | Self::Malformed { reason, .. } => Some(reason),
            Self::NotFound { .. } | Self::NotConfigured { .. } => None,
        }
    }

    /// Returns true if the provider answered with an explicit "no data"
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if the next provider in a chain should be tried.
    ///
    /// Malformed responses are handled exactly like outages.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Malformed { .. })
    }
}

/// Errors surfaced by the lookup layer
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntelError {
    /// Caller supplied an unusable query
    #[error("{0}")]
    InvalidInput(String),

    /// Every provider in the chain failed
    #[error("all sources failed{}", .last.as_ref().map(|e| format!(": {e}")).unwrap_or_default())]
    AllSourcesFailed {
        /// Failure reported by the last provider tried
        last: Option<SourceError>,
    },

    /// A single required provider failed
    #[error(transparent)]
    Source(#[from] SourceError),

    /// Lookup services could not be constructed
    #[error("configuration error: {0}")]
    Config(String),
}

impl IntelError {
    /// Build an [`IntelError::InvalidInput`]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Returns true if the error was caused by the caller
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }
}
