use thiserror::Error;

/// Errors from [`crate::routing::RoutingProvider`] calls.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider could not be reached.
    #[error("network error contacting routing service: {message}")]
    Network {
        /// Description of the failure.
        message: String,
    },
    /// The request did not complete in time.
    #[error("routing request timed out: {message}")]
    Timeout {
        /// Description of the failure.
        message: String,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("routing service returned HTTP {status}: {message}")]
    HttpError {
        /// HTTP status code.
        status: u16,
        /// Description of the failure.
        message: String,
    },
    /// The provider reported an application-level error.
    #[error("routing service error {code}: {message}")]
    ServiceError {
        /// Provider-specific error code.
        code: u32,
        /// Provider message.
        message: String,
    },
    /// No road path connects the two points.
    #[error("no route found between the requested points")]
    RouteNotFound,
    /// The request exceeded the provider's supported route length.
    #[error("requested route exceeds the provider's length limit")]
    RouteTooLong,
    /// The provider's answer could not be decoded.
    #[error("failed to parse routing response: {message}")]
    ParseError {
        /// Description of the failure.
        message: String,
    },
}

impl ProviderError {
    /// Returns `true` when no road path connects the points.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(self, Self::RouteNotFound)
    }

    /// Returns `true` when the provider refused a request as too long.
    #[must_use]
    pub const fn is_too_long(&self) -> bool {
        matches!(self, Self::RouteTooLong)
    }
}
