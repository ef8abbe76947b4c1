//! NAV provider errors.

use fintrack_shared::AppError;
use thiserror::Error;

/// Errors returned by NAV providers.
#[derive(Debug, Error)]
pub enum NavError {
    /// The provider does not know the code.
    #[error("Scheme code not found: {0}")]
    NotFound(String),

    /// The provider knows the code but returned no price.
    #[error("No NAV data available for {0}")]
    NoData(String),

    /// The provider throttled the request.
    #[error("API rate limit exceeded")]
    RateLimited,

    /// The provider reported an error in its payload.
    #[error("Provider error: {0}")]
    Api(String),

    /// Non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Status {
        /// Status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// Transport failure, including timeouts.
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The payload could not be understood.
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// The selected provider needs an API key and the ledger has none.
    #[error("An API key is required for the {0} NAV service")]
    MissingApiKey(&'static str),
}

impl NavError {
    /// Returns the error code for API responses.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NAV_NOT_FOUND",
            Self::NoData(_) => "NAV_NO_DATA",
            Self::RateLimited => "NAV_RATE_LIMITED",
            Self::Api(_) => "NAV_PROVIDER_ERROR",
            Self::Status { .. } => "NAV_HTTP_STATUS",
            Self::Http(_) => "NAV_REQUEST_FAILED",
            Self::InvalidPayload(_) => "NAV_INVALID_PAYLOAD",
            Self::MissingApiKey(_) => "NAV_MISSING_API_KEY",
        }
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimited => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }
}

impl From<NavError> for AppError {
    fn from(err: NavError) -> Self {
        match err {
            NavError::NotFound(_) => Self::NotFound(err.to_string()),
            NavError::MissingApiKey(_) => Self::Validation(err.to_string()),
            _ => Self::ExternalService(err.to_string()),
        }
    }
}
