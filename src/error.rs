use thiserror::Error;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// A single vendor call that did not produce a usable value.
///
/// Every variant carries the provider name so that log lines and aggregate
/// failures can be attributed without extra context. The type is `Clone`
/// because one failure is delivered to every coalesced caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("{provider}: HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("{provider}: rate limited by upstream")]
    RateLimited { provider: &'static str },

    #[error("{provider}: request timed out after {timeout_ms}ms")]
    Timeout {
        provider: &'static str,
        timeout_ms: u64,
    },

    #[error("{provider}: transport error: {message}")]
    Transport {
        provider: &'static str,
        message: String,
    },

    #[error("{provider}: malformed response: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },

    #[error("{provider}: no data for {what}")]
    NoData {
        provider: &'static str,
        what: String,
    },
}

impl ProviderError {
    /// Name of the provider that produced this error.
    #[must_use]
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Status { provider, .. }
            | Self::RateLimited { provider }
            | Self::Timeout { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Malformed { provider, .. }
            | Self::NoData { provider, .. } => provider,
        }
    }

    /// Construct a `Malformed` error from anything displayable.
    pub fn malformed(provider: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            provider,
            reason: reason.to_string(),
        }
    }

    /// Construct a `NoData` error.
    pub fn no_data(provider: &'static str, what: impl Into<String>) -> Self {
        Self::NoData {
            provider,
            what: what.into(),
        }
    }
}

/// Outcome of a shared fetch as seen by every caller that joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(
        "all providers failed: primary {} ({primary}); fallback {} ({fallback})",
        primary.provider(),
        fallback.provider()
    )]
    AllProvidersFailed {
        primary: ProviderError,
        fallback: ProviderError,
    },

    #[error("computation failed: {0}")]
    Compute(String),

    #[error("in-flight operation aborted: {0}")]
    Aborted(String),
}

/// Cache tier failures. These never reach gateway callers; stores log and
/// swallow them, degrading to a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("remote cache request failed: {0}")]
    Remote(#[from] reqwest::Error),

    #[error("remote cache returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cache payload encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("invalid remote cache URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ProviderError> for Error {
    fn from(err: ProviderError) -> Self {
        Error::Fetch(FetchError::Provider(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregate_failure_names_both_providers_and_messages() {
        let err = FetchError::AllProvidersFailed {
            primary: ProviderError::Status {
                provider: "polygon",
                status: 503,
                body: "service unavailable".into(),
            },
            fallback: ProviderError::Timeout {
                provider: "yahoo",
                timeout_ms: 5000,
            },
        };

        let message = err.to_string();
        assert!(message.contains("polygon"));
        assert!(message.contains("service unavailable"));
        assert!(message.contains("yahoo"));
        assert!(message.contains("timed out after 5000ms"));
    }

    #[test]
    fn provider_error_reports_its_provider() {
        let err = ProviderError::malformed("yahoo", "missing optionChain");
        assert_eq!(err.provider(), "yahoo");
        assert!(err.to_string().contains("missing optionChain"));
    }
}
