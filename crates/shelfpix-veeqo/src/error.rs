use thiserror::Error;

/// Errors returned by the Veeqo API client.
#[derive(Debug, Error)]
pub enum VeeqoError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API responded with a non-2xx status (auth rejection included).
    #[error("unexpected HTTP status {status} from Veeqo")]
    UnexpectedStatus { status: u16 },

    /// The configured base URL could not be parsed.
    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
