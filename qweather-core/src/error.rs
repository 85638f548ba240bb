use thiserror::Error;

/// Error taxonomy for the client.
///
/// `Transport` covers connection failures and timeouts and is the only kind
/// a caller may reasonably retry. `Service` and `Parse` indicate the request
/// itself (or our understanding of the response) is wrong; nothing here is
/// retried internally.
#[derive(Debug, Error)]
pub enum Error {
    /// The private key could not be parsed, or signing failed.
    #[error("credential error: {0}")]
    Credential(#[from] jsonwebtoken::errors::Error),

    /// Network-level failure, including the request timeout.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered, but reported a non-success status code.
    #[error("service error (code {code}): {message}")]
    Service { code: String, message: String },

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Parse(String),

    /// A lookup completed successfully but matched nothing.
    #[error("no location matched '{0}'")]
    NotFound(String),
}
