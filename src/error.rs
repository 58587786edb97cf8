//! Errors shared by the HTTP-facing clients.

use thiserror::Error;

/// Errors from constructing or using an HTTP client bound to a base URL.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured or resolved base URL is unusable.
    #[error("invalid base URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Build(String),

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote service answered with a non-success status.
    #[error("{url} returned status {status}: {body}")]
    Status { url: String, status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("malformed response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Maximum number of body bytes kept in error messages.
pub(crate) const ERROR_BODY_LIMIT: usize = 512;

/// Truncate a response body for inclusion in an error.
pub(crate) fn truncate_body(mut body: String) -> String {
    if body.len() > ERROR_BODY_LIMIT {
        let mut cut = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

/// Parse a base URL, requiring an http(s) scheme.
pub(crate) fn parse_base_url(raw: &str) -> Result<url::Url, ClientError> {
    let url = url::Url::parse(raw).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::InvalidUrl {
            url: raw.to_string(),
            reason: "expected an http or https URL".to_string(),
        });
    }
    Ok(url)
}
