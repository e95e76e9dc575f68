use thiserror::Error;

/// Errors returned by the Shiprocket API client.
#[derive(Debug, Error)]
pub enum ShiprocketError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Login was rejected or returned no token.
    #[error("Shiprocket auth error: {0}")]
    Auth(String),

    /// Shiprocket returned a non-2xx status with a message.
    #[error("Shiprocket API error: {0}")]
    ApiError(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}
