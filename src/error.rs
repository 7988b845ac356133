use thiserror::Error;

/// Errors reported by [`crate::MineSkinClient`].
///
/// MineSkin signals most problems through an HTTP 500 whose JSON body carries
/// its own `code` field; those are mapped here alongside the plain HTTP
/// statuses and transport failures.
#[derive(Debug, Error)]
pub enum MineSkinError {
    /// 500 with embedded code 403 - the service refused the request.
    #[error("MineSkin refused the request (code {code})")]
    Forbidden { code: i64 },

    /// 500 with embedded code 404 - the image or account was not found.
    #[error("MineSkin could not find the requested resource (code {code})")]
    NotFound { code: i64 },

    /// 500 with embedded code 408, 504 or 599 - the service timed out upstream.
    #[error("MineSkin timed out while generating the skin (code {code})")]
    ServiceTimeout { code: i64 },

    /// 500 with any other embedded code, carrying the server's message.
    #[error("MineSkin could not process the image (code {code}): {message}")]
    ImageProcessing { code: i64, message: String },

    /// 400 on a URL-based request.
    #[error("MineSkin rejected the image url")]
    BadUrl,

    /// 400 on a file-upload request.
    #[error("MineSkin rejected the uploaded file")]
    BadFile,

    /// 400 on a UUID lookup.
    #[error("MineSkin rejected the account uuid")]
    InvalidUuid,

    /// 429 - requests are arriving faster than the advertised cooldown.
    #[error("MineSkin rate limit hit, requests are too fast")]
    TooFast,

    /// The request to the service timed out at the transport level, or the
    /// service answered with a gateway timeout status (524/408/504/599).
    #[error("timed out waiting for MineSkin")]
    Timeout,

    /// Timed out while the service was fetching the remote image. Only raised
    /// for URL-based requests.
    #[error("timed out while MineSkin fetched the image")]
    ImageTimeout,

    /// Gateway timeout (504) while an API key was configured. Kept distinct
    /// because an inactive key is the usual culprit.
    #[error("MineSkin gateway timed out, the configured api key may not be active")]
    ApiKeyTimeout,

    /// The skin file could not be read from disk.
    #[error("could not read skin file: {0}")]
    Io(#[from] std::io::Error),

    /// Transport-level failure that is not a timeout.
    #[error("request to MineSkin failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Anything else: unexpected status codes and undecodable bodies.
    #[error("MineSkin request failed: {0}")]
    Failed(String),
}
