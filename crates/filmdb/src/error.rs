use bmb_core::types::FilmId;

/// Errors from the film metadata layer.
#[derive(Debug, thiserror::Error)]
pub enum FilmDbError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Film database error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("Film {0} not found")]
    NotFound(FilmId),
}
