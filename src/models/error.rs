use tokio_util::codec::LinesCodecError;

/// Domain errors raised by the to-do store.
///
/// The display text doubles as the `error` field sent to the client.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("item not found")]
    NotFound,
}

/// A frame that could not be turned into a request. Never answered, only logged.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("invalid frame: {0}")]
    Frame(#[from] LinesCodecError),
    #[error("invalid request: {0}")]
    Json(#[from] serde_json::Error),
}
