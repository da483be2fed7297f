/// Core error type.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing message vs retryable).
/// Persistence failures get their own variant: the flows treat them
/// differently from everything else (generic retry message, no state change).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("store error: {0}")]
    Store(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
