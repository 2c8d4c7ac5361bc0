use thiserror::Error;

/// Errors reported by index construction and queries.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A parameter or input collection cannot produce a usable index.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The progress sink asked for the build to stop. Nothing built so far is kept.
    #[error("index construction was cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Error::InvalidInput(message.into())
    }
}
