//! Errors raised while running a feed query

/// Everything that can stop a query run.
///
/// The first four variants are the feed's own failure modes and carry a
/// message fit for showing to whoever triggered the run. None of them are
/// retried; the caller decides whether to try again later.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("Invalid query type: {0}")]
    InvalidQueryType(String),

    #[error("Twitter OAuth settings missing")]
    MissingCredentials,

    #[error("Error retrieving: {0}")]
    Retrieve(String),

    /// Message reported by the API in an `errors` envelope
    #[error("{0}")]
    Api(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        QueryError::Retrieve(e.to_string())
    }
}
