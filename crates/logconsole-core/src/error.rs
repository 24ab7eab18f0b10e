use thiserror::Error;

/// Errors surfaced by the console to its configuration layer
#[derive(Debug, Error)]
pub enum ConsoleError {
    /// The text filter could not be compiled; the previous filter stays active
    #[error("invalid filter pattern '{pattern}': {source}")]
    InvalidFilterPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Another console instance is already alive in this process
    #[error("a console instance is already active")]
    AlreadyActive,

    /// The ingestion layer already forwards to a subscriber
    #[error("the console layer already has an active subscription")]
    AlreadySubscribed,
}
