use thiserror::Error;

/// Problems found while loading a provider table. These are fatal: a table
/// that fails to load is never used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("provider id is empty")]
    EmptyId,
    #[error("provider id '{0}' is reserved")]
    ReservedId(String),
    #[error("provider '{0}' is defined twice")]
    DuplicateProvider(String),
    #[error("provider '{0}' has no MX patterns")]
    NoPatterns(String),
    #[error("pattern '{pattern}' of provider '{provider}' is invalid: {reason}")]
    InvalidPattern {
        provider: String,
        pattern: String,
        reason: String,
    },
    #[error("domain '{domain}' is claimed by both '{first}' and '{second}'")]
    DuplicateDomain {
        domain: String,
        first: String,
        second: String,
    },
    #[error("provider table JSON is invalid: {0}")]
    Json(String),
}
