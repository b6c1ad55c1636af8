use thiserror::Error;
use trust_dns_resolver::error::{ResolveError, ResolveErrorKind};
use trust_dns_resolver::proto::op::ResponseCode;

/// Lookup failure that the caller may retry later.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MxError {
    #[error("DNS lookup for {domain} failed: {detail}")]
    DnsTimeout { domain: String, detail: String },
}

impl MxError {
    pub(crate) fn dns_timeout(domain: &str, cause: &LookupError) -> Self {
        Self::DnsTimeout {
            domain: domain.to_string(),
            detail: cause.to_string(),
        }
    }
}

/// Classified failure reported by a [`LookupMx`](super::LookupMx) backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("no such domain")]
    NoSuchDomain,
    #[error("no records found")]
    NoRecords,
    #[error("query timed out")]
    Timeout,
    #[error("resolver failure: {0}")]
    Transient(String),
}

impl From<&ResolveError> for LookupError {
    fn from(err: &ResolveError) -> Self {
        match err.kind() {
            ResolveErrorKind::NoRecordsFound { response_code, .. }
                if *response_code == ResponseCode::NXDomain =>
            {
                Self::NoSuchDomain
            }
            ResolveErrorKind::NoRecordsFound { .. } => Self::NoRecords,
            ResolveErrorKind::Timeout => Self::Timeout,
            _ => Self::Transient(err.to_string()),
        }
    }
}

impl From<ResolveError> for LookupError {
    fn from(err: ResolveError) -> Self {
        Self::from(&err)
    }
}
