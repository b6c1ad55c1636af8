use std::fmt;

use thiserror::Error;

use crate::mx::MxError;
use crate::providers::TableError;

/// Configuration-time failures. Nothing in a sniff or probe run returns this
/// type; per-input problems are reported through [`Failure`] instead.
#[derive(Debug, Error)]
pub enum Error {
    #[error("resolver initialization failed: {source}")]
    ResolverInit {
        #[source]
        source: std::io::Error,
    },
    #[error("provider table rejected: {0}")]
    ProviderTable(#[from] TableError),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to spawn worker thread: {source}")]
    Spawn {
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    pub(crate) fn resolver_init(source: std::io::Error) -> Self {
        Self::ResolverInit { source }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}

/// Kind of a per-input failure captured in a result record.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidIdentifier,
    NoSuchDomain,
    Unresolvable,
    DnsTimeout,
    SmtpUnreachable,
    SmtpTimeout,
}

impl FailureKind {
    /// Whether re-running the same input later may give a different answer.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Unresolvable | Self::DnsTimeout | Self::SmtpUnreachable | Self::SmtpTimeout
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidIdentifier => "invalid_identifier",
            Self::NoSuchDomain => "no_such_domain",
            Self::Unresolvable => "unresolvable",
            Self::DnsTimeout => "dns_timeout",
            Self::SmtpUnreachable => "smtp_unreachable",
            Self::SmtpTimeout => "smtp_timeout",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A per-input failure: the kind plus a human-readable detail.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub detail: String,
}

impl Failure {
    pub fn new(kind: FailureKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.detail)
    }
}

impl From<&MxError> for Failure {
    fn from(err: &MxError) -> Self {
        match err {
            MxError::DnsTimeout { .. } => Self::new(FailureKind::DnsTimeout, err.to_string()),
        }
    }
}
