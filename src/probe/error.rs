use std::io;

use thiserror::Error;

use super::types::{AttemptStage, SmtpReply};
use crate::error::FailureKind;

/// Why an SMTP conversation with one exchange ended without a verdict.
#[derive(Debug, Error)]
pub(crate) enum ProbeError {
    #[error("{host} could not be reached: {source}")]
    Unreachable {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("timed out during {stage}")]
    Timeout {
        stage: AttemptStage,
        #[source]
        source: io::Error,
    },
    #[error("I/O failure during {stage}: {source}")]
    Io {
        stage: AttemptStage,
        #[source]
        source: io::Error,
    },
    #[error("unexpected reply to {stage}: {reply}")]
    Unexpected {
        stage: AttemptStage,
        reply: SmtpReply,
    },
}

impl ProbeError {
    pub(crate) fn unreachable(host: &str, source: io::Error) -> Self {
        Self::Unreachable {
            host: host.to_string(),
            source,
        }
    }

    pub(crate) fn io(stage: AttemptStage, source: io::Error) -> Self {
        if is_timeout(&source) {
            Self::Timeout { stage, source }
        } else {
            Self::Io { stage, source }
        }
    }

    /// The next exchange may be tried.
    pub(crate) fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    pub(crate) fn stage(&self) -> AttemptStage {
        match self {
            Self::Unreachable { .. } => AttemptStage::Connect,
            Self::Timeout { stage, .. } | Self::Io { stage, .. } | Self::Unexpected { stage, .. } => {
                *stage
            }
        }
    }

    pub(crate) fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Timeout { .. } => FailureKind::SmtpTimeout,
            Self::Unreachable { source, .. } if is_timeout(source) => FailureKind::SmtpTimeout,
            _ => FailureKind::SmtpUnreachable,
        }
    }

    pub(crate) fn reply(&self) -> Option<&SmtpReply> {
        match self {
            Self::Unexpected { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

/// Socket timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
