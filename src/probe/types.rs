use std::fmt;

use crate::error::Failure;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttemptStage {
    Connect,
    Greeting,
    Ehlo,
    Helo,
    MailFrom,
    RcptTo,
    Rset,
    Quit,
}

impl AttemptStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Greeting => "greeting",
            Self::Ehlo => "EHLO",
            Self::Helo => "HELO",
            Self::MailFrom => "MAIL FROM",
            Self::RcptTo => "RCPT TO",
            Self::Rset => "RSET",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for AttemptStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw SMTP reply, preserving the numeric status code and message text.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub code: u16,
    pub message: String,
}

impl SmtpReply {
    pub fn is_positive_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    pub fn is_transient_failure(&self) -> bool {
        (400..500).contains(&self.code)
    }

    pub fn is_permanent_failure(&self) -> bool {
        (500..600).contains(&self.code)
    }
}

impl fmt::Display for SmtpReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.code)
        } else {
            write!(f, "{} {}", self.code, self.message.replace('\n', " "))
        }
    }
}

/// One line of the probe transcript.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(tag = "event", rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmtpEvent {
    Connected {
        host: String,
        address: String,
    },
    Sent {
        stage: AttemptStage,
        command: String,
    },
    Received {
        stage: AttemptStage,
        reply: SmtpReply,
    },
    Error {
        stage: AttemptStage,
        message: String,
    },
}

/// Verdict of a recipient probe.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeOutcome {
    /// RCPT TO answered 2xx.
    Valid,
    /// RCPT TO answered 4xx; retrying later may succeed.
    SoftFail,
    /// RCPT TO answered 5xx.
    HardFail,
    /// No verdict: unreachable server, timeout, no MX, protocol breakdown or
    /// a rejected sender.
    Unknown,
}

impl ProbeOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::SoftFail => "soft_fail",
            Self::HardFail => "hard_fail",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`mxprobe`](crate::mxprobe).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub email: String,
    pub outcome: ProbeOutcome,
    pub detail: String,
    /// Reply code that decided the outcome, when one was received.
    pub code: Option<u16>,
    /// Exchange the verdict came from (the last one tried otherwise).
    pub host: Option<String>,
    pub failure: Option<Failure>,
    pub transcript: Vec<SmtpEvent>,
}

impl ProbeResult {
    pub(crate) fn new(email: &str) -> Self {
        Self {
            email: email.to_string(),
            outcome: ProbeOutcome::Unknown,
            detail: String::new(),
            code: None,
            host: None,
            failure: None,
            transcript: Vec::new(),
        }
    }

    pub(crate) fn unknown(email: &str, failure: Failure) -> Self {
        Self {
            detail: failure.detail.clone(),
            failure: Some(failure),
            ..Self::new(email)
        }
    }
}
