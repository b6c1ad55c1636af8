use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::Error;

/// Controls how [`mxprobe`](crate::mxprobe) talks to SMTP servers.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOptions {
    /// Envelope sender for `MAIL FROM`. Empty means the null sender `<>`.
    pub sender: String,
    pub helo_domain: Option<String>,
    pub port: u16,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    /// Exchanges tried, in priority order. Further hosts are only tried
    /// when the previous one could not be reached.
    pub max_hosts: usize,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            sender: String::new(),
            helo_domain: None,
            port: 25,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
            max_hosts: 1,
        }
    }
}

impl ProbeOptions {
    pub fn with_sender(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            ..Self::default()
        }
    }

    /// Name announced in `EHLO`/`HELO`: the configured one, else the
    /// sender's domain, else `localhost`.
    pub fn helo_domain(&self) -> &str {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.is_empty())
            .or_else(|| {
                self.sender
                    .rsplit_once('@')
                    .map(|(_, domain)| domain)
                    .filter(|domain| !domain.is_empty())
            })
            .unwrap_or("localhost")
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.max_hosts == 0 {
            return Err(Error::invalid_config("probe max_hosts must be at least 1"));
        }
        if self.connect_timeout.is_zero() || self.command_timeout.is_zero() {
            return Err(Error::invalid_config("probe timeouts must be non-zero"));
        }
        if self.port == 0 {
            return Err(Error::invalid_config("probe port must be non-zero"));
        }
        if self.sender.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
            return Err(Error::invalid_config(format!(
                "probe sender '{}' is not a bare address",
                self.sender
            )));
        }
        Ok(())
    }
}
