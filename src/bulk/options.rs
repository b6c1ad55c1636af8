#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use crate::Error;
use crate::probe::ProbeOptions;

/// Order in which a bulk run yields its results.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ResultOrder {
    /// Same order as the input; early completions are held back.
    #[default]
    Input,
    /// As soon as each result is ready.
    Completed,
}

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOptions {
    /// Worker threads.
    pub workers: usize,
    /// Inputs read ahead of the workers. `0` means twice the worker count.
    pub queue_depth: usize,
    pub ordering: ResultOrder,
    /// Also probe every input that is an email address.
    pub probe: Option<ProbeOptions>,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            workers: 10,
            queue_depth: 0,
            ordering: ResultOrder::Input,
            probe: None,
        }
    }
}

impl BulkOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::invalid_config("at least one worker is required"));
        }
        if let Some(probe) = &self.probe {
            probe.validate()?;
        }
        Ok(())
    }

    pub(crate) fn effective_queue_depth(&self) -> usize {
        if self.queue_depth == 0 {
            self.workers.saturating_mul(2)
        } else {
            self.queue_depth
        }
    }
}
