//! Bulk classification over a fixed pool of worker threads.
//!
//! A feeder thread pulls identifiers lazily from the input iterator into a
//! bounded job queue; workers sniff (and optionally probe) them and send
//! results back over a second bounded queue, so a slow consumer throttles
//! the whole run. [`BulkSniff`] yields the results as an iterator, each one
//! tagged with the position of its input.

mod cancel;
mod options;

pub use cancel::CancelToken;
pub use options::{BulkOptions, ResultOrder};

use std::collections::BTreeMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, SyncSender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::Error;
use crate::mx::LookupMx;
use crate::probe::ProbeResult;
use crate::sniff::{SniffOptions, SniffResult, Sniffer};

/// One result of a bulk run.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkItem {
    /// Zero-based position of the input.
    pub index: usize,
    pub result: SniffResult,
    #[cfg_attr(
        feature = "with-serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub probe: Option<ProbeResult>,
}

type Job = (usize, String);

/// How often an idle worker rechecks the cancel token.
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Classify `inputs` with the system resolver and the built-in table.
///
/// Work starts immediately but only runs a bounded distance ahead of the
/// consumer. Cancel through [`BulkSniff::cancel_token`].
pub fn mxbulksniff<I>(
    inputs: I,
    sniff_options: &SniffOptions,
    options: BulkOptions,
) -> Result<BulkSniff, Error>
where
    I: IntoIterator,
    I::Item: Into<String>,
    I::IntoIter: Send + 'static,
{
    options.validate()?;
    let sniffer = Sniffer::from_system_conf(sniff_options.clone())?;
    bulk_sniff(Arc::new(sniffer), inputs, options, CancelToken::new())
}

/// Classify `inputs` with a shared `sniffer`.
///
/// A failing input never stops the run; duplicates produce one result per
/// occurrence and share the sniffer's DNS cache.
pub fn bulk_sniff<R, I>(
    sniffer: Arc<Sniffer<R>>,
    inputs: I,
    options: BulkOptions,
    cancel: CancelToken,
) -> Result<BulkSniff, Error>
where
    R: LookupMx + Send + Sync + 'static,
    I: IntoIterator,
    I::Item: Into<String>,
    I::IntoIter: Send + 'static,
{
    options.validate()?;

    let depth = options.effective_queue_depth();
    let (job_tx, job_rx) = mpsc::sync_channel::<Job>(depth);
    let (result_tx, result_rx) = mpsc::sync_channel::<BulkItem>(depth);
    let job_rx = Arc::new(Mutex::new(job_rx));

    tracing::info!(
        workers = options.workers,
        ordering = ?options.ordering,
        probe = options.probe.is_some(),
        "bulk sniff started"
    );

    let mut workers = Vec::with_capacity(options.workers);
    for id in 0..options.workers {
        let worker = Worker {
            sniffer: Arc::clone(&sniffer),
            jobs: Arc::clone(&job_rx),
            results: result_tx.clone(),
            options: options.clone(),
            cancel: cancel.clone(),
        };
        let handle = thread::Builder::new()
            .name(format!("mxsniff-worker-{id}"))
            .spawn(move || worker.run())
            .map_err(|source| {
                // workers already running stop once the queue is gone
                cancel.cancel();
                Error::Spawn { source }
            })?;
        workers.push(handle);
    }
    drop(result_tx);
    drop(job_rx);

    let feeder_cancel = cancel.clone();
    let inputs = inputs.into_iter();
    thread::Builder::new()
        .name("mxsniff-feeder".to_string())
        .spawn(move || feed(inputs, job_tx, feeder_cancel))
        .map_err(|source| {
            cancel.cancel();
            Error::Spawn { source }
        })?;

    Ok(BulkSniff {
        results: result_rx,
        ordering: options.ordering,
        pending: BTreeMap::new(),
        next_index: 0,
        workers,
        cancel,
        delivered: 0,
    })
}

/// Runs detached: an input iterator blocked in a read only notices the
/// cancellation once it yields again. Workers stop without waiting for it.
fn feed<I>(inputs: I, jobs: SyncSender<Job>, cancel: CancelToken)
where
    I: Iterator,
    I::Item: Into<String>,
{
    for (index, input) in inputs.enumerate() {
        if cancel.is_cancelled() {
            tracing::debug!(index, "dispatch stopped by cancellation");
            break;
        }
        if jobs.send((index, input.into())).is_err() {
            break;
        }
    }
}

struct Worker<R> {
    sniffer: Arc<Sniffer<R>>,
    jobs: Arc<Mutex<Receiver<Job>>>,
    results: SyncSender<BulkItem>,
    options: BulkOptions,
    cancel: CancelToken,
}

impl<R: LookupMx> Worker<R> {
    fn run(self) {
        while !self.cancel.is_cancelled() {
            // the feeder may be blocked on its input
            let job = match self.jobs.lock() {
                Ok(jobs) => jobs.recv_timeout(IDLE_POLL),
                Err(poisoned) => poisoned.into_inner().recv_timeout(IDLE_POLL),
            };
            let (index, input) = match job {
                Ok(job) => job,
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => break,
            };
            if self.cancel.is_cancelled() {
                break;
            }

            let result = self.sniffer.sniff(&input);
            let probe = self
                .options
                .probe
                .as_ref()
                .filter(|_| input.contains('@'))
                .map(|probe_options| self.sniffer.probe(&input, probe_options));
            let item = BulkItem {
                index,
                result,
                probe,
            };
            if self.results.send(item).is_err() {
                break;
            }
        }
    }
}

/// Iterator over the results of a bulk run.
///
/// Dropping it stops the workers after their current input.
#[derive(Debug)]
pub struct BulkSniff {
    results: Receiver<BulkItem>,
    ordering: ResultOrder,
    pending: BTreeMap<usize, BulkItem>,
    next_index: usize,
    workers: Vec<JoinHandle<()>>,
    cancel: CancelToken,
    delivered: usize,
}

impl BulkSniff {
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    fn receive(&mut self) -> Option<BulkItem> {
        match self.ordering {
            ResultOrder::Completed => self.results.recv().ok(),
            ResultOrder::Input => loop {
                if let Some(item) = self.pending.remove(&self.next_index) {
                    self.next_index += 1;
                    return Some(item);
                }
                match self.results.recv() {
                    Ok(item) => {
                        self.pending.insert(item.index, item);
                    }
                    Err(_) => {
                        // cancelled runs can leave gaps
                        let (index, item) = self.pending.pop_first()?;
                        self.next_index = index + 1;
                        return Some(item);
                    }
                }
            },
        }
    }

    fn finish(&mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("bulk worker panicked");
            }
        }
        tracing::info!(
            results = self.delivered,
            cancelled = self.cancel.is_cancelled(),
            "bulk sniff finished"
        );
    }
}

impl Iterator for BulkSniff {
    type Item = BulkItem;

    fn next(&mut self) -> Option<BulkItem> {
        match self.receive() {
            Some(item) => {
                self.delivered += 1;
                Some(item)
            }
            None => {
                if !self.workers.is_empty() {
                    self.finish();
                }
                None
            }
        }
    }
}

impl Drop for BulkSniff {
    fn drop(&mut self) {
        if !self.workers.is_empty() {
            self.cancel.cancel();
        }
    }
}
