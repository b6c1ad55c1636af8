use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

use super::{MxError, MxLookup};

type Slot = Arc<OnceLock<Result<MxLookup, MxError>>>;

/// Per-run lookup cache shared by all workers.
///
/// Each domain owns a once-cell: concurrent callers for the same domain wait
/// on the first one's query instead of issuing their own. Outcomes that must
/// not be cached are evicted right after the waiters have read them.
#[derive(Debug, Default)]
pub(crate) struct DnsCache {
    slots: DashMap<String, Slot>,
}

impl DnsCache {
    pub(crate) fn get_or_resolve<F>(&self, domain: &str, resolve: F) -> Result<MxLookup, MxError>
    where
        F: FnOnce() -> Result<MxLookup, MxError>,
    {
        // the shard guard is released at the end of this statement
        let slot = Arc::clone(self.slots.entry(domain.to_string()).or_default().value());

        let mut queried = false;
        let outcome = slot
            .get_or_init(|| {
                queried = true;
                resolve()
            })
            .clone();

        if queried {
            tracing::debug!(domain, "MX cache miss");
        } else {
            tracing::debug!(domain, "MX cache hit");
        }

        let cacheable = matches!(&outcome, Ok(lookup) if lookup.status.is_cacheable());
        if !cacheable {
            self.slots
                .remove_if(domain, |_, current| Arc::ptr_eq(current, &slot));
        }
        outcome
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}
