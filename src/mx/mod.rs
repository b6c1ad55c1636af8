//! DNS MX resolution.
//!
//! [`MxResolver`] wraps a [`LookupMx`] backend (the system resolver in
//! production, a stub in tests) and a per-run cache. Lookups never fail for
//! a missing domain or missing records; those come back as an [`MxLookup`]
//! whose [`MxStatus`] says what happened. Only timeouts and transient
//! resolver failures are errors.

mod cache;
mod error;
mod options;
mod resolver;
mod types;

pub use error::{LookupError, MxError};
pub use options::ResolverOptions;
pub use resolver::{LookupMx, MxResolver, system_resolver};
pub use types::{MxLookup, MxRecord, MxStatus};

#[cfg(test)]
pub(crate) mod tests;
