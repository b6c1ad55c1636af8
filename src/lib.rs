#![forbid(unsafe_code)]
//! mxsniff: identify email service providers from MX records.
//!
//! The crate normalises an email address, URL or domain, resolves the
//! domain's MX records and matches the exchange hostnames against a table of
//! known providers. Lists are processed by a bounded worker pool, and an
//! optional SMTP probe checks whether a mailbox is accepted.

pub mod bulk;
mod error;
pub mod identifier;
pub mod mx;
pub mod probe;
pub mod providers;
pub mod sniff;

pub use error::{Error, Failure, FailureKind};

pub use bulk::{BulkItem, BulkOptions, BulkSniff, CancelToken, ResultOrder, bulk_sniff, mxbulksniff};
pub use identifier::{CanonicalFlags, IdentifierError, canonical_email, normalize_identifier};
pub use mx::{
    LookupError, LookupMx, MxError, MxLookup, MxRecord, MxResolver, MxStatus, ResolverOptions,
};
pub use probe::{
    AttemptStage, ProbeOptions, ProbeOutcome, ProbeResult, SmtpEvent, SmtpReply, mxprobe,
    probe_with,
};
pub use providers::{
    Pattern, Provider, ProviderInfo, ProviderMatch, ProviderSpec, ProviderTable, Specificity,
    TableError, is_public_domain,
};
pub use sniff::{Routing, SniffOptions, SniffResult, Sniffer, mxsniff};
