//! Provider table and MX pattern matching.

mod data;
mod error;
mod pattern;
mod public;
mod table;

#[cfg(test)]
mod tests;

pub use error::TableError;
pub use pattern::{Pattern, Specificity};
pub use public::is_public_domain;
pub use table::{Provider, ProviderInfo, ProviderMatch, ProviderSpec, ProviderTable};
