//! URL normalization.
//!
//! Turns raw search-result links into stable keys for the dedup ledger and
//! the fetch cache.

pub mod canonical;
pub mod job_board;

pub use canonical::UrlNormalizer;
pub use job_board::BoardFamily;
