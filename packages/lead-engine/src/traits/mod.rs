//! Trait seams between the pipeline and its collaborators.
//!
//! Applications implement these to plug in search, persistence and
//! classification backends.

pub mod cache;
pub mod classifier;
pub mod search;
pub mod store;
