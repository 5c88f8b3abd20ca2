//! # ayesha-memory
//!
//! Persistent state for Ayesha: per-guild channel bindings and per-user
//! learned facts, held in memory and written through to a [`Backing`].

pub mod backing;
pub mod store;

pub use backing::{Backing, JsonFileBacking, MemoryBacking};
pub use store::{
    extract_facts, is_concise, Store, UserFacts, CONCISE_SUFFIX, CONCISE_THRESHOLD, DETAILED_SUFFIX,
};
