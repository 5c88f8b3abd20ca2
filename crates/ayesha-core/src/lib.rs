//! # ayesha-core
//!
//! Core types, traits, persona, configuration, and error handling for Ayesha.

pub mod config;
pub mod context;
pub mod error;
pub mod message;
pub mod persona;
pub mod traits;

pub use config::shellexpand;
