//! # ayesha-channels
//!
//! Messaging channel integrations for Ayesha.

pub mod console;
