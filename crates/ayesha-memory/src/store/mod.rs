//! Write-through state store.
//!
//! Split into focused submodules:
//! - `channels`: per-guild allowed channel bindings
//! - `facts`: per-user facts and the substring fact extractor
//! - `context`: prompt composition from persona and facts

mod channels;
mod context;
mod facts;


pub use context::{is_concise, CONCISE_SUFFIX, CONCISE_THRESHOLD, DETAILED_SUFFIX};
pub use facts::{extract_facts, UserFacts};

use crate::backing::Backing;
use ayesha_core::error::AyeshaError;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Document holding `guild id -> channel id`.
pub const ALLOWED_CHANNELS_DOC: &str = "allowed_channels";
/// Document holding `user id -> facts`.
pub const MEMORY_DOC: &str = "memory";

#[derive(Debug, Default)]
struct State {
    allowed_channels: BTreeMap<String, u64>,
    memory: BTreeMap<String, UserFacts>,
    /// Bumped on every mutation that is persisted.
    revision: u64,
}

impl State {
    fn next_revision(&mut self) -> u64 {
        self.revision += 1;
        self.revision
    }
}

/// A document serialized under the state lock and written after it is
/// released.
struct Snapshot {
    name: &'static str,
    revision: u64,
    content: String,
}

/// In-memory source of truth for bindings and facts, persisted after every
/// mutation. Cloning shares the same state.
///
/// Backing I/O never runs under the state lock, so readers are not held up
/// by a slow disk. Writes of one document are serialized and a snapshot
/// older than the last one written is dropped.
#[derive(Clone)]
pub struct Store {
    state: Arc<Mutex<State>>,
    /// Last revision written per document.
    written: Arc<Mutex<HashMap<&'static str, u64>>>,
    backing: Arc<dyn Backing>,
}

impl Store {
    /// Load both documents from `backing`. Missing or unreadable documents
    /// start empty.
    pub fn open(backing: Arc<dyn Backing>) -> Self {
        let allowed_channels = load_all(backing.as_ref(), ALLOWED_CHANNELS_DOC);
        let memory = load_all(backing.as_ref(), MEMORY_DOC);
        info!(
            "State store loaded: {} channel binding(s), {} known user(s)",
            allowed_channels.len(),
            memory.len()
        );
        Self {
            state: Arc::new(Mutex::new(State {
                allowed_channels,
                memory,
                revision: 0,
            })),
            written: Arc::new(Mutex::new(HashMap::new())),
            backing,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write a snapshot unless a newer one of the same document already
    /// landed.
    fn write(&self, snapshot: Snapshot) -> Result<(), AyeshaError> {
        let mut written = self.written.lock().unwrap_or_else(PoisonError::into_inner);
        let last = written.entry(snapshot.name).or_insert(0);
        if *last > snapshot.revision {
            debug!(
                "{}: skipping revision {} (already at {})",
                snapshot.name, snapshot.revision, last
            );
            return Ok(());
        }
        self.backing.save(snapshot.name, &snapshot.content)?;
        *last = snapshot.revision;
        Ok(())
    }
}

/// Read and parse a whole document, falling back to an empty map.
fn load_all<T: DeserializeOwned>(backing: &dyn Backing, name: &str) -> BTreeMap<String, T> {
    match backing.load(name) {
        Ok(Some(content)) => match serde_json::from_str(&content) {
            Ok(map) => map,
            Err(e) => {
                warn!("{name}: unreadable contents, starting empty: {e}");
                BTreeMap::new()
            }
        },
        Ok(None) => BTreeMap::new(),
        Err(e) => {
            warn!("{name}: load failed, starting empty: {e}");
            BTreeMap::new()
        }
    }
}

/// Serialize a whole map at `revision`.
fn snapshot<T: Serialize>(
    name: &'static str,
    revision: u64,
    map: &BTreeMap<String, T>,
) -> Result<Snapshot, AyeshaError> {
    Ok(Snapshot {
        name,
        revision,
        content: serde_json::to_string(map)?,
    })
}
