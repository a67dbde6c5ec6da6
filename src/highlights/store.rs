//! Client-side highlight store
//!
//! Ordered collection of the highlights rendered for one document. The
//! backend holds the durable copy; this store is the source of truth for
//! what is drawn. Local writes are optimistic and never rolled back, but
//! each entry remembers whether its persistence request succeeded.

use super::types::Highlight;

/// Persistence status of a locally created highlight
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistState {
    /// Sent (or about to be sent), no answer yet
    Pending,
    /// Known to the backend
    Confirmed,
    /// Backend rejected or was unreachable; entry kept locally
    Failed(String),
}

#[derive(Debug, Clone)]
struct Entry {
    highlight: Highlight,
    state: PersistState,
}

/// Ordered highlight collection with a change counter
#[derive(Debug, Default)]
pub struct HighlightStore {
    entries: Vec<Entry>,
    revision: u64,
}

impl HighlightStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments on every change to the rendered contents
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Highlight> {
        self.entries.iter().map(|e| &e.highlight)
    }

    /// Snapshot of the highlights in order
    pub fn to_vec(&self) -> Vec<Highlight> {
        self.iter().cloned().collect()
    }

    pub fn get(&self, timestamp: &str) -> Option<&Highlight> {
        self.position(timestamp).map(|i| &self.entries[i].highlight)
    }

    pub fn state(&self, timestamp: &str) -> Option<&PersistState> {
        self.position(timestamp).map(|i| &self.entries[i].state)
    }

    /// Highlights whose persistence failed
    pub fn failed(&self) -> impl Iterator<Item = &Highlight> {
        self.entries
            .iter()
            .filter(|e| matches!(e.state, PersistState::Failed(_)))
            .map(|e| &e.highlight)
    }

    /// Replace everything with a backend snapshot
    pub fn replace_all(&mut self, highlights: Vec<Highlight>) {
        self.entries = highlights
            .into_iter()
            .map(|highlight| Entry {
                highlight,
                state: PersistState::Confirmed,
            })
            .collect();
        self.bump();
    }

    /// Optimistically append a new highlight
    pub fn append(&mut self, highlight: Highlight) {
        self.entries.push(Entry {
            highlight,
            state: PersistState::Pending,
        });
        self.bump();
    }

    pub fn mark_confirmed(&mut self, timestamp: &str) -> bool {
        self.set_state(timestamp, PersistState::Confirmed)
    }

    pub fn mark_failed(&mut self, timestamp: &str, reason: impl Into<String>) -> bool {
        self.set_state(timestamp, PersistState::Failed(reason.into()))
    }

    /// Remove every highlight carrying `timestamp`
    pub fn remove(&mut self, timestamp: &str) -> Option<Highlight> {
        let index = self.position(timestamp)?;
        let removed = self.entries.remove(index);
        // Duplicate identities from older clients go too, matching the backend delete
        self.entries.retain(|e| e.highlight.timestamp != timestamp);
        self.bump();
        Some(removed.highlight)
    }

    /// Empty the store, returning what it held
    pub fn take_all(&mut self) -> Vec<Highlight> {
        let drained: Vec<Highlight> = self.entries.drain(..).map(|e| e.highlight).collect();
        self.bump();
        drained
    }

    /// Drop everything when switching documents
    pub fn reset(&mut self) {
        if !self.entries.is_empty() {
            self.entries.clear();
            self.bump();
        }
    }

    fn position(&self, timestamp: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| e.highlight.timestamp == timestamp)
    }

    fn set_state(&mut self, timestamp: &str, state: PersistState) -> bool {
        match self.position(timestamp) {
            Some(index) => {
                self.entries[index].state = state;
                true
            }
            None => false,
        }
    }

    fn bump(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }
}
