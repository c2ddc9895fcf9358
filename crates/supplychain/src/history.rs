//! Breadcrumb trail of visited applications.
//!
//! The trail never holds the same id twice. Revisiting an application that is
//! already on the trail cuts everything after it, so the trail always reads as
//! a simple path from the first selection to the current center.

use crate::domain::{ApplicationId, HistoryEntry};
use serde::Serialize;

/// Ordered, deduplicated record of visited applications
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NavigationHistory {
    entries: Vec<HistoryEntry>,
}

impl NavigationHistory {
    /// Create an empty trail
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh trail at `entry`.
    pub fn starting_at(entry: HistoryEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// Record a visit.
    ///
    /// If `entry.id` is already at index `k`, the trail is cut back to
    /// `[0..=k]` and that entry keeps its recorded name. Otherwise the entry is
    /// appended.
    pub fn advance(&mut self, entry: HistoryEntry) {
        match self.position(&entry.id) {
            Some(index) => self.entries.truncate(index + 1),
            None => self.entries.push(entry),
        }
    }

    /// Keep `[0..=index]`. Returns `false` (and changes nothing) when `index`
    /// is out of range.
    pub fn truncate_to(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.entries.truncate(index + 1);
        true
    }

    /// Empty the trail.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Entry at `index`
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    /// Most recent entry
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// Index of `id` on the trail
    pub fn position(&self, id: &ApplicationId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == *id)
    }

    /// Whether `id` is on the trail
    pub fn contains(&self, id: &ApplicationId) -> bool {
        self.position(id).is_some()
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the trail is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
