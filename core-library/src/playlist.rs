//! Ordered, id-unique playlist

use crate::models::MediaRecord;

/// Ordered list of records, unique by id, insertion order preserved.
///
/// Owned by the service; it has no interior mutability and no concurrent
/// writers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    records: Vec<MediaRecord>,
}

impl Playlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a playlist from stored records. Later duplicates of an id are
    /// dropped, keeping the first occurrence.
    pub fn from_records(records: impl IntoIterator<Item = MediaRecord>) -> Self {
        let mut playlist = Self::new();
        for record in records {
            playlist.add(record);
        }
        playlist
    }

    /// Append `record` unless a record with the same id is already present.
    ///
    /// Returns `false` on duplicate.
    pub fn add(&mut self, record: MediaRecord) -> bool {
        if self.contains(record.id()) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Remove the record with `id`, returning it if it was present.
    pub fn remove(&mut self, id: &str) -> Option<MediaRecord> {
        let index = self.position(id)?;
        Some(self.records.remove(index))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&MediaRecord> {
        self.records.get(index)
    }

    pub fn find(&self, id: &str) -> Option<&MediaRecord> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// The record after `id`. `None` at the end, or if `id` is not present.
    pub fn next_after(&self, id: &str) -> Option<&MediaRecord> {
        let index = self.position(id)?;
        self.records.get(index + 1)
    }

    /// The record before `id`. `None` at the start, or if `id` is not present.
    pub fn previous_before(&self, id: &str) -> Option<&MediaRecord> {
        let index = self.position(id)?;
        index.checked_sub(1).and_then(|prev| self.records.get(prev))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MediaRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[MediaRecord] {
        &self.records
    }
}
