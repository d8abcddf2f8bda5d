use crate::{
    error::{Result, StudioError},
    models::GenerationResult,
};
use std::sync::Arc;
use uuid::Uuid;

pub const HISTORY_CAPACITY: usize = 10;

/// Past results of one session, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryList {
    entries: Vec<Arc<GenerationResult>>,
}

impl HistoryList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `result`, dropping whatever falls past capacity.
    pub fn insert(&mut self, result: Arc<GenerationResult>) {
        self.entries.insert(0, result);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, index: usize) -> Result<&Arc<GenerationResult>> {
        self.entries.get(index).ok_or(StudioError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    pub fn remove(&mut self, index: usize) -> Result<Arc<GenerationResult>> {
        if index >= self.entries.len() {
            return Err(StudioError::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn find(&self, id: Uuid) -> Option<&GenerationResult> {
        self.entries.iter().map(Arc::as_ref).find(|result| result.id == id)
    }

    /// (index, entry) pairs in current order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &GenerationResult)> + '_ {
        self.entries.iter().map(Arc::as_ref).enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
