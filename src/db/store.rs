// src/db/store.rs
//! Storage seam for vault entries, plus the in-memory implementation

use std::collections::HashMap;

use crate::enums::EntryKind;
use crate::error::{CoreError, Result};
use crate::model::{EntryId, OwnerId, VaultEntry};

/// Persists entries with their tokens as opaque strings.
///
/// Every read and write is scoped by owner. An entry that exists under a
/// different owner behaves exactly like a missing one.
pub trait VaultStore {
    fn insert(&mut self, entry: &VaultEntry) -> Result<()>;

    fn get(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<VaultEntry>>;

    /// All entries of `owner`, optionally of one kind. Order is unspecified.
    fn list(&self, owner: &OwnerId, kind: Option<EntryKind>) -> Result<Vec<VaultEntry>>;

    /// Overwrite an existing entry wholesale. `NotFound` if it is missing or foreign.
    fn replace(&mut self, entry: &VaultEntry) -> Result<()>;

    /// `NotFound` if it is missing or foreign.
    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<EntryId, VaultEntry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn owned_by(&self, owner: &OwnerId, id: &EntryId) -> bool {
        self.entries.get(id).is_some_and(|e| &e.owner == owner)
    }
}

impl VaultStore for MemoryStore {
    fn insert(&mut self, entry: &VaultEntry) -> Result<()> {
        if self.entries.contains_key(&entry.id) {
            return Err(CoreError::Validation(format!("duplicate entry id {}", entry.id)));
        }
        self.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn get(&self, owner: &OwnerId, id: &EntryId) -> Result<Option<VaultEntry>> {
        Ok(self.entries.get(id).filter(|e| &e.owner == owner).cloned())
    }

    fn list(&self, owner: &OwnerId, kind: Option<EntryKind>) -> Result<Vec<VaultEntry>> {
        Ok(self
            .entries
            .values()
            .filter(|e| &e.owner == owner)
            .filter(|e| kind.map_or(true, |k| e.kind() == k))
            .cloned()
            .collect())
    }

    fn replace(&mut self, entry: &VaultEntry) -> Result<()> {
        if !self.owned_by(&entry.owner, &entry.id) {
            return Err(CoreError::NotFound(entry.id.to_string()));
        }
        self.entries.insert(entry.id.clone(), entry.clone());
        Ok(())
    }

    fn delete(&mut self, owner: &OwnerId, id: &EntryId) -> Result<()> {
        if !self.owned_by(owner, id) {
            return Err(CoreError::NotFound(id.to_string()));
        }
        self.entries.remove(id);
        Ok(())
    }
}
