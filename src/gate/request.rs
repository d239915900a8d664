// src/gate/request.rs
//! The one request a gate may be holding while it waits for a password.

use std::fmt;

use crate::core::EncryptedToken;
use crate::enums::{ActionKind, SealedField};
use crate::error::{CoreError, Result};
use crate::model::{EntryId, VaultEntry};

/// Which tokens to open and what to do with the plaintexts afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingRevealRequest {
    action: ActionKind,
    entry_id: EntryId,
    targets: Vec<(SealedField, EncryptedToken)>,
}

impl PendingRevealRequest {
    /// Reveal or copy one sealed field of `entry`.
    pub fn for_field(entry: &VaultEntry, field: SealedField, action: ActionKind) -> Result<Self> {
        let token = entry.sealed(field).ok_or_else(|| {
            CoreError::Validation(format!("{} has no {} field", entry.label(), field.label()))
        })?;
        Ok(Self {
            action,
            entry_id: entry.id.clone(),
            targets: vec![(field, token.clone())],
        })
    }

    /// Open every sealed field of `entry` for an edit form.
    pub fn for_edit(entry: &VaultEntry) -> Self {
        Self {
            action: ActionKind::LoadForEdit,
            entry_id: entry.id.clone(),
            targets: entry
                .sealed_fields()
                .into_iter()
                .map(|(field, token)| (field, token.clone()))
                .collect(),
        }
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }

    pub fn entry_id(&self) -> &EntryId {
        &self.entry_id
    }

    pub fn targets(&self) -> &[(SealedField, EncryptedToken)] {
        &self.targets
    }

    /// Fields this request will open, in order.
    pub fn fields(&self) -> Vec<SealedField> {
        self.targets.iter().map(|(field, _)| *field).collect()
    }
}

impl fmt::Debug for PendingRevealRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingRevealRequest")
            .field("action", &self.action)
            .field("entry_id", &self.entry_id)
            .field("fields", &self.fields())
            .finish()
    }
}
