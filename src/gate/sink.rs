// src/gate/sink.rs
//! Where revealed plaintexts go once the gate resolves.
//!
//! The gate never renders anything itself. A UI implements [`RevealSink`];
//! [`MemorySink`] is the in-process version used by tests and the terminal
//! front end.

use std::collections::BTreeMap;

use crate::aliases::{ExposeSecret, PlainField};
use crate::enums::SealedField;
use crate::error::Result;
use crate::model::EntryId;

/// Every sealed field of one entry, decrypted for an edit form.
pub type EditFields = Vec<(SealedField, PlainField)>;

pub trait RevealSink {
    /// Show `value` unmasked for `entry_id` / `field`.
    fn show(&mut self, entry_id: &EntryId, field: SealedField, value: PlainField);

    /// Mask the value again and forget the plaintext.
    fn hide(&mut self, entry_id: &EntryId, field: SealedField);

    /// Put `value` on the clipboard. May fail, in which case nothing is shown.
    fn copy(&mut self, field: SealedField, value: PlainField) -> Result<()>;

    /// Populate an edit form with every sealed field of the entry.
    fn load_for_edit(&mut self, entry_id: &EntryId, fields: EditFields);
}

/// In-memory sink: visible values, the last clipboard write, the open edit form.
#[derive(Default)]
pub struct MemorySink {
    visible: BTreeMap<(EntryId, SealedField), PlainField>,
    clipboard: Option<(SealedField, PlainField)>,
    edit_form: Option<(EntryId, EditFields)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn visible(&self, entry_id: &EntryId, field: SealedField) -> Option<&str> {
        self.visible
            .get(&(entry_id.clone(), field))
            .map(|value| value.expose_secret())
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    pub fn clipboard(&self) -> Option<(SealedField, &str)> {
        self.clipboard
            .as_ref()
            .map(|(field, value)| (*field, value.expose_secret()))
    }

    pub fn edit_form(&self) -> Option<&(EntryId, EditFields)> {
        self.edit_form.as_ref()
    }

    /// Close the edit form, dropping its plaintexts.
    pub fn take_edit_form(&mut self) -> Option<(EntryId, EditFields)> {
        self.edit_form.take()
    }

    pub fn clear_clipboard(&mut self) {
        self.clipboard = None;
    }
}

impl RevealSink for MemorySink {
    fn show(&mut self, entry_id: &EntryId, field: SealedField, value: PlainField) {
        self.visible.insert((entry_id.clone(), field), value);
    }

    fn hide(&mut self, entry_id: &EntryId, field: SealedField) {
        self.visible.remove(&(entry_id.clone(), field));
    }

    fn copy(&mut self, field: SealedField, value: PlainField) -> Result<()> {
        self.clipboard = Some((field, value));
        Ok(())
    }

    fn load_for_edit(&mut self, entry_id: &EntryId, fields: EditFields) {
        self.edit_form = Some((entry_id.clone(), fields));
    }
}
