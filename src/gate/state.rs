// src/gate/state.rs
//! Master-password gate in front of every reveal, copy and edit-load.
//!
//! `Idle → AwaitingPassword → Resolving → Idle`. One request at a time; a new
//! request replaces the pending one. The submitted password is taken by value
//! and dropped before [`RevealGate::submit`] returns, whatever the outcome.

use std::collections::BTreeSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::aliases::{ExposeSecret, MasterPassword, PlainField};
use crate::core::FieldCipher;
use crate::enums::{ActionKind, SealedField};
use crate::error::{CoreError, Result};
use crate::gate::request::PendingRevealRequest;
use crate::gate::sink::RevealSink;
use crate::model::{EntryId, OwnerId, VaultEntry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Idle,
    AwaitingPassword,
    Resolving,
}

/// What a request call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A prompt is needed. `replaced` is set when an older request was dropped.
    AwaitingPassword { replaced: bool },
    /// The field was already visible and has been masked again; no prompt.
    Hidden,
}

/// What a successful submission dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Revealed { entry_id: EntryId, field: SealedField },
    Copied { field: SealedField },
    LoadedForEdit { entry_id: EntryId, fields: Vec<SealedField> },
}

pub struct RevealGate<S> {
    owner: OwnerId,
    cipher: FieldCipher,
    state: GateState,
    pending: Option<PendingRevealRequest>,
    visible: BTreeSet<(EntryId, SealedField)>,
    sink: S,
}

impl<S: RevealSink> RevealGate<S> {
    pub fn new(owner: OwnerId, sink: S) -> Self {
        Self {
            owner,
            cipher: FieldCipher::new(),
            state: GateState::Idle,
            pending: None,
            visible: BTreeSet::new(),
            sink,
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn pending(&self) -> Option<&PendingRevealRequest> {
        self.pending.as_ref()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn is_visible(&self, entry_id: &EntryId, field: SealedField) -> bool {
        self.visible.contains(&(entry_id.clone(), field))
    }

    /// Toggle `field` of `entry`: hide it if visible, otherwise ask for the password.
    pub fn request_reveal(&mut self, entry: &VaultEntry, field: SealedField) -> Result<RequestOutcome> {
        self.check_owner(entry)?;
        if self.is_visible(&entry.id, field) {
            self.hide(&entry.id, field);
            return Ok(RequestOutcome::Hidden);
        }
        let request = PendingRevealRequest::for_field(entry, field, ActionKind::Reveal)?;
        Ok(self.enqueue(request))
    }

    /// Ask for the password, then copy `field` of `entry` to the clipboard.
    pub fn request_copy(&mut self, entry: &VaultEntry, field: SealedField) -> Result<RequestOutcome> {
        self.check_owner(entry)?;
        let request = PendingRevealRequest::for_field(entry, field, ActionKind::Copy)?;
        Ok(self.enqueue(request))
    }

    /// Ask for the password, then load every sealed field of `entry` into an edit form.
    pub fn request_edit(&mut self, entry: &VaultEntry) -> Result<RequestOutcome> {
        self.check_owner(entry)?;
        Ok(self.enqueue(PendingRevealRequest::for_edit(entry)))
    }

    /// Dismiss the prompt. Nothing is decrypted. Returns whether a request was dropped.
    pub fn cancel(&mut self) -> bool {
        let dropped = self.pending.take().is_some();
        self.state = GateState::Idle;
        if dropped {
            debug!(owner = %self.owner, "reveal request cancelled");
        }
        dropped
    }

    /// Mask a revealed value. No decryption involved.
    pub fn hide(&mut self, entry_id: &EntryId, field: SealedField) {
        if self.visible.remove(&(entry_id.clone(), field)) {
            self.sink.hide(entry_id, field);
        }
    }

    /// Mask every revealed value, e.g. on lock or navigation away.
    pub fn hide_all(&mut self) {
        for (entry_id, field) in std::mem::take(&mut self.visible) {
            self.sink.hide(&entry_id, field);
        }
    }

    /// Resolve the pending request with `master`.
    ///
    /// Every token in the request must open with the same password or nothing
    /// is dispatched. Failures carry no hint of which field failed. The
    /// request is consumed either way; an empty password is refused without
    /// consuming it.
    pub fn submit(&mut self, master: MasterPassword) -> Result<Resolution> {
        if self.state != GateState::AwaitingPassword {
            return Err(CoreError::NoPendingRequest);
        }
        if master.expose_secret().trim().is_empty() {
            return Err(CoreError::EmptyMasterPassword);
        }
        let request = self.pending.take().ok_or(CoreError::NoPendingRequest)?;

        self.state = GateState::Resolving;
        let outcome = self.resolve(request, &master);
        drop(master);
        self.state = GateState::Idle;

        if let Err(err) = &outcome {
            warn!(owner = %self.owner, error = %err, "reveal request failed");
        }
        outcome
    }

    fn resolve(&mut self, request: PendingRevealRequest, master: &MasterPassword) -> Result<Resolution> {
        let opened = self.open_all(&request, master)?;
        let entry_id = request.entry_id().clone();

        match request.action() {
            ActionKind::Reveal => {
                let (field, value) = single(opened)?;
                self.sink.show(&entry_id, field, value);
                self.visible.insert((entry_id.clone(), field));
                info!(entry_id = %entry_id, field = %field, "field revealed");
                Ok(Resolution::Revealed { entry_id, field })
            }
            ActionKind::Copy => {
                let (field, value) = single(opened)?;
                self.sink.copy(field, value)?;
                info!(entry_id = %entry_id, field = %field, "field copied");
                Ok(Resolution::Copied { field })
            }
            ActionKind::LoadForEdit => {
                let fields = request.fields();
                self.sink.load_for_edit(&entry_id, opened);
                info!(entry_id = %entry_id, count = fields.len(), "entry loaded for edit");
                Ok(Resolution::LoadedForEdit { entry_id, fields })
            }
        }
    }

    /// Decode every token first, then decrypt all of them. All or nothing.
    fn open_all(
        &self,
        request: &PendingRevealRequest,
        master: &MasterPassword,
    ) -> Result<Vec<(SealedField, PlainField)>> {
        for (_, token) in request.targets() {
            token.decode()?;
        }
        request
            .targets()
            .iter()
            .map(|(field, token)| {
                self.cipher
                    .decrypt_token(token, master)
                    .map(|plain| (*field, plain))
            })
            .collect()
    }

    fn enqueue(&mut self, request: PendingRevealRequest) -> RequestOutcome {
        debug!(
            owner = %self.owner,
            entry_id = %request.entry_id(),
            action = ?request.action(),
            fields = ?request.fields(),
            "awaiting master password"
        );
        let replaced = self.pending.replace(request).is_some();
        self.state = GateState::AwaitingPassword;
        RequestOutcome::AwaitingPassword { replaced }
    }

    fn check_owner(&self, entry: &VaultEntry) -> Result<()> {
        if entry.owner != self.owner {
            return Err(CoreError::NotFound(entry.id.to_string()));
        }
        Ok(())
    }
}

fn single(mut opened: Vec<(SealedField, PlainField)>) -> Result<(SealedField, PlainField)> {
    match (opened.pop(), opened.is_empty()) {
        (Some(only), true) => Ok(only),
        _ => Err(CoreError::Validation(
            "reveal and copy requests open exactly one field".to_string(),
        )),
    }
}

impl<S> fmt::Debug for RevealGate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealGate")
            .field("owner", &self.owner)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .field("visible", &self.visible.len())
            .finish_non_exhaustive()
    }
}
