// src/service.rs
//! Vault operations: create, update, delete, list, stats, audit
//!
//! Plaintext enters only through the drafts below and is sealed before
//! anything reaches the store. Mutating calls are rate limited per
//! `client_addr:route`.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::aliases::{ExposeSecret, MasterPassword, SecretString};
use crate::config::RateLimitConfig;
use crate::consts::{
    ROUTE_CARDS_CREATE, ROUTE_CARDS_UPDATE, ROUTE_CREDENTIALS_CREATE, ROUTE_CREDENTIALS_UPDATE,
    ROUTE_ENTRIES_DELETE, ROUTE_REGISTER,
};
use crate::core::{EncryptedToken, FieldCipher, MasterPasswordHash};
use crate::db::VaultStore;
use crate::enums::{CardType, Category, EntryKind};
use crate::error::{CoreError, Result};
use crate::model::{Card, Credential, EntryId, OwnerId, Record, VaultEntry};
use crate::rate_limit::{rate_key, FixedWindowLimiter, RateLimiter, RoutePolicy};
use crate::strength;

/// Who is asking and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub owner: OwnerId,
    pub client_addr: String,
}

impl RequestContext {
    pub fn new(owner: OwnerId, client_addr: impl Into<String>) -> Self {
        Self {
            owner,
            client_addr: client_addr.into(),
        }
    }
}

/// New value for a sealed field in a draft.
#[derive(Debug, Default)]
pub enum FieldUpdate {
    /// Keep the current value. On update the stored token is opened with the
    /// submitted master password and sealed again under a fresh salt.
    #[default]
    Keep,
    Set(SecretString),
    /// Remove an optional field.
    Clear,
}

impl FieldUpdate {
    pub fn set(value: impl Into<String>) -> Self {
        FieldUpdate::Set(SecretString::from(value.into()))
    }
}

#[derive(Debug, Default)]
pub struct CredentialDraft {
    pub title: String,
    pub username: String,
    pub password: FieldUpdate,
    pub website: Option<String>,
    pub category: Category,
    pub notes: Option<String>,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Default)]
pub struct CardDraft {
    pub card_name: String,
    pub card_number: FieldUpdate,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub cvv: FieldUpdate,
    pub pin: FieldUpdate,
    pub cardholder_name: String,
    pub bank_name: Option<String>,
    pub card_type: CardType,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VaultStats {
    pub total_credentials: usize,
    /// Distinct categories in use.
    pub categories: usize,
    pub expired_credentials: usize,
    pub total_cards: usize,
    pub expired_cards: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordAudit {
    pub checked: usize,
    pub weak: Vec<EntryId>,
    /// Entries whose password also appears on another entry.
    pub reused: Vec<EntryId>,
}

pub struct VaultService<S, L = FixedWindowLimiter> {
    store: S,
    limiter: L,
    limits: RateLimitConfig,
    cipher: FieldCipher,
}

impl<S: VaultStore> VaultService<S, FixedWindowLimiter> {
    /// Service with its own fixed-window limiter sized from `limits`.
    pub fn with_limits(store: S, limits: RateLimitConfig) -> Self {
        let limiter = FixedWindowLimiter::new(limits.max_keys);
        Self::new(store, limiter, limits)
    }
}

impl<S: VaultStore, L: RateLimiter> VaultService<S, L> {
    pub fn new(store: S, limiter: L, limits: RateLimitConfig) -> Self {
        Self {
            store,
            limiter,
            limits,
            cipher: FieldCipher::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn limiter(&self) -> &L {
        &self.limiter
    }

    /// Validate a registration password and produce its verifier.
    pub fn register_master_password(
        &self,
        ctx: &RequestContext,
        master: &MasterPassword,
    ) -> Result<MasterPasswordHash> {
        self.throttle(ctx, ROUTE_REGISTER, self.limits.register)?;
        let hash = MasterPasswordHash::create(master)?;
        info!(owner = %ctx.owner, "master password registered");
        Ok(hash)
    }

    pub fn add_credential(
        &mut self,
        ctx: &RequestContext,
        draft: CredentialDraft,
        master: &MasterPassword,
    ) -> Result<VaultEntry> {
        self.throttle(ctx, ROUTE_CREDENTIALS_CREATE, self.limits.credentials_create)?;
        let credential = self.seal_credential(draft, None, master)?;
        let entry = VaultEntry::new(ctx.owner.clone(), Record::Credential(credential));
        self.store.insert(&entry)?;
        info!(owner = %ctx.owner, entry_id = %entry.id, "credential added");
        Ok(entry)
    }

    pub fn add_card(
        &mut self,
        ctx: &RequestContext,
        draft: CardDraft,
        master: &MasterPassword,
    ) -> Result<VaultEntry> {
        self.throttle(ctx, ROUTE_CARDS_CREATE, self.limits.cards_create)?;
        let card = self.seal_card(draft, None, master)?;
        let entry = VaultEntry::new(ctx.owner.clone(), Record::Card(card));
        self.store.insert(&entry)?;
        info!(owner = %ctx.owner, entry_id = %entry.id, "card added");
        Ok(entry)
    }

    pub fn update_credential(
        &mut self,
        ctx: &RequestContext,
        id: &EntryId,
        draft: CredentialDraft,
        master: &MasterPassword,
    ) -> Result<VaultEntry> {
        self.throttle(ctx, ROUTE_CREDENTIALS_UPDATE, self.limits.update)?;
        let mut entry = self.get(&ctx.owner, id)?;
        let existing = entry
            .as_credential()
            .ok_or_else(|| CoreError::Validation(format!("{id} is not a credential")))?;
        let credential = self.seal_credential(draft, Some(existing), master)?;
        entry.record = Record::Credential(credential);
        entry.touch();
        self.store.replace(&entry)?;
        info!(owner = %ctx.owner, entry_id = %id, "credential updated");
        Ok(entry)
    }

    /// Replace a card wholesale. Every sealed field of the result is freshly
    /// sealed with `master`; nothing is written if a kept field fails to open.
    pub fn update_card(
        &mut self,
        ctx: &RequestContext,
        id: &EntryId,
        draft: CardDraft,
        master: &MasterPassword,
    ) -> Result<VaultEntry> {
        self.throttle(ctx, ROUTE_CARDS_UPDATE, self.limits.update)?;
        let mut entry = self.get(&ctx.owner, id)?;
        let existing = entry
            .as_card()
            .ok_or_else(|| CoreError::Validation(format!("{id} is not a card")))?;
        let card = self.seal_card(draft, Some(existing), master)?;
        entry.record = Record::Card(card);
        entry.touch();
        self.store.replace(&entry)?;
        info!(owner = %ctx.owner, entry_id = %id, "card updated");
        Ok(entry)
    }

    pub fn delete(&mut self, ctx: &RequestContext, id: &EntryId) -> Result<()> {
        self.throttle(ctx, ROUTE_ENTRIES_DELETE, self.limits.delete)?;
        self.store.delete(&ctx.owner, id)?;
        info!(owner = %ctx.owner, entry_id = %id, "entry deleted");
        Ok(())
    }

    pub fn get(&self, owner: &OwnerId, id: &EntryId) -> Result<VaultEntry> {
        self.store
            .get(owner, id)?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// Newest first.
    pub fn list(&self, owner: &OwnerId, kind: Option<EntryKind>) -> Result<Vec<VaultEntry>> {
        let mut entries = self.store.list(owner, kind)?;
        entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(entries)
    }

    pub fn stats(&self, owner: &OwnerId, today: NaiveDate) -> Result<VaultStats> {
        let mut stats = VaultStats::default();
        let mut categories = BTreeSet::new();

        for entry in self.store.list(owner, None)? {
            match &entry.record {
                Record::Credential(c) => {
                    stats.total_credentials += 1;
                    categories.insert(c.category.as_str());
                    if c.is_expired(today) {
                        stats.expired_credentials += 1;
                    }
                }
                Record::Card(c) => {
                    stats.total_cards += 1;
                    if c.is_expired(today) {
                        stats.expired_cards += 1;
                    }
                }
            }
        }
        stats.categories = categories.len();
        Ok(stats)
    }

    /// Decrypt every credential password and flag weak and reused ones.
    ///
    /// Stops at the first token that does not open with `master`, or that is
    /// damaged (`MalformedToken`).
    pub fn audit(&self, owner: &OwnerId, master: &MasterPassword) -> Result<PasswordAudit> {
        let mut audit = PasswordAudit::default();
        let mut seen: HashMap<[u8; 32], Vec<EntryId>> = HashMap::new();

        for entry in self.list(owner, Some(EntryKind::Credential))? {
            let Some(credential) = entry.as_credential() else {
                continue;
            };
            let plain = self.cipher.decrypt_token(&credential.encrypted_password, master)?;
            if strength::score(plain.expose_secret()).is_weak() {
                audit.weak.push(entry.id.clone());
            }
            let digest: [u8; 32] = Sha256::digest(plain.expose_secret().as_bytes()).into();
            seen.entry(digest).or_default().push(entry.id.clone());
            audit.checked += 1;
        }

        audit.reused = seen
            .into_values()
            .filter(|ids| ids.len() > 1)
            .flatten()
            .collect();
        audit.reused.sort();
        info!(
            owner = %owner,
            checked = audit.checked,
            weak = audit.weak.len(),
            reused = audit.reused.len(),
            "password audit finished"
        );
        Ok(audit)
    }

    fn throttle(&self, ctx: &RequestContext, route: &'static str, policy: RoutePolicy) -> Result<()> {
        let key = rate_key(&ctx.client_addr, route);
        let decision = self
            .limiter
            .check_and_consume(&key, policy.limit, policy.window());
        if decision.allowed {
            return Ok(());
        }
        warn!(owner = %ctx.owner, route, "request rate limited");
        Err(CoreError::RateLimited {
            route: route.to_string(),
            retry_after_secs: decision.reset_in.as_secs().max(1),
        })
    }

    fn seal_credential(
        &self,
        draft: CredentialDraft,
        existing: Option<&Credential>,
        master: &MasterPassword,
    ) -> Result<Credential> {
        require_master(master)?;
        let title = required("title", draft.title)?;
        let username = required("username", draft.username)?;
        let encrypted_password = self.seal_required(
            "password",
            draft.password,
            existing.map(|c| &c.encrypted_password),
            master,
        )?;

        Ok(Credential {
            title,
            username,
            encrypted_password,
            website: optional(draft.website),
            category: draft.category,
            notes: optional(draft.notes),
            expires_on: draft.expires_on,
        })
    }

    fn seal_card(
        &self,
        draft: CardDraft,
        existing: Option<&Card>,
        master: &MasterPassword,
    ) -> Result<Card> {
        require_master(master)?;
        let card_name = required("card name", draft.card_name)?;
        let cardholder_name = required("cardholder name", draft.cardholder_name)?;
        if !(1..=12).contains(&draft.expiry_month) {
            return Err(CoreError::Validation(format!(
                "expiry month must be 1-12, got {}",
                draft.expiry_month
            )));
        }

        let encrypted_card_number = self.seal_required(
            "card number",
            draft.card_number,
            existing.map(|c| &c.encrypted_card_number),
            master,
        )?;
        let encrypted_cvv =
            self.seal_required("CVV", draft.cvv, existing.map(|c| &c.encrypted_cvv), master)?;
        let encrypted_pin = self.seal_optional(
            draft.pin,
            existing.and_then(|c| c.encrypted_pin.as_ref()),
            master,
        )?;

        Ok(Card {
            card_name,
            encrypted_card_number,
            expiry_month: draft.expiry_month,
            expiry_year: draft.expiry_year,
            encrypted_cvv,
            encrypted_pin,
            cardholder_name,
            bank_name: optional(draft.bank_name),
            card_type: draft.card_type,
            notes: optional(draft.notes),
        })
    }

    fn seal_required(
        &self,
        name: &str,
        update: FieldUpdate,
        existing: Option<&EncryptedToken>,
        master: &MasterPassword,
    ) -> Result<EncryptedToken> {
        self.seal_optional(update, existing, master)?
            .ok_or_else(|| CoreError::Validation(format!("{name} is required")))
    }

    fn seal_optional(
        &self,
        update: FieldUpdate,
        existing: Option<&EncryptedToken>,
        master: &MasterPassword,
    ) -> Result<Option<EncryptedToken>> {
        match update {
            // Opening the old token proves `master` is the one every other
            // field of the entry is sealed with.
            FieldUpdate::Keep => match existing {
                Some(token) => {
                    let plain = self.cipher.decrypt_token(token, master)?;
                    self.cipher.encrypt(plain.expose_secret(), master).map(Some)
                }
                None => Ok(None),
            },
            FieldUpdate::Clear => Ok(None),
            FieldUpdate::Set(value) if value.expose_secret().is_empty() => Ok(None),
            FieldUpdate::Set(value) => self.cipher.encrypt(value.expose_secret(), master).map(Some),
        }
    }
}

fn require_master(master: &MasterPassword) -> Result<()> {
    if master.expose_secret().trim().is_empty() {
        return Err(CoreError::EmptyMasterPassword);
    }
    Ok(())
}

fn required(name: &str, value: String) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(format!("{name} is required")));
    }
    Ok(trimmed.to_string())
}

fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
