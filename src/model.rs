// src/model.rs
//! Vault records as the store sees them
//!
//! Every `encrypted_*` field is an [`EncryptedToken`]; the type system keeps
//! plaintext out of anything that can be persisted.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::EncryptedToken;
use crate::enums::{CardType, Category, EntryKind, SealedField};

/// Opaque entry identifier assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for EntryId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable owner identifier handed over by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub title: String,
    pub username: String,
    pub encrypted_password: EncryptedToken,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub expires_on: Option<NaiveDate>,
}

impl Credential {
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expires_on.is_some_and(|date| date < today)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub card_name: String,
    pub encrypted_card_number: EncryptedToken,
    pub expiry_month: u32,
    pub expiry_year: i32,
    pub encrypted_cvv: EncryptedToken,
    #[serde(default)]
    pub encrypted_pin: Option<EncryptedToken>,
    pub cardholder_name: String,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub card_type: CardType,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Card {
    /// A card counts as expired once the first day of its expiry month is in the past.
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match NaiveDate::from_ymd_opt(self.expiry_year, self.expiry_month, 1) {
            Some(first_day) => first_day < today,
            None => false,
        }
    }
}

/// The secret-bearing part of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Credential(Credential),
    Card(Card),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub id: EntryId,
    pub owner: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub record: Record,
}

impl VaultEntry {
    pub fn new(owner: OwnerId, record: Record) -> Self {
        let now = Utc::now();
        Self {
            id: EntryId::generate(),
            owner,
            created_at: now,
            updated_at: now,
            record,
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self.record {
            Record::Credential(_) => EntryKind::Credential,
            Record::Card(_) => EntryKind::Card,
        }
    }

    /// Display name: credential title or card name.
    pub fn label(&self) -> &str {
        match &self.record {
            Record::Credential(c) => &c.title,
            Record::Card(c) => &c.card_name,
        }
    }

    /// Token stored for `field`, if this entry has one.
    pub fn sealed(&self, field: SealedField) -> Option<&EncryptedToken> {
        match (&self.record, field) {
            (Record::Credential(c), SealedField::Password) => Some(&c.encrypted_password),
            (Record::Card(c), SealedField::CardNumber) => Some(&c.encrypted_card_number),
            (Record::Card(c), SealedField::Cvv) => Some(&c.encrypted_cvv),
            (Record::Card(c), SealedField::Pin) => c.encrypted_pin.as_ref(),
            _ => None,
        }
    }

    /// Every sealed field present on this entry, in form order.
    pub fn sealed_fields(&self) -> Vec<(SealedField, &EncryptedToken)> {
        SealedField::ALL
            .iter()
            .filter_map(|&field| self.sealed(field).map(|token| (field, token)))
            .collect()
    }

    pub fn as_credential(&self) -> Option<&Credential> {
        match &self.record {
            Record::Credential(c) => Some(c),
            Record::Card(_) => None,
        }
    }

    pub fn as_card(&self) -> Option<&Card> {
        match &self.record {
            Record::Card(c) => Some(c),
            Record::Credential(_) => None,
        }
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        match &self.record {
            Record::Credential(c) => c.is_expired(today),
            Record::Card(c) => c.is_expired(today),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Expiry as shown on the card face, `MM/YY`.
pub fn format_expiry(card: &Card) -> String {
    format!("{:02}/{:02}", card.expiry_month, card.expiry_year.rem_euclid(100))
}

/// Today's date in UTC, used by the expiry checks.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
