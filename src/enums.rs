// src/enums.rs
//! Public enum types used throughout the crate
//!
//! Central location for all #[derive(...)] enums that represent
//! user-visible choices: categories, card types, sealed fields, actions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Credential category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Category {
    #[default]
    Personal,
    Work,
    Finance,
    Social,
    Shopping,
    Other,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Personal,
        Category::Work,
        Category::Finance,
        Category::Social,
        Category::Shopping,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Personal => "Personal",
            Category::Work => "Work",
            Category::Finance => "Finance",
            Category::Social => "Social",
            Category::Shopping => "Shopping",
            Category::Other => "Other",
        }
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::Validation(format!("unknown category '{s}'")))
    }
}

/// Payment card type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CardType {
    #[default]
    Credit,
    Debit,
}

impl FromStr for CardType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "credit" => Ok(CardType::Credit),
            "debit" => Ok(CardType::Debit),
            _ => Err(CoreError::Validation(format!("unknown card type '{s}'"))),
        }
    }
}

/// Which kind of record an entry holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Credential,
    Card,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Credential => "credential",
            EntryKind::Card => "card",
        }
    }
}

/// A field that is only ever stored as a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealedField {
    Password,
    CardNumber,
    Cvv,
    Pin,
}

impl SealedField {
    pub const ALL: [SealedField; 4] = [
        SealedField::Password,
        SealedField::CardNumber,
        SealedField::Cvv,
        SealedField::Pin,
    ];

    /// Human label used in prompts and copy confirmations
    pub fn label(&self) -> &'static str {
        match self {
            SealedField::Password => "Password",
            SealedField::CardNumber => "Card Number",
            SealedField::Cvv => "CVV",
            SealedField::Pin => "PIN",
        }
    }
}

impl fmt::Display for SealedField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for SealedField {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "password" => Ok(SealedField::Password),
            "cardnumber" | "number" => Ok(SealedField::CardNumber),
            "cvv" => Ok(SealedField::Cvv),
            "pin" => Ok(SealedField::Pin),
            _ => Err(CoreError::Validation(format!("unknown field '{s}'"))),
        }
    }
}

/// What the caller intends to do with a revealed plaintext
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Toggle the value visible in place
    Reveal,
    /// Write the value to the clipboard
    Copy,
    /// Populate an edit form with every sealed field of the entry
    LoadForEdit,
}
