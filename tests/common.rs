// tests/common.rs
//! Shared test utilities — logging setup and sample entries
#![allow(dead_code)]

use encrypted_field_vault::aliases::secret;
use encrypted_field_vault::config::RateLimitConfig;
use encrypted_field_vault::service::{CardDraft, CredentialDraft, FieldUpdate, RequestContext};
use encrypted_field_vault::{CardType, MasterPassword, OwnerId};

#[cfg(feature = "logging")]
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub const MASTER: &str = "Correct-Horse-1";
pub const OWNER: &str = "alice";

/// Call once at the start of any test that needs logs
pub fn setup() {
    #[cfg(feature = "logging")]
    tracing_subscriber::registry()
        .with(fmt::layer().with_test_writer())
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();
}

pub fn master() -> MasterPassword {
    secret(MASTER)
}

pub fn owner() -> OwnerId {
    OwnerId::new(OWNER)
}

pub fn ctx() -> RequestContext {
    RequestContext::new(owner(), "203.0.113.7")
}

pub fn login_draft(title: &str, password: &str) -> CredentialDraft {
    CredentialDraft {
        title: title.into(),
        username: "alice@example.com".into(),
        password: FieldUpdate::set(password),
        website: Some("https://mail.example.com".into()),
        ..Default::default()
    }
}

pub fn card_draft(pin: Option<&str>) -> CardDraft {
    CardDraft {
        card_name: "Everyday".into(),
        card_number: FieldUpdate::set("4111111111111111"),
        expiry_month: 8,
        expiry_year: 2031,
        cvv: FieldUpdate::set("123"),
        pin: pin.map(FieldUpdate::set).unwrap_or_default(),
        cardholder_name: "Alice Example".into(),
        bank_name: Some("Example Bank".into()),
        card_type: CardType::Debit,
        notes: None,
    }
}

/// Generous limits so workflow tests never trip the limiter.
pub fn relaxed_limits() -> RateLimitConfig {
    let mut limits = RateLimitConfig::default();
    limits.cards_create.limit = 1_000;
    limits.credentials_create.limit = 1_000;
    limits.update.limit = 1_000;
    limits.delete.limit = 1_000;
    limits
}
