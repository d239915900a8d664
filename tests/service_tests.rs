// tests/service_tests.rs
mod common;

use chrono::NaiveDate;
use encrypted_field_vault::aliases::{secret, ExposeSecret};
use encrypted_field_vault::config::RateLimitConfig;
use encrypted_field_vault::core::decrypt_field;
use encrypted_field_vault::db::{MemoryStore, SqliteStore, VaultStore};
use encrypted_field_vault::error::CoreError;
use encrypted_field_vault::gate::{MemorySink, Resolution, RevealGate};
use encrypted_field_vault::service::{CardDraft, FieldUpdate, RequestContext, VaultService};
use encrypted_field_vault::{EntryKind, OwnerId, SealedField};
use rusqlite::{params, Connection};
use tempfile::tempdir;

fn memory_service() -> VaultService<MemoryStore> {
    VaultService::with_limits(MemoryStore::new(), common::relaxed_limits())
}

fn report_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

#[test]
fn test_added_card_is_stored_as_tokens() {
    common::setup();
    let mut svc = memory_service();
    let entry = svc
        .add_card(&common::ctx(), common::card_draft(Some("4321")), &common::master())
        .unwrap();

    let card = entry.as_card().unwrap();
    let json = serde_json::to_string(&entry).unwrap();
    assert!(!json.contains("4111111111111111"));
    assert!(card.encrypted_pin.is_some());

    let number = decrypt_field(&card.encrypted_card_number.to_string(), &common::master()).unwrap();
    assert_eq!(number.expose_secret(), "4111111111111111");
}

#[test]
fn test_card_without_pin_has_no_pin_token() {
    let mut svc = memory_service();
    let entry = svc
        .add_card(&common::ctx(), common::card_draft(None), &common::master())
        .unwrap();
    assert!(entry.sealed(SealedField::Pin).is_none());
    assert_eq!(entry.sealed_fields().len(), 2);
}

#[test]
fn test_update_reseals_every_field_under_fresh_salts() {
    let mut svc = memory_service();
    let ctx = common::ctx();
    let original = svc
        .add_card(&ctx, common::card_draft(Some("4321")), &common::master())
        .unwrap();
    let before = original.as_card().unwrap().clone();

    let draft = CardDraft {
        cvv: FieldUpdate::set("999"),
        pin: FieldUpdate::Clear,
        card_number: FieldUpdate::Keep,
        ..common::card_draft(None)
    };
    let updated = svc
        .update_card(&ctx, &original.id, draft, &common::master())
        .unwrap();
    let after = updated.as_card().unwrap();

    assert_ne!(after.encrypted_card_number, before.encrypted_card_number);
    assert_ne!(
        after.encrypted_card_number.salt_hex(),
        before.encrypted_card_number.salt_hex()
    );
    assert_ne!(after.encrypted_cvv, before.encrypted_cvv);
    assert!(after.encrypted_pin.is_none());
    assert!(updated.updated_at >= original.updated_at);
    assert_eq!(updated.created_at, original.created_at);

    let number = decrypt_field(&after.encrypted_card_number.to_string(), &common::master()).unwrap();
    assert_eq!(number.expose_secret(), "4111111111111111");
    let cvv = decrypt_field(&after.encrypted_cvv.to_string(), &common::master()).unwrap();
    assert_eq!(cvv.expose_secret(), "999");
}

#[test]
fn test_update_under_another_master_password_is_refused() {
    let mut svc = memory_service();
    let ctx = common::ctx();
    let original = svc
        .add_card(&ctx, common::card_draft(Some("4321")), &common::master())
        .unwrap();

    let draft = CardDraft {
        card_number: FieldUpdate::Keep,
        cvv: FieldUpdate::set("999"),
        pin: FieldUpdate::Keep,
        ..common::card_draft(None)
    };
    let err = svc
        .update_card(&ctx, &original.id, draft, &secret("Other-Master-22"))
        .unwrap_err();
    assert!(matches!(err, CoreError::WrongMasterPassword));

    let stored = svc.get(&common::owner(), &original.id).unwrap();
    assert_eq!(stored, original);

    let mut gate = RevealGate::new(common::owner(), MemorySink::new());
    gate.request_edit(&stored).unwrap();
    assert!(matches!(
        gate.submit(common::master()).unwrap(),
        Resolution::LoadedForEdit { .. }
    ));
}

#[test]
fn test_other_owner_cannot_see_update_or_delete() {
    let mut svc = memory_service();
    let entry = svc
        .add_credential(&common::ctx(), common::login_draft("Mail", "hunter2"), &common::master())
        .unwrap();

    let mallory = RequestContext::new(OwnerId::new("mallory"), "198.51.100.1");
    assert!(matches!(
        svc.get(&mallory.owner, &entry.id),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(
        svc.update_credential(&mallory, &entry.id, common::login_draft("X", "y"), &common::master()),
        Err(CoreError::NotFound(_))
    ));
    assert!(matches!(svc.delete(&mallory, &entry.id), Err(CoreError::NotFound(_))));
    assert!(svc.list(&mallory.owner, None).unwrap().is_empty());

    svc.delete(&common::ctx(), &entry.id).unwrap();
    assert!(svc.list(&common::owner(), None).unwrap().is_empty());
}

#[test]
fn test_card_creation_is_rate_limited_per_client() {
    let mut svc = VaultService::with_limits(MemoryStore::new(), RateLimitConfig::default());
    let ctx = common::ctx();

    for _ in 0..10 {
        svc.add_card(&ctx, common::card_draft(None), &common::master())
            .unwrap();
    }
    let err = svc
        .add_card(&ctx, common::card_draft(None), &common::master())
        .unwrap_err();
    assert!(matches!(err, CoreError::RateLimited { .. }));
    assert_eq!(err.user_message(), "Too many requests. Please try again later.");

    let other_client = RequestContext::new(common::owner(), "192.0.2.44");
    assert!(svc
        .add_card(&other_client, common::card_draft(None), &common::master())
        .is_ok());
}

#[test]
fn test_registration_is_rate_limited() {
    let svc = VaultService::with_limits(MemoryStore::new(), RateLimitConfig::default());
    let ctx = common::ctx();
    for _ in 0..5 {
        let _ = svc.register_master_password(&ctx, &secret("short"));
    }
    assert!(matches!(
        svc.register_master_password(&ctx, &common::master()),
        Err(CoreError::RateLimited { .. })
    ));
}

#[test]
fn test_stats_count_expired_entries() {
    let mut svc = memory_service();
    let ctx = common::ctx();
    svc.add_card(&ctx, common::card_draft(None), &common::master())
        .unwrap();
    let old = CardDraft {
        expiry_month: 1,
        expiry_year: 2020,
        ..common::card_draft(None)
    };
    svc.add_card(&ctx, old, &common::master()).unwrap();
    svc.add_credential(&ctx, common::login_draft("Mail", "hunter2"), &common::master())
        .unwrap();

    let stats = svc
        .stats(&common::owner(), report_day())
        .unwrap();
    assert_eq!(stats.total_cards, 2);
    assert_eq!(stats.expired_cards, 1);
    assert_eq!(stats.total_credentials, 1);
    assert_eq!(stats.categories, 1);
    assert_eq!(stats.expired_credentials, 0);
}

#[test]
fn test_sqlite_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("nested").join("vault.db");

    let id = {
        let store = SqliteStore::open(&db_path).unwrap();
        let mut svc = VaultService::with_limits(store, common::relaxed_limits());
        svc.add_credential(&common::ctx(), common::login_draft("Mail", "hunter2"), &common::master())
            .unwrap()
            .id
    };

    let store = SqliteStore::open(&db_path).unwrap();
    let svc = VaultService::with_limits(store, common::relaxed_limits());
    let entry = svc.get(&common::owner(), &id).unwrap();
    let token = entry.sealed(SealedField::Password).unwrap();
    let plain = decrypt_field(&token.to_string(), &common::master()).unwrap();
    assert_eq!(plain.expose_secret(), "hunter2");
}

#[test]
fn test_sqlite_list_filters_by_kind_and_sorts_newest_first() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut svc = VaultService::with_limits(store, common::relaxed_limits());
    let ctx = common::ctx();

    let first = svc
        .add_credential(&ctx, common::login_draft("First", "a"), &common::master())
        .unwrap();
    svc.add_card(&ctx, common::card_draft(None), &common::master())
        .unwrap();
    let second = svc
        .add_credential(&ctx, common::login_draft("Second", "b"), &common::master())
        .unwrap();

    let logins = svc.list(&common::owner(), Some(EntryKind::Credential)).unwrap();
    assert_eq!(logins.len(), 2);
    assert!(logins[0].updated_at >= logins[1].updated_at);
    assert!(logins.iter().any(|e| e.id == first.id));
    assert!(logins.iter().any(|e| e.id == second.id));

    assert_eq!(svc.store().list(&common::owner(), Some(EntryKind::Card)).unwrap().len(), 1);
    assert_eq!(svc.list(&common::owner(), None).unwrap().len(), 3);
}

#[test]
fn test_damaged_stored_token_only_affects_its_own_entry() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("vault.db");

    let (login, card) = {
        let store = SqliteStore::open(&db_path).unwrap();
        let mut svc = VaultService::with_limits(store, common::relaxed_limits());
        let login = svc
            .add_credential(&common::ctx(), common::login_draft("Mail", "hunter2"), &common::master())
            .unwrap();
        let card = svc
            .add_card(&common::ctx(), common::card_draft(Some("4321")), &common::master())
            .unwrap();
        (login, card)
    };

    {
        let conn = Connection::open(&db_path).unwrap();
        let body: String = conn
            .query_row("SELECT body FROM entries WHERE id = ?1", [card.id.as_str()], |r| r.get(0))
            .unwrap();
        let mut json: serde_json::Value = serde_json::from_str(&body).unwrap();
        json["encrypted_cvv"] = serde_json::Value::String("deadbeef".into());
        conn.execute(
            "UPDATE entries SET body = ?1 WHERE id = ?2",
            params![json.to_string(), card.id.as_str()],
        )
        .unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    let svc = VaultService::with_limits(store, common::relaxed_limits());
    assert_eq!(svc.list(&common::owner(), None).unwrap().len(), 2);
    let stats = svc.stats(&common::owner(), report_day()).unwrap();
    assert_eq!((stats.total_credentials, stats.total_cards), (1, 1));

    let damaged = svc.get(&common::owner(), &card.id).unwrap();
    let mut gate = RevealGate::new(common::owner(), MemorySink::new());

    gate.request_reveal(&damaged, SealedField::Cvv).unwrap();
    let err = gate.submit(common::master()).unwrap_err();
    assert!(matches!(err, CoreError::MalformedToken(_)));
    assert_eq!(err.user_message(), "This entry's data is corrupted");
    assert_eq!(gate.sink().visible_count(), 0);

    gate.request_edit(&damaged).unwrap();
    assert!(matches!(
        gate.submit(common::master()),
        Err(CoreError::MalformedToken(_))
    ));
    assert!(gate.sink().edit_form().is_none());

    gate.request_reveal(&damaged, SealedField::CardNumber).unwrap();
    gate.submit(common::master()).unwrap();
    assert_eq!(
        gate.sink().visible(&card.id, SealedField::CardNumber),
        Some("4111111111111111")
    );

    let login = svc.get(&common::owner(), &login.id).unwrap();
    gate.request_reveal(&login, SealedField::Password).unwrap();
    gate.submit(common::master()).unwrap();
    assert_eq!(gate.sink().visible(&login.id, SealedField::Password), Some("hunter2"));
}
