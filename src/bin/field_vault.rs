// src/bin/field_vault.rs
//! Terminal front end for adding, listing, revealing, editing and deleting vault entries
//!
//! Owner is taken from `FIELD_VAULT_OWNER` (default `local`). Every reveal or
//! edit asks for the master password again.

use std::io::Write;

use anyhow::{bail, Context, Result};
use encrypted_field_vault::gate::EditFields;
use encrypted_field_vault::generator::{self, GeneratorOptions};
use encrypted_field_vault::model::{format_expiry, today};
use encrypted_field_vault::{
    logging, secret, CardDraft, CardType, Category, CredentialDraft, EntryId, EntryKind,
    ExposeSecret, FieldUpdate, MasterPassword, MemorySink, OwnerId, RequestContext,
    RequestOutcome, RevealGate, SealedField, SqliteStore, VaultEntry, VaultService,
};
use rpassword::prompt_password;
use tracing::info;

const USAGE: &str = "usage: field_vault <add-login | add-card | list | show <id> <field> | edit-login <id> | edit-card <id> | delete <id> | generate [len] | stats>";

/// Answer that removes an optional sealed field during an edit.
const CLEAR_ANSWER: &str = "-";

fn main() -> Result<()> {
    let config = encrypted_field_vault::load_config().context("Failed to load configuration")?;
    logging::init(&config.logging.filter);

    let owner = OwnerId::new(std::env::var("FIELD_VAULT_OWNER").unwrap_or_else(|_| "local".into()));
    let ctx = RequestContext::new(owner.clone(), "local");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        bail!(USAGE);
    };

    if command == "generate" {
        let length = match args.get(1) {
            Some(raw) => raw.parse::<usize>().context("length must be a number")?,
            None => GeneratorOptions::default().length,
        };
        let password = generator::generate(&GeneratorOptions { length, ..Default::default() })?;
        println!("{}", password.expose_secret());
        return Ok(());
    }

    let store = SqliteStore::open(&config.storage.vault_db).with_context(|| {
        format!("Failed to open vault at {}", config.storage.vault_db.display())
    })?;
    let mut service = VaultService::with_limits(store, config.rate_limit.clone());

    match (command.as_str(), &args[1..]) {
        ("add-login", []) => {
            let draft = CredentialDraft {
                title: ask("Title")?,
                username: ask("Username")?,
                password: FieldUpdate::Set(secret(prompt_password("Password: ")?)),
                website: ask_optional("Website")?,
                category: ask_optional("Category")?
                    .map(|c| c.parse::<Category>())
                    .transpose()?
                    .unwrap_or_default(),
                notes: ask_optional("Notes")?,
                expires_on: None,
            };
            let entry = service.add_credential(&ctx, draft, &master()?)?;
            println!("Added {}", entry.id);
        }
        ("add-card", []) => {
            let draft = CardDraft {
                card_name: ask("Card name")?,
                card_number: FieldUpdate::Set(secret(prompt_password("Card number: ")?)),
                expiry_month: ask("Expiry month (1-12)")?.parse::<u32>().context("invalid month")?,
                expiry_year: ask("Expiry year")?.parse::<i32>().context("invalid year")?,
                cvv: FieldUpdate::Set(secret(prompt_password("CVV: ")?)),
                pin: FieldUpdate::Set(secret(prompt_password("PIN (optional): ")?)),
                cardholder_name: ask("Cardholder name")?,
                bank_name: ask_optional("Bank")?,
                card_type: ask_optional("Type (credit/debit)")?
                    .map(|t| t.parse::<CardType>())
                    .transpose()?
                    .unwrap_or_default(),
                notes: ask_optional("Notes")?,
            };
            let entry = service.add_card(&ctx, draft, &master()?)?;
            println!("Added {}", entry.id);
        }
        ("list", []) => {
            let today = today();
            for entry in service.list(&owner, None)? {
                print_entry(&entry, today);
            }
        }
        ("stats", []) => {
            let stats = service.stats(&owner, today())?;
            println!(
                "Credentials: {} ({} categories, {} expired)",
                stats.total_credentials, stats.categories, stats.expired_credentials
            );
            println!("Cards:       {} ({} expired)", stats.total_cards, stats.expired_cards);
        }
        ("show", [id, field]) => {
            let entry = service.get(&owner, &EntryId::from(id.as_str()))?;
            let field: SealedField = field.parse()?;
            let mut gate = RevealGate::new(owner.clone(), MemorySink::new());
            if gate.request_reveal(&entry, field)? == RequestOutcome::Hidden {
                return Ok(());
            }
            match gate.submit(master()?) {
                Ok(_) => {
                    if let Some(value) = gate.sink().visible(&entry.id, field) {
                        println!("{}: {value}", field.label());
                    }
                }
                Err(err) => bail!(err.user_message()),
            }
        }
        ("edit-login", [id]) => {
            let id = EntryId::from(id.as_str());
            let (entry, current, master) = load_for_edit(&service, &owner, &id, EntryKind::Credential)?;
            let draft = edit_login_draft(&entry, &current)?;
            drop(current);
            service.update_credential(&ctx, &id, draft, &master)?;
            println!("Updated {id}");
        }
        ("edit-card", [id]) => {
            let id = EntryId::from(id.as_str());
            let (entry, current, master) = load_for_edit(&service, &owner, &id, EntryKind::Card)?;
            let draft = edit_card_draft(&entry, &current)?;
            drop(current);
            service.update_card(&ctx, &id, draft, &master)?;
            println!("Updated {id}");
        }
        ("delete", [id]) => {
            let id = EntryId::from(id.as_str());
            let entry = service.get(&owner, &id)?;
            let answer = ask(&format!("Delete '{}'? [y/N]", entry.label()))?;
            if !answer.eq_ignore_ascii_case("y") {
                println!("Kept {id}");
                return Ok(());
            }
            service.delete(&ctx, &id)?;
            println!("Deleted {id}");
        }
        _ => bail!(USAGE),
    }

    info!(command = %command, "done");
    Ok(())
}

/// Fetch `id`, then open all of its sealed fields through the gate.
///
/// Returns the master password too: the update that follows seals with it.
fn load_for_edit(
    service: &VaultService<SqliteStore>,
    owner: &OwnerId,
    id: &EntryId,
    kind: EntryKind,
) -> Result<(VaultEntry, EditFields, MasterPassword)> {
    let entry = service.get(owner, id)?;
    if entry.kind() != kind {
        bail!("{id} is not a {}", kind.as_str());
    }
    let mut gate = RevealGate::new(owner.clone(), MemorySink::new());
    gate.request_edit(&entry)?;
    let master = master()?;
    if let Err(err) = gate.submit(secret(master.expose_secret())) {
        bail!(err.user_message());
    }
    let Some((_, current)) = gate.sink_mut().take_edit_form() else {
        bail!("edit form was not loaded");
    };
    Ok((entry, current, master))
}

fn show_current(current: &EditFields) {
    for (field, value) in current {
        println!("Current {}: {}", field.label(), mask_tail(value.expose_secret()));
    }
    println!("Leave a field empty to keep its current value.");
}

fn edit_login_draft(entry: &VaultEntry, current: &EditFields) -> Result<CredentialDraft> {
    let Some(login) = entry.as_credential() else {
        bail!("{} is not a login", entry.id);
    };
    show_current(current);

    let category = ask_optional(&format!("Category [{}]", login.category.as_str()))?;
    Ok(CredentialDraft {
        title: ask_optional(&format!("Title [{}]", login.title))?
            .unwrap_or_else(|| login.title.clone()),
        username: ask_optional(&format!("Username [{}]", login.username))?
            .unwrap_or_else(|| login.username.clone()),
        password: field_answer(
            prompt_password("New password: ")?,
            current_value(current, SealedField::Password),
            false,
        ),
        website: ask_optional(&format!("Website [{}]", login.website.as_deref().unwrap_or("")))?
            .or_else(|| login.website.clone()),
        category: category
            .map(|c| c.parse::<Category>())
            .transpose()?
            .unwrap_or(login.category),
        notes: login.notes.clone(),
        expires_on: login.expires_on,
    })
}

fn edit_card_draft(entry: &VaultEntry, current: &EditFields) -> Result<CardDraft> {
    let Some(card) = entry.as_card() else {
        bail!("{} is not a card", entry.id);
    };
    show_current(current);
    println!("Enter '{CLEAR_ANSWER}' as the PIN to remove it.");

    let month = ask_optional(&format!("Expiry month [{}]", card.expiry_month))?;
    let year = ask_optional(&format!("Expiry year [{}]", card.expiry_year))?;
    Ok(CardDraft {
        card_name: ask_optional(&format!("Card name [{}]", card.card_name))?
            .unwrap_or_else(|| card.card_name.clone()),
        card_number: field_answer(
            prompt_password("New card number: ")?,
            current_value(current, SealedField::CardNumber),
            false,
        ),
        expiry_month: month.map(|m| m.parse::<u32>()).transpose()?.unwrap_or(card.expiry_month),
        expiry_year: year.map(|y| y.parse::<i32>()).transpose()?.unwrap_or(card.expiry_year),
        cvv: field_answer(
            prompt_password("New CVV: ")?,
            current_value(current, SealedField::Cvv),
            false,
        ),
        pin: field_answer(
            prompt_password("New PIN: ")?,
            current_value(current, SealedField::Pin),
            true,
        ),
        cardholder_name: ask_optional(&format!("Cardholder [{}]", card.cardholder_name))?
            .unwrap_or_else(|| card.cardholder_name.clone()),
        bank_name: card.bank_name.clone(),
        card_type: card.card_type,
        notes: card.notes.clone(),
    })
}

fn current_value(current: &EditFields, field: SealedField) -> Option<&str> {
    current
        .iter()
        .find(|(f, _)| *f == field)
        .map(|(_, value)| value.expose_secret())
}

/// Turn an edit prompt answer into an update.
///
/// Empty reuses the plaintext loaded for the form, so the field is sealed
/// again rather than copied. `-` clears the field when `clearable`.
fn field_answer(answer: String, current: Option<&str>, clearable: bool) -> FieldUpdate {
    match (answer.as_str(), current) {
        (CLEAR_ANSWER, _) if clearable => FieldUpdate::Clear,
        ("", Some(value)) => FieldUpdate::set(value),
        ("", None) => FieldUpdate::Keep,
        _ => FieldUpdate::Set(secret(answer)),
    }
}

fn print_entry(entry: &VaultEntry, today: chrono::NaiveDate) {
    let expired = if entry.is_expired(today) { " [expired]" } else { "" };
    match (entry.as_credential(), entry.as_card()) {
        (Some(c), _) => println!(
            "{}  login  {:<24} {:<20} {}{expired}",
            entry.id,
            c.title,
            c.username,
            c.category.as_str()
        ),
        (_, Some(c)) => println!(
            "{}  card   {:<24} {:<20} {}{expired}",
            entry.id,
            c.card_name,
            c.cardholder_name,
            format_expiry(c)
        ),
        _ => {}
    }
}

/// All but the last four characters replaced with `*`.
fn mask_tail(value: &str) -> String {
    let len = value.chars().count();
    value
        .chars()
        .enumerate()
        .map(|(i, c)| if i + 4 < len { '*' } else { c })
        .collect()
}

fn master() -> Result<MasterPassword> {
    Ok(secret(prompt_password("Master password: ")?))
}

fn ask(label: &str) -> Result<String> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn ask_optional(label: &str) -> Result<Option<String>> {
    Ok(Some(ask(label)?).filter(|v| !v.is_empty()))
}
