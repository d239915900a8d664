// src/generator.rs
//! Random password generation from a configurable character set

use rand::Rng;

use crate::aliases::{secret, SecretString};
use crate::error::{CoreError, Result};

pub const MIN_LENGTH: usize = 4;
pub const MAX_LENGTH: usize = 50;

const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const NUMBERS: &str = "0123456789";
const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";
const AMBIGUOUS: &str = "il1Lo0O";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub symbols: bool,
    pub exclude_ambiguous: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: 16,
            lowercase: true,
            uppercase: true,
            numbers: true,
            symbols: true,
            exclude_ambiguous: false,
        }
    }
}

impl GeneratorOptions {
    fn charset(&self) -> Vec<char> {
        [
            (self.lowercase, LOWERCASE),
            (self.uppercase, UPPERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, set)| set.chars())
        .filter(|c| !(self.exclude_ambiguous && AMBIGUOUS.contains(*c)))
        .collect()
    }
}

/// Draw `options.length` characters uniformly from the selected sets.
pub fn generate(options: &GeneratorOptions) -> Result<SecretString> {
    if !(MIN_LENGTH..=MAX_LENGTH).contains(&options.length) {
        return Err(CoreError::Validation(format!(
            "length must be between {MIN_LENGTH} and {MAX_LENGTH}"
        )));
    }
    let charset = options.charset();
    if charset.is_empty() {
        return Err(CoreError::Validation(
            "select at least one character type".to_string(),
        ));
    }

    let mut rng = rand::rng();
    let password: String = (0..options.length)
        .map(|_| charset[rng.random_range(0..charset.len())])
        .collect();
    Ok(secret(password))
}
