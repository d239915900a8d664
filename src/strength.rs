// src/strength.rs
//! Heuristic password strength score, 0–100

use std::fmt;

/// Scores below this count as weak in the vault audit.
pub const WEAK_THRESHOLD: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StrengthLevel {
    Empty,
    VeryWeak,
    Weak,
    Fair,
    Good,
    Strong,
}

impl StrengthLevel {
    pub fn label(&self) -> &'static str {
        match self {
            StrengthLevel::Empty => "No password",
            StrengthLevel::VeryWeak => "Very Weak",
            StrengthLevel::Weak => "Weak",
            StrengthLevel::Fair => "Fair",
            StrengthLevel::Good => "Good",
            StrengthLevel::Strong => "Strong",
        }
    }

    fn from_score(score: u8) -> Self {
        match score {
            0..=29 => StrengthLevel::VeryWeak,
            30..=49 => StrengthLevel::Weak,
            50..=69 => StrengthLevel::Fair,
            70..=84 => StrengthLevel::Good,
            _ => StrengthLevel::Strong,
        }
    }
}

impl fmt::Display for StrengthLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Strength {
    pub score: u8,
    pub level: StrengthLevel,
}

impl Strength {
    pub fn is_weak(&self) -> bool {
        self.score < WEAK_THRESHOLD
    }
}

pub fn score(password: &str) -> Strength {
    if password.is_empty() {
        return Strength { score: 0, level: StrengthLevel::Empty };
    }

    let len = password.chars().count();
    let checks = [
        (len >= 8, 20),
        (password.chars().any(|c| c.is_ascii_lowercase()), 15),
        (password.chars().any(|c| c.is_ascii_uppercase()), 15),
        (password.chars().any(|c| c.is_ascii_digit()), 15),
        (password.chars().any(|c| !c.is_ascii_alphanumeric()), 20),
        (len >= 12, 15),
    ];
    let score = checks
        .iter()
        .filter(|(passed, _)| *passed)
        .map(|(_, points)| *points)
        .sum::<u8>();

    Strength { score, level: StrengthLevel::from_score(score) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_its_own_level() {
        let s = score("");
        assert_eq!(s.score, 0);
        assert_eq!(s.level.label(), "No password");
    }

    #[test]
    fn scores_add_up() {
        assert_eq!(score("abc").score, 15);
        assert_eq!(score("abcdefgh").score, 35);
        assert_eq!(score("Abcdefg1").score, 65);
        assert_eq!(score("Correct-Horse-1").score, 100);
        assert_eq!(score("Correct-Horse-1").level, StrengthLevel::Strong);
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(score("abc").level, StrengthLevel::VeryWeak);
        assert_eq!(score("abcdefgh").level, StrengthLevel::Weak);
        assert_eq!(score("Abcdefg1").level, StrengthLevel::Fair);
        assert_eq!(score("Abcdefgh!").level, StrengthLevel::Good);
        assert_eq!(score("Abcdefg1!").level, StrengthLevel::Strong);
        assert!(score("hunter2").is_weak());
    }
}
