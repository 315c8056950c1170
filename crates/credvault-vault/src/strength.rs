// SPDX-FileCopyrightText: 2026 Credvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password strength scoring.
//!
//! [`score`] is a pure, deterministic function in `[0, 100]`. Callers gate
//! vault creation and rotation on a configured minimum via [`check`].

use credvault_core::VaultError;

/// Lowercased prefixes that mark a password as trivially guessable.
const WEAK_PREFIXES: &[&str] = &["password", "123456", "qwerty", "letmein", "admin"];

/// Identical consecutive characters that count as a repeated run.
const REPEAT_RUN: usize = 4;

/// Coarse classification of a strength score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PasswordStrength {
    VeryWeak,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl PasswordStrength {
    /// Classify a score from [`score`].
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=19 => Self::VeryWeak,
            20..=39 => Self::Weak,
            40..=59 => Self::Moderate,
            60..=79 => Self::Strong,
            _ => Self::VeryStrong,
        }
    }

    /// Human-readable label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::VeryWeak => "very weak",
            Self::Weak => "weak",
            Self::Moderate => "moderate",
            Self::Strong => "strong",
            Self::VeryStrong => "very strong",
        }
    }
}

/// Score a candidate master password.
pub fn score(password: &str) -> u8 {
    let len = password.chars().count();
    let mut total: i32 = 0;

    if len >= 8 {
        total += 20;
    }
    if len >= 12 {
        total += 20;
    }
    if len >= 16 {
        total += 10;
    }

    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_symbol = password
        .chars()
        .any(|c| !c.is_alphanumeric() && !c.is_whitespace());
    total += 10
        * (i32::from(has_lowercase)
            + i32::from(has_uppercase)
            + i32::from(has_digit)
            + i32::from(has_symbol));

    let lowered = password.to_lowercase();
    if WEAK_PREFIXES.iter().any(|p| lowered.starts_with(p)) {
        total -= 30;
    }
    if has_repeated_run(password, REPEAT_RUN) {
        total -= 20;
    }

    total.clamp(0, 100) as u8
}

/// Fail with [`VaultError::WeakPassword`] when `password` scores below `min_score`.
pub fn check(password: &str, min_score: u8) -> Result<u8, VaultError> {
    let score = score(password);
    if score < min_score {
        return Err(VaultError::WeakPassword {
            score,
            required: min_score,
        });
    }
    Ok(score)
}

fn has_repeated_run(password: &str, run: usize) -> bool {
    let mut previous = None;
    let mut count = 0;
    for c in password.chars() {
        if Some(c) == previous {
            count += 1;
        } else {
            previous = Some(c);
            count = 1;
        }
        if count >= run {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn example_master_passwords_pass_default_threshold() {
        assert!(score("Tr0ub4dor&3xyz!") >= 60);
        assert!(score("N3wP@ssphrase#99") >= 60);
    }

    #[test]
    fn short_simple_password_is_very_weak() {
        assert_eq!(score("abc"), 10);
        assert_eq!(PasswordStrength::from_score(score("abc")), PasswordStrength::VeryWeak);
    }

    #[test]
    fn length_and_classes_accumulate() {
        // 12 chars, lowercase + digit.
        assert_eq!(score("abcdefgh1234"), 60);
        // 16 chars, all four classes.
        assert_eq!(score("Abcdefgh1234!xyz"), 90);
    }

    #[test]
    fn weak_prefix_is_penalized() {
        let plain = score("Xassword123!");
        let weak = score("Password123!");
        assert_eq!(plain - weak, 30);
    }

    #[test]
    fn repeated_run_is_penalized() {
        assert_eq!(score("Abcd1234!xyz") - score("Abbbb234!xyz"), 20);
        // Three in a row is fine.
        assert_eq!(score("Abbb1234!xyz"), score("Abcd1234!xyz"));
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        // Eight multi-byte characters.
        assert_eq!(score("éééaéééa"), 20 + 10);
    }

    #[test]
    fn check_reports_score_and_threshold() {
        match check("qwerty", 60) {
            Err(VaultError::WeakPassword { score, required }) => {
                assert_eq!(score, 0);
                assert_eq!(required, 60);
            }
            other => panic!("expected WeakPassword, got {other:?}"),
        }
        assert!(check("Tr0ub4dor&3xyz!", 60).is_ok());
    }

    #[test]
    fn strength_classes_are_ordered() {
        assert!(PasswordStrength::from_score(85) > PasswordStrength::from_score(65));
        assert_eq!(PasswordStrength::from_score(60).description(), "strong");
    }

    proptest! {
        #[test]
        fn score_is_always_in_range(password in ".{0,64}") {
            let s = score(&password);
            prop_assert!(s <= 100);
        }

        #[test]
        fn score_is_deterministic(password in ".{0,64}") {
            prop_assert_eq!(score(&password), score(&password));
        }
    }
}
