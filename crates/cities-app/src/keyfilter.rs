// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use regex::Regex;
use std::sync::OnceLock;

/// Digits, plus the backspace control character.
pub const DEFAULT_KEY_PATTERN: &str = r"^[0-9\x08]+$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    Allow,
    Suppress,
}

impl KeyDisposition {
    pub const fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }
}

fn default_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| match Regex::new(DEFAULT_KEY_PATTERN) {
        Ok(regex) => regex,
        Err(error) => unreachable!("default key pattern must compile: {error}"),
    })
}

/// Tests the single character a key press would insert against `pattern`
/// (digits only when `None`).
pub fn filter_key(ch: char, pattern: Option<&Regex>) -> KeyDisposition {
    let pattern = match pattern {
        Some(pattern) => pattern,
        None => default_pattern(),
    };
    let mut buf = [0_u8; 4];
    if pattern.is_match(ch.encode_utf8(&mut buf)) {
        KeyDisposition::Allow
    } else {
        KeyDisposition::Suppress
    }
}

#[cfg(test)]
mod tests {
    use super::{KeyDisposition, filter_key};
    use anyhow::Result;
    use regex::Regex;

    #[test]
    fn default_pattern_allows_digits_only() {
        for ch in '0'..='9' {
            assert_eq!(filter_key(ch, None), KeyDisposition::Allow, "{ch:?}");
        }
        for ch in ['a', 'Z', ' ', '-', '.', '+', '/', 'é', '٣'] {
            assert_eq!(filter_key(ch, None), KeyDisposition::Suppress, "{ch:?}");
        }
    }

    #[test]
    fn default_pattern_allows_backspace_control_char() {
        assert!(filter_key('\u{8}', None).is_allowed());
    }

    #[test]
    fn custom_pattern_replaces_default() -> Result<()> {
        let letters = Regex::new("^[a-z]$")?;
        assert!(filter_key('q', Some(&letters)).is_allowed());
        assert!(!filter_key('7', Some(&letters)).is_allowed());
        Ok(())
    }

    #[test]
    fn pattern_borrowed_for_one_call_is_accepted() -> Result<()> {
        let allowed = String::from("^[xy]$");
        let pattern = Regex::new(&allowed)?;
        let results: Vec<_> = ['x', 'y', 'z']
            .into_iter()
            .map(|ch| filter_key(ch, Some(&pattern)))
            .collect();
        drop(pattern);
        assert_eq!(
            results,
            [
                KeyDisposition::Allow,
                KeyDisposition::Allow,
                KeyDisposition::Suppress
            ]
        );
        Ok(())
    }
}
