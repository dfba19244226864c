//! Bundle load priorities.

use crate::BundleError;
use std::fmt;
use std::str::FromStr;

/// Load priority of a bundle; lower values load first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Priority(i32);

impl Priority {
    /// Game components that other plug-ins build on.
    pub const GAME: Priority = Priority(100);
    /// Expansions of a game.
    pub const EXPANSION: Priority = Priority(500);
    /// Loads ahead of ordinary plug-ins.
    pub const HIGH: Priority = Priority(1000);
    /// The default.
    pub const NORMAL: Priority = Priority(5000);
    /// Loads after ordinary plug-ins.
    pub const LOW: Priority = Priority(10000);

    const NAMED: [(&'static str, Priority); 5] = [
        ("HIGH", Self::HIGH),
        ("GAME", Self::GAME),
        ("EXPANSION", Self::EXPANSION),
        ("NORMAL", Self::NORMAL),
        ("LOW", Self::LOW),
    ];

    /// Create a priority from its numeric value.
    #[must_use]
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// The numeric value.
    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }

    /// The keyword for named levels.
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        Self::NAMED
            .iter()
            .find(|(_, priority)| priority == self)
            .map(|(name, _)| *name)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl FromStr for Priority {
    type Err = BundleError;

    /// Parse a keyword (any case) or a decimal integer.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let starts_with_letter = text
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$');

        if starts_with_letter {
            let upper = text.to_uppercase();
            Self::NAMED
                .iter()
                .find(|(name, _)| *name == upper)
                .map(|(_, priority)| *priority)
                .ok_or_else(|| BundleError::InvalidPriority(text.to_string()))
        } else {
            text.parse::<i32>()
                .map(Self)
                .map_err(|_| BundleError::InvalidPriority(text.to_string()))
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.keyword() {
            Some(keyword) => f.write_str(keyword),
            None => write!(f, "{}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use test_case::test_case;

    #[test]
    fn Priority___named_levels___have_fixed_values() {
        assert_eq!(Priority::HIGH.value(), 1000);
        assert_eq!(Priority::GAME.value(), 100);
        assert_eq!(Priority::EXPANSION.value(), 500);
        assert_eq!(Priority::NORMAL.value(), 5000);
        assert_eq!(Priority::LOW.value(), 10000);
    }

    #[test]
    fn Priority___sort___ascending_numeric() {
        let mut priorities = vec![
            Priority::LOW,
            Priority::HIGH,
            Priority::GAME,
            Priority::new(7),
        ];

        priorities.sort();

        assert_eq!(
            priorities,
            vec![
                Priority::new(7),
                Priority::GAME,
                Priority::HIGH,
                Priority::LOW
            ]
        );
    }

    #[test_case("HIGH", 1000)]
    #[test_case("high", 1000)]
    #[test_case(" Game ", 100)]
    #[test_case("expansion", 500)]
    #[test_case("NORMAL", 5000)]
    #[test_case("low", 10000)]
    #[test_case("7", 7)]
    #[test_case("-20", -20)]
    fn Priority___from_str___parses_keyword_or_integer(text: &str, expected: i32) {
        assert_eq!(text.parse::<Priority>().unwrap().value(), expected);
    }

    #[test_case("URGENT")]
    #[test_case("12x")]
    #[test_case("")]
    fn Priority___from_str___rejects_malformed(text: &str) {
        assert!(matches!(
            text.parse::<Priority>(),
            Err(BundleError::InvalidPriority(_))
        ));
    }

    #[test]
    fn Priority___display___keyword_for_named_levels() {
        assert_eq!(Priority::GAME.to_string(), "GAME");
        assert_eq!(Priority::new(42).to_string(), "42");
    }

    #[test]
    fn Priority___default___is_normal() {
        assert_eq!(Priority::default(), Priority::NORMAL);
    }
}
