//! Keyboard modifiers held when a plug-in was activated

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bit mask of the modifier keys held when a plug-in was activated.
///
/// Plug-ins may use these to offer alternate behaviour, for example
/// holding Shift to skip a confirmation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActivationModifiers(u32);

impl ActivationModifiers {
    pub const NONE: Self = Self(0);
    pub const SHIFT: Self = Self(1);
    pub const CTRL: Self = Self(1 << 1);
    pub const ALT: Self = Self(1 << 2);
    pub const META: Self = Self(1 << 3);

    const NAMED: [(Self, &'static str); 4] = [
        (Self::SHIFT, "shift"),
        (Self::CTRL, "ctrl"),
        (Self::ALT, "alt"),
        (Self::META, "meta"),
    ];

    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Check if every modifier in `other` is held.
    pub const fn contains(&self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ActivationModifiers {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ActivationModifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for ActivationModifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names: Vec<&str> = Self::NAMED
            .iter()
            .filter(|(modifier, _)| self.contains(*modifier))
            .map(|(_, name)| *name)
            .collect();
        let unnamed = self.0 & !Self::NAMED.iter().fold(0, |acc, (m, _)| acc | m.0);
        if unnamed == 0 {
            f.write_str(&names.join("+"))
        } else if names.is_empty() {
            write!(f, "{unnamed:#x}")
        } else {
            write!(f, "{}+{unnamed:#x}", names.join("+"))
        }
    }
}

#[cfg(test)]
#[path = "modifiers/modifiers_tests.rs"]
mod modifiers_tests;
