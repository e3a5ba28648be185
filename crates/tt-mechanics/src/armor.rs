//! Armor class adjustments.
//!
//! AC has no floor or ceiling; a GM may push it to zero or below.

use std::fmt;

/// Replace the armor class.
pub fn set_ac(_ac: i32, value: i32) -> i32 {
    value
}

/// Adjust the armor class by a signed delta.
pub fn modify_ac(ac: i32, delta: i32) -> i32 {
    ac.saturating_add(delta)
}

/// A single armor class transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcChange {
    /// See [`set_ac`].
    Set(i32),
    /// See [`modify_ac`].
    Modify(i32),
}

impl AcChange {
    /// Compute the next armor class.
    pub fn apply(self, ac: i32) -> i32 {
        match self {
            Self::Set(v) => set_ac(ac, v),
            Self::Modify(d) => modify_ac(ac, d),
        }
    }
}

impl fmt::Display for AcChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(v) => write!(f, "AC set to {v}"),
            Self::Modify(d) => write!(f, "AC {d:+}"),
        }
    }
}
