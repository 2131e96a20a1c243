//! Tri-state result of a model or group update.

use core::fmt;
use core::ops::{BitOr, BitOrAssign};

/// Outcome of an `update()` call.
///
/// The encoding is a bit set so that outcomes of several members can be
/// OR-combined: `0` success, `1` recoverable error (retry with a smaller
/// outer step), `2` abort. When both bits are set, abort dominates.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Outcome(u8);

impl Outcome {
    pub const SUCCESS: Outcome = Outcome(0);
    pub const RECOVERABLE: Outcome = Outcome(1);
    pub const ABORT: Outcome = Outcome(2);

    /// Raw bit pattern.
    pub fn bits(self) -> u8 {
        self.0
    }

    /// Build an outcome from raw bits, ignoring unknown bits.
    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b11)
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }

    /// True if a retry was requested and nothing aborted.
    pub fn is_recoverable(self) -> bool {
        self.0 & 1 != 0 && !self.is_abort()
    }

    pub fn is_abort(self) -> bool {
        self.0 & 2 != 0
    }

    /// Collapse a combined bit set to its dominant single outcome.
    pub fn dominant(self) -> Outcome {
        if self.is_abort() {
            Outcome::ABORT
        } else if self.is_recoverable() {
            Outcome::RECOVERABLE
        } else {
            Outcome::SUCCESS
        }
    }
}

impl BitOr for Outcome {
    type Output = Outcome;

    fn bitor(self, rhs: Outcome) -> Outcome {
        Outcome(self.0 | rhs.0)
    }
}

impl BitOrAssign for Outcome {
    fn bitor_assign(&mut self, rhs: Outcome) {
        self.0 |= rhs.0;
    }
}

impl FromIterator<Outcome> for Outcome {
    fn from_iter<I: IntoIterator<Item = Outcome>>(iter: I) -> Self {
        iter.into_iter().fold(Outcome::SUCCESS, |acc, o| acc | o)
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Outcome({})", self.0)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.dominant() {
            Outcome::ABORT => write!(f, "abort"),
            Outcome::RECOVERABLE => write!(f, "recoverable error"),
            _ => write!(f, "success"),
        }
    }
}
