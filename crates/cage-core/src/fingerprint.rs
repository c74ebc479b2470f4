//! Tag fingerprints and the filters matched against them.
//!
//! Every agent carries a [`Fingerprint`]; every grid cell keeps the union
//! of its occupants' fingerprints. A [`Filter`] can therefore rule out a
//! whole cell before looking at any of its agents.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A set of up to 64 caller-defined tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fingerprint(pub u64);

impl Fingerprint {
    /// No tags.
    pub const EMPTY: Self = Self(0);

    /// A fingerprint holding the single tag `bit` (0..64).
    pub const fn tag(bit: u32) -> Self {
        Self(1u64 << (bit & 63))
    }

    /// Whether every tag of `other` is present in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether `self` and `other` share any tag.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Whether no tag is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for Fingerprint {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Fingerprint {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Matches agents by required and forbidden tags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Filter {
    /// Tags an agent must have.
    pub include: Fingerprint,
    /// Tags an agent must not have.
    pub exclude: Fingerprint,
}

impl Filter {
    /// A filter that matches everything.
    pub const ANY: Self = Self {
        include: Fingerprint::EMPTY,
        exclude: Fingerprint::EMPTY,
    };

    /// Require all tags in `include`.
    pub const fn including(include: Fingerprint) -> Self {
        Self {
            include,
            exclude: Fingerprint::EMPTY,
        }
    }

    /// Additionally forbid the tags in `exclude`.
    pub const fn excluding(mut self, exclude: Fingerprint) -> Self {
        self.exclude = exclude;
        self
    }

    /// Whether an agent with this fingerprint passes.
    pub const fn matches(&self, fingerprint: Fingerprint) -> bool {
        fingerprint.contains(self.include) && !fingerprint.intersects(self.exclude)
    }

    /// Whether a cell with this aggregate signature can hold a match.
    ///
    /// The signature is a union, so only the `include` half is decidable
    /// at the cell level.
    pub const fn may_match(&self, signature: Fingerprint) -> bool {
        signature.contains(self.include)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const RED: Fingerprint = Fingerprint::tag(0);
    const BLUE: Fingerprint = Fingerprint::tag(1);

    #[test]
    fn include_and_exclude() {
        let f = Filter::including(RED).excluding(BLUE);
        assert!(f.matches(RED));
        assert!(!f.matches(RED | BLUE));
        assert!(!f.matches(BLUE));
        assert!(Filter::ANY.matches(Fingerprint::EMPTY));
    }

    #[test]
    fn cell_signature_gates_on_include_only() {
        let f = Filter::including(RED).excluding(BLUE);
        assert!(f.may_match(RED | BLUE));
        assert!(!f.may_match(BLUE));
    }

    proptest! {
        #[test]
        fn matching_agent_implies_cell_may_match(agent in any::<u64>(), others in any::<u64>(), inc in any::<u64>()) {
            let f = Filter::including(Fingerprint(inc));
            let signature = Fingerprint(agent) | Fingerprint(others);
            if f.matches(Fingerprint(agent)) {
                prop_assert!(f.may_match(signature));
            }
        }
    }
}
