//! Layout requirement flags.
//!
//! ## Purpose
//!
//! This module defines the bit set a caller uses to state which layout
//! properties an adapted array must have before it reaches the engine.
//!
//! ## Design notes
//!
//! * **Bit set**: A `u8` newtype with `|` composition, mirroring the flag words
//!   host array runtimes use for the same purpose.
//! * **ENSURECOPY**: A request rather than a property; no existing buffer ever
//!   satisfies it.
//!
//! ## Key concepts
//!
//! * **DEFAULT**: `ALIGNED | NOTSWAPPED`, the requirement applied to inputs and
//!   outputs unless configured otherwise.

// External dependencies
use core::fmt::{Debug, Formatter, Result};
use core::ops::{BitOr, BitOrAssign};

// ============================================================================
// Requirements
// ============================================================================

/// Set of layout properties an adapted array must have.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Requirements(u8);

impl Requirements {
    /// No requirement.
    pub const NONE: Self = Self(0);

    /// Elements are stored in native byte order.
    pub const NOTSWAPPED: Self = Self(1 << 0);

    /// Every element address is a multiple of the item size.
    pub const ALIGNED: Self = Self(1 << 1);

    /// Elements are laid out densely in C (row-major) order.
    pub const C_CONTIGUOUS: Self = Self(1 << 2);

    /// The storage may be written.
    pub const WRITEABLE: Self = Self(1 << 3);

    /// A private copy is always made.
    pub const ENSURECOPY: Self = Self(1 << 4);

    /// Requirement applied when none is configured.
    pub const DEFAULT: Self = Self(Self::ALIGNED.0 | Self::NOTSWAPPED.0);

    /// Every flag.
    pub const ALL: Self = Self(0b1_1111);

    /// True when every flag in `other` is also set in `self`.
    #[inline]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when no flag is set.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// `self` with the flags of `other` cleared.
    #[inline]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Raw bit pattern.
    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }
}

impl BitOr for Requirements {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Requirements {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Debug for Requirements {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        const NAMES: [(Requirements, &str); 5] = [
            (Requirements::NOTSWAPPED, "NOTSWAPPED"),
            (Requirements::ALIGNED, "ALIGNED"),
            (Requirements::C_CONTIGUOUS, "C_CONTIGUOUS"),
            (Requirements::WRITEABLE, "WRITEABLE"),
            (Requirements::ENSURECOPY, "ENSURECOPY"),
        ];

        if self.is_empty() {
            return write!(f, "Requirements(NONE)");
        }
        let mut list = f.debug_set();
        for (flag, name) in NAMES {
            if self.contains(flag) {
                list.entry(&format_args!("{name}"));
            }
        }
        list.finish()
    }
}
