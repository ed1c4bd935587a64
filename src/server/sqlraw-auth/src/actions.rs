//! Optional backend actions advertised to the host.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Bitmask of optional actions a user backend can implement.
///
/// Bit values follow the host's action constants so that masks can be
/// exchanged with it unchanged.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Actions(u32);

impl Actions {
    /// No action.
    pub const NONE: Self = Self(0);
    /// Create users.
    pub const CREATE_USER: Self = Self(0x0000_0001);
    /// Change passwords.
    pub const SET_PASSWORD: Self = Self(0x0000_0010);
    /// Verify login credentials.
    pub const CHECK_PASSWORD: Self = Self(0x0000_0100);
    /// Provide home directories.
    pub const GET_HOME: Self = Self(0x0000_1000);
    /// Provide display names.
    pub const GET_DISPLAYNAME: Self = Self(0x0001_0000);
    /// Change display names.
    pub const SET_DISPLAYNAME: Self = Self(0x0010_0000);
    /// Provide avatars.
    pub const PROVIDE_AVATAR: Self = Self(0x0100_0000);
    /// Count users.
    pub const COUNT_USERS: Self = Self(0x1000_0000);

    /// Returns the raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Builds a mask from raw bits, keeping unknown bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Returns true if no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if every bit of `other` is set in `self`.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if `self` and `other` share at least one bit.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }
}

impl BitOr for Actions {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Actions {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for Actions {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl fmt::Debug for Actions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actions({:#010x})", self.0)
    }
}
