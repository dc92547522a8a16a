// Copyright 2026 the Retrace Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wall-clock timestamps for replay events.
//!
//! Replay players position events on a wall-clock timeline, so capture uses
//! milliseconds since the Unix epoch rather than a monotonic tick source. The
//! caller reads the clock; core only carries and compares the values.

use core::fmt;
use core::ops::Sub;

/// Milliseconds since the Unix epoch.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Returns the raw millisecond value.
    #[inline]
    #[must_use]
    pub const fn millis(self) -> u64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, or zero if `earlier` is later.
    #[inline]
    #[must_use]
    pub const fn saturating_millis_since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Sub for Timestamp {
    type Output = u64;

    /// Saturating difference in milliseconds.
    #[inline]
    fn sub(self, rhs: Self) -> u64 {
        self.saturating_millis_since(rhs)
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difference_saturates() {
        assert_eq!(Timestamp(1_500) - Timestamp(1_000), 500);
        assert_eq!(Timestamp(1_000) - Timestamp(1_500), 0);
    }
}
