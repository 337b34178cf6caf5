#![forbid(unsafe_code)]

//! Normalized volume arithmetic.
//!
//! Volumes use the audio server's own integer scale, where
//! [`Volume::NORMAL`] is unity gain ("100%"). Keeping the raw scale means a
//! value read from the server and written back is never rounded.

use std::fmt;

/// A normalized volume.
///
/// Values above [`Volume::NORMAL`] are legal: the server may report software
/// amplification, and such values are preserved as reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Volume(pub u32);

impl Volume {
    /// Silence.
    pub const MUTED: Self = Self(0);

    /// Unity gain.
    pub const NORMAL: Self = Self(0x10000);

    /// Largest representable volume.
    pub const MAX: Self = Self(u32::MAX);

    /// One keystroke's worth of adjustment: 5% of `NORMAL`.
    pub const STEP: u32 = Self::NORMAL.0 / 20;

    /// Volume at `percent` of `NORMAL`, rounded down to the raw scale.
    #[inline]
    pub const fn from_percent(percent: u32) -> Self {
        Self((Self::NORMAL.0 as u64 * percent as u64 / 100) as u32)
    }

    /// Volume as a percentage of `NORMAL`, rounded to nearest.
    #[inline]
    pub const fn percent(self) -> u32 {
        ((self.0 as u64 * 100 + Self::NORMAL.0 as u64 / 2) / Self::NORMAL.0 as u64) as u32
    }

    /// Volume as a fraction of `NORMAL` (1.0 at unity gain).
    #[inline]
    pub fn ratio(self) -> f64 {
        f64::from(self.0) / f64::from(Self::NORMAL.0)
    }

    /// Add `delta` and clamp the result into `[min, max]`.
    ///
    /// If `min > max` the range collapses to `min`.
    #[must_use]
    pub fn saturating_offset(self, delta: i64, min: Self, max: Self) -> Self {
        let lo = i64::from(min.0);
        let hi = i64::from(max.0.max(min.0));
        let raw = (i64::from(self.0) + delta).clamp(lo, hi);
        Self(raw as u32)
    }

    /// Average of a per-channel volume vector.
    ///
    /// An empty vector averages to [`Volume::MUTED`].
    pub fn average(channels: &[u32]) -> Self {
        if channels.is_empty() {
            return Self::MUTED;
        }
        let sum: u64 = channels.iter().map(|&v| u64::from(v)).sum();
        Self((sum / channels.len() as u64) as u32)
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}
