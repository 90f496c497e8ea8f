//! Closed sub-ranges of a cell boundary.
//!
//! Every feasibility and reachability value in the free-space diagram is
//! an [`Interval`]: either empty, or a closed range `[start, end]` of the
//! boundary parameter. A range with `start == end` is a valid single-point
//! interval; only `start > end` is empty.

use serde::{Deserialize, Serialize};

/// A closed interval of a boundary parameter, or the empty marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInterval")]
pub struct Interval {
    start: f64,
    end: f64,
    empty: bool,
}

/// Wire form of [`Interval`]; rebuilt through [`Interval::new`] so a
/// decoded non-empty interval always has `start <= end`.
#[derive(Deserialize)]
struct RawInterval {
    start: f64,
    end: f64,
    #[serde(default)]
    empty: bool,
}

impl From<RawInterval> for Interval {
    fn from(raw: RawInterval) -> Self {
        if raw.empty {
            Self::EMPTY
        } else {
            Self::new(raw.start, raw.end)
        }
    }
}

impl Interval {
    /// The empty interval.
    pub const EMPTY: Self = Self {
        start: 0.0,
        end: 0.0,
        empty: true,
    };

    /// The full boundary `[0, 1]`.
    pub const UNIT: Self = Self {
        start: 0.0,
        end: 1.0,
        empty: false,
    };

    /// Build `[start, end]`, or the empty interval when `start > end`.
    ///
    /// NaN bounds also produce the empty interval.
    #[must_use]
    pub fn new(start: f64, end: f64) -> Self {
        if start <= end {
            Self {
                start,
                end,
                empty: false,
            }
        } else {
            Self::EMPTY
        }
    }

    /// Returns `true` for the empty interval.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.empty
    }

    /// Returns `true` if `value` lies within the closed range.
    ///
    /// Always `false` for the empty interval.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        !self.empty && self.start <= value && value <= self.end
    }

    /// Lower bound, or `None` when empty.
    #[must_use]
    pub const fn start(&self) -> Option<f64> {
        if self.empty { None } else { Some(self.start) }
    }

    /// Upper bound, or `None` when empty.
    #[must_use]
    pub const fn end(&self) -> Option<f64> {
        if self.empty { None } else { Some(self.end) }
    }

    /// Both bounds, or `None` when empty.
    #[must_use]
    pub const fn bounds(&self) -> Option<(f64, f64)> {
        if self.empty {
            None
        } else {
            Some((self.start, self.end))
        }
    }

    /// Centre of the range, or `None` when empty.
    #[must_use]
    pub fn midpoint(&self) -> Option<f64> {
        self.bounds().map(|(s, e)| 0.5 * (s + e))
    }

    /// Length of the range; 0 for both the empty and single-point intervals.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.bounds().map_or(0.0, |(s, e)| e - s)
    }

    /// Clip to the unit range `[0, 1]`.
    #[must_use]
    pub fn clamp_unit(self) -> Self {
        match self.bounds() {
            Some((s, e)) => Self::new(s.max(0.0), e.min(1.0)),
            None => Self::EMPTY,
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.bounds() {
            Some((s, e)) => write!(f, "[{s:.3},{e:.3}]"),
            None => write!(f, "∅"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn reversed_bounds_are_empty() {
        let iv = Interval::new(0.3, 0.2);
        assert!(iv.is_empty());
        assert_eq!(iv.bounds(), None);
    }

    #[test]
    fn equal_bounds_are_a_single_point() {
        let iv = Interval::new(0.2, 0.2);
        assert!(!iv.is_empty());
        assert!(iv.contains(0.2));
        assert!(!iv.contains(0.2001));
        assert!(iv.length().abs() < f64::EPSILON);
    }

    #[test]
    fn empty_contains_nothing() {
        for v in [0.0, 0.5, 1.0, -1.0] {
            assert!(!Interval::EMPTY.contains(v));
            assert!(!Interval::new(0.9, 0.1).contains(v));
        }
    }

    #[test]
    fn contains_is_closed_at_both_ends() {
        let iv = Interval::new(0.25, 0.75);
        assert!(iv.contains(0.25));
        assert!(iv.contains(0.75));
        assert!(iv.contains(0.5));
        assert!(!iv.contains(0.2));
        assert!(!iv.contains(0.8));
    }

    #[test]
    fn nan_bounds_are_empty() {
        assert!(Interval::new(f64::NAN, 1.0).is_empty());
        assert!(Interval::new(0.0, f64::NAN).is_empty());
    }

    #[test]
    fn midpoint_and_accessors() {
        let iv = Interval::new(0.2, 0.6);
        assert_eq!(iv.start(), Some(0.2));
        assert_eq!(iv.end(), Some(0.6));
        assert!((iv.midpoint().unwrap_or_default() - 0.4).abs() < 1e-12);
        assert_eq!(Interval::EMPTY.midpoint(), None);
    }

    #[test]
    fn clamp_unit_trims_and_may_empty() {
        assert_eq!(Interval::new(-0.5, 0.5).clamp_unit(), Interval::new(0.0, 0.5));
        assert_eq!(Interval::new(-2.0, 3.0).clamp_unit(), Interval::UNIT);
        assert!(Interval::new(1.5, 2.0).clamp_unit().is_empty());
    }

    #[test]
    fn display_formats() {
        assert_eq!(Interval::new(0.0, 0.5).to_string(), "[0.000,0.500]");
        assert_eq!(Interval::EMPTY.to_string(), "∅");
    }

    // --- Serde ---

    #[test]
    fn deserialize_goes_through_new() {
        let reversed: Interval =
            serde_json::from_str(r#"{"start":0.9,"end":0.1,"empty":false}"#).unwrap();
        assert!(reversed.is_empty());
        assert!(!reversed.contains(0.5));

        let flagged: Interval =
            serde_json::from_str(r#"{"start":0.2,"end":0.4,"empty":true}"#).unwrap();
        assert_eq!(flagged, Interval::EMPTY);

        let json = serde_json::to_string(&Interval::new(0.25, 0.5)).unwrap();
        let back: Interval = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Interval::new(0.25, 0.5));
    }
}
