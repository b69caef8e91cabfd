//! Time-stamped segments owned by a character.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of a malformed input interval.
///
/// Carries the owner and raw bounds so the offending record can be located.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum IntervalError {
    /// The interval ends before it starts, or its bounds are not usable times.
    #[error("invalid interval for owner {owner:?}: [{start}, {end}) {reason}")]
    InvalidInterval {
        owner: String,
        start: f64,
        end: f64,
        reason: InvalidReason,
    },
}

/// Why an interval failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// `end < start`.
    EndBeforeStart,
    /// `start < 0`.
    NegativeStart,
    /// A bound is NaN or infinite.
    NotFinite,
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::EndBeforeStart => "ends before it starts",
            Self::NegativeStart => "starts before zero",
            Self::NotFinite => "has a non-finite bound",
        };
        write!(f, "{s}")
    }
}

/// A half-open time span `[start, end)` in seconds, tagged with its owner.
///
/// Zero-length intervals (`start == end`) are accepted as point events.
/// The payload is opaque to allocation and is carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interval<P> {
    /// Owning entity, e.g. the character speaking.
    pub owner: String,

    /// Start offset in seconds from the timeline origin.
    pub start: f64,

    /// End offset in seconds.
    pub end: f64,

    /// Caller data (file path, clip id, ...).
    pub payload: P,
}

impl<P> Interval<P> {
    /// Creates an interval after validating its bounds.
    pub fn new(
        owner: impl Into<String>,
        start: f64,
        end: f64,
        payload: P,
    ) -> Result<Self, IntervalError> {
        let interval = Self {
            owner: owner.into(),
            start,
            end,
            payload,
        };
        interval.validate()?;
        Ok(interval.normalized())
    }

    /// Creates an interval from a start offset and a duration.
    pub fn with_duration(
        owner: impl Into<String>,
        start: f64,
        duration: f64,
        payload: P,
    ) -> Result<Self, IntervalError> {
        Self::new(owner, start, start + duration, payload)
    }

    /// Checks that both bounds are finite, `start >= 0` and `end >= start`.
    pub fn validate(&self) -> Result<(), IntervalError> {
        let reason = if !self.start.is_finite() || !self.end.is_finite() {
            InvalidReason::NotFinite
        } else if self.start < 0.0 {
            InvalidReason::NegativeStart
        } else if self.end < self.start {
            InvalidReason::EndBeforeStart
        } else {
            return Ok(());
        };

        Err(IntervalError::InvalidInterval {
            owner: self.owner.clone(),
            start: self.start,
            end: self.end,
            reason,
        })
    }

    /// Length of the interval in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    /// Returns true if `self` and `other` share any instant.
    ///
    /// Touching intervals (`a.end == b.start`) do not overlap.
    pub fn overlaps<Q>(&self, other: &Interval<Q>) -> bool {
        self.start < other.end && other.start < self.end
    }

    // -0.0 and 0.0 must land in the same start-time group.
    fn normalized(mut self) -> Self {
        self.start += 0.0;
        self.end += 0.0;
        self
    }
}

impl<P> fmt::Display for Interval<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}, {})", self.owner, self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_accepts_ordered_bounds() {
        let interval = Interval::new("Alice", 1.5, 4.0, ()).unwrap();
        assert_eq!(interval.owner, "Alice");
        assert!((interval.duration() - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn new_accepts_zero_length_point_event() {
        let interval = Interval::new("Alice", 3.0, 3.0, ()).unwrap();
        assert!(interval.duration().abs() < f64::EPSILON);
    }

    #[test]
    fn new_rejects_end_before_start() {
        let err = Interval::new("Alice", 5.0, 3.0, ()).unwrap_err();
        assert_eq!(
            err,
            IntervalError::InvalidInterval {
                owner: "Alice".to_string(),
                start: 5.0,
                end: 3.0,
                reason: InvalidReason::EndBeforeStart,
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid interval for owner \"Alice\": [5, 3) ends before it starts"
        );
    }

    #[test]
    fn new_rejects_negative_start() {
        let err = Interval::new("Bob", -1.0, 2.0, ()).unwrap_err();
        assert!(matches!(
            err,
            IntervalError::InvalidInterval {
                reason: InvalidReason::NegativeStart,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_nan() {
        let err = Interval::new("Bob", f64::NAN, 2.0, ()).unwrap_err();
        assert!(matches!(
            err,
            IntervalError::InvalidInterval {
                reason: InvalidReason::NotFinite,
                ..
            }
        ));
    }

    #[test]
    fn negative_zero_start_is_normalized() {
        let interval = Interval::new("Eve", -0.0, 1.0, ()).unwrap();
        assert!(interval.start.is_sign_positive());
    }

    #[test]
    fn with_duration_computes_end() {
        let interval = Interval::with_duration("Eve", 10.0, 2.0, "a.wav").unwrap();
        assert!((interval.end - 12.0).abs() < f64::EPSILON);
        assert_eq!(interval.payload, "a.wav");
    }

    #[test]
    fn touching_intervals_do_not_overlap() {
        let a = Interval::new("A", 0.0, 5.0, ()).unwrap();
        let b = Interval::new("A", 5.0, 8.0, ()).unwrap();
        let c = Interval::new("A", 4.0, 6.0, ()).unwrap();
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }
}
