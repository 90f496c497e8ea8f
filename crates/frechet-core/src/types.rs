//! Shared types for the Fréchet decision core.

use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// A 2D point.
///
/// Used both for curve vertices and for coordinates in the free-space
/// parameter plane `[0, m] x [0, n]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Dot product, treating both points as vectors from the origin.
    #[must_use]
    pub fn dot(self, other: Self) -> f64 {
        self.x.mul_add(other.x, self.y * other.y)
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Avoids the square root for comparison purposes.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let d = self - other;
        d.dot(d)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Linear interpolation: `(1 - t) * self + t * other`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self::new(
            (other.x - self.x).mul_add(t, self.x),
            (other.y - self.y).mul_add(t, self.y),
        )
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

/// An ordered sequence of vertices defining a polygonal curve.
///
/// Segment `i` spans vertex `i` to vertex `i + 1`. A polyline is
/// immutable once built; the free-space diagram stores its own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline(Vec<Point>);

impl Polyline {
    /// Create a polyline from a vector of points without validation.
    ///
    /// Curves with fewer than 2 points are accepted here; they produce a
    /// degenerate, never-reachable free-space diagram.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Create a polyline, rejecting curves the decision procedure cannot
    /// meaningfully compare.
    ///
    /// # Errors
    ///
    /// Returns [`CurveError::TooFewPoints`] for fewer than 2 points and
    /// [`CurveError::NonFinite`] if any coordinate is NaN or infinite.
    pub fn try_new(points: Vec<Point>) -> Result<Self, CurveError> {
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFinite { index });
        }
        Ok(Self(points))
    }

    /// Returns `true` if the polyline has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the number of segments (`len - 1`, or 0 for fewer than 2 points).
    #[must_use]
    pub const fn segment_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Returns the endpoints of segment `i`, if it exists.
    #[must_use]
    pub fn segment(&self, i: usize) -> Option<(Point, Point)> {
        match (self.0.get(i), self.0.get(i + 1)) {
            (Some(&a), Some(&b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// Returns a slice of all points.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polyline and returns the underlying vector of points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Evaluate the curve at a continuous parameter in `[0, segment_count]`.
    ///
    /// The integer part selects the segment and the fractional part the
    /// position along it. Parameters outside the range clamp to the first
    /// or last vertex. Returns `None` for an empty polyline.
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn point_at(&self, param: f64) -> Option<Point> {
        let first = *self.0.first()?;
        let last = *self.0.last()?;
        if param.is_nan() || param <= 0.0 {
            return Some(first);
        }
        let segments = self.segment_count();
        if param >= segments as f64 {
            return Some(last);
        }
        let i = param.floor() as usize;
        let (a, b) = self.segment(i)?;
        Some(a.lerp(b, param - i as f64))
    }
}

/// Errors raised when validating a curve.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    /// The curve has fewer than the 2 vertices needed for one segment.
    #[error("curve needs at least 2 points, got {count}")]
    TooFewPoints {
        /// Number of points supplied.
        count: usize,
    },

    /// A vertex has a NaN or infinite coordinate.
    #[error("curve point {index} has a non-finite coordinate")]
    NonFinite {
        /// Index of the offending vertex.
        index: usize,
    },
}

/// Configuration for a single decision run.
///
/// # Numeric thresholds
///
/// `degenerate_segment_threshold` is compared against the squared length
/// of a segment. Below it the segment is treated as a single point when
/// solving for its feasibility interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecisionConfig {
    /// The tolerance ε. Negative and NaN values are treated as 0.
    pub eps: f64,

    /// Squared segment length under which a segment counts as a point.
    pub degenerate_segment_threshold: f64,
}

impl DecisionConfig {
    /// Default tolerance.
    pub const DEFAULT_EPS: f64 = 1.0;
    /// Default degenerate-segment threshold on the squared length.
    pub const DEFAULT_DEGENERATE_SEGMENT_THRESHOLD: f64 = 1e-12;

    /// Default config with the given tolerance.
    #[must_use]
    pub fn with_eps(eps: f64) -> Self {
        Self {
            eps,
            ..Self::default()
        }
    }
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            eps: Self::DEFAULT_EPS,
            degenerate_segment_threshold: Self::DEFAULT_DEGENERATE_SEGMENT_THRESHOLD,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- Point tests ---

    #[test]
    fn point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
        assert!((a.distance(b) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_arithmetic() {
        let a = Point::new(1.0, 2.0);
        let b = Point::new(4.0, 6.0);
        assert_eq!(b - a, Point::new(3.0, 4.0));
        assert_eq!(a + b, Point::new(5.0, 8.0));
        assert_eq!(a * 2.0, Point::new(2.0, 4.0));
        assert!((a.dot(b) - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn point_lerp_endpoints_and_midpoint() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, -4.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Point::new(5.0, -2.0));
    }

    // --- Polyline tests ---

    #[test]
    fn polyline_segment_count() {
        assert_eq!(Polyline::new(vec![]).segment_count(), 0);
        assert_eq!(Polyline::new(vec![Point::new(1.0, 1.0)]).segment_count(), 0);
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 0.0),
        ]);
        assert_eq!(pl.segment_count(), 2);
        assert_eq!(
            pl.segment(1),
            Some((Point::new(1.0, 0.0), Point::new(2.0, 0.0)))
        );
        assert_eq!(pl.segment(2), None);
    }

    #[test]
    fn polyline_try_new_rejects_short_curves() {
        let err = Polyline::try_new(vec![Point::new(0.0, 0.0)]).unwrap_err();
        assert_eq!(err, CurveError::TooFewPoints { count: 1 });
        assert_eq!(err.to_string(), "curve needs at least 2 points, got 1");
    }

    #[test]
    fn polyline_try_new_rejects_nan() {
        let err = Polyline::try_new(vec![Point::new(0.0, 0.0), Point::new(f64::NAN, 1.0)])
            .unwrap_err();
        assert_eq!(err, CurveError::NonFinite { index: 1 });
    }

    #[test]
    fn polyline_try_new_accepts_two_points() {
        let pl = Polyline::try_new(vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)]).unwrap();
        assert_eq!(pl.len(), 2);
    }

    #[test]
    fn polyline_point_at_interpolates_and_clamps() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(2.0, 2.0),
        ]);
        assert_eq!(pl.point_at(-1.0), Some(Point::new(0.0, 0.0)));
        assert_eq!(pl.point_at(0.5), Some(Point::new(1.0, 0.0)));
        assert_eq!(pl.point_at(1.0), Some(Point::new(2.0, 0.0)));
        assert_eq!(pl.point_at(1.25), Some(Point::new(2.0, 0.5)));
        assert_eq!(pl.point_at(7.0), Some(Point::new(2.0, 2.0)));
        assert_eq!(Polyline::new(vec![]).point_at(0.5), None);
    }

    #[test]
    fn decision_config_defaults() {
        let config = DecisionConfig::default();
        assert!((config.eps - 1.0).abs() < f64::EPSILON);
        assert!((config.degenerate_segment_threshold - 1e-12).abs() < f64::EPSILON);
    }

    #[test]
    fn decision_config_partial_json_uses_defaults() {
        let config: DecisionConfig = serde_json::from_str(r#"{"eps": 2.5}"#).unwrap();
        assert_eq!(config, DecisionConfig::with_eps(2.5));
    }
}
