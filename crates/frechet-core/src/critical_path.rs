//! Critical-path extraction.
//!
//! Walks the predecessor tags left by reachability propagation from the
//! far corner back to the origin and emits one coupling point per visited
//! edge, placed at the midpoint of that edge's reachable interval. The
//! result runs from `(0, 0)` to exactly `(m, n)` in parameter space.
//!
//! The midpoint placement yields *a* coupling within ε at every emitted
//! point; it is not the optimal or a canonical matching.

use serde::{Deserialize, Serialize};

use crate::freespace::{FreeSpaceDiagram, Predecessor};
use crate::reachability;
use crate::types::Point;

/// A sequence of points in the parameter plane `[0, m] x [0, n]`.
///
/// `x` is the parameter along `P`, `y` the parameter along `Q`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriticalPath(Vec<Point>);

impl CriticalPath {
    /// Wrap a sequence of parameter-space points.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of points.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// The first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Point> {
        self.0.first()
    }

    /// The last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Point> {
        self.0.last()
    }

    /// All points, start to end.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Returns `true` if both coordinates never decrease along the path.
    #[must_use]
    pub fn is_monotone(&self) -> bool {
        self.0.windows(2).all(|w| w[0].x <= w[1].x && w[0].y <= w[1].y)
    }
}

/// The edge of the current cell the walk is standing on.
#[derive(Debug, Clone, Copy)]
enum Edge {
    Top,
    Right,
}

/// Extract a critical path from a propagated diagram.
///
/// Returns an empty path unless the far corner is reachable.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn extract(diagram: &FreeSpaceDiagram) -> CriticalPath {
    if !reachability::is_far_corner_reachable(diagram) {
        return CriticalPath::default();
    }

    let (rows, cols) = diagram.dimensions();
    let (mut i, mut j) = (rows - 1, cols - 1);
    let mut edge = match diagram.cell(i, j) {
        Some(c) if !c.reachable_top.is_empty() => Edge::Top,
        _ => Edge::Right,
    };

    let mut reversed = Vec::with_capacity(rows + cols + 1);
    while let Some(cell) = diagram.cell(i, j) {
        let (interval, pred) = match edge {
            Edge::Top => (cell.reachable_top, cell.pred_top),
            Edge::Right => (cell.reachable_right, cell.pred_right),
        };
        let Some(mid) = interval.midpoint() else {
            break;
        };
        reversed.push(match edge {
            Edge::Top => Point::new(i as f64 + mid, (j + 1) as f64),
            Edge::Right => Point::new((i + 1) as f64, j as f64 + mid),
        });

        match pred {
            Predecessor::Left if i > 0 => {
                i -= 1;
                edge = Edge::Right;
            }
            Predecessor::Bottom if j > 0 => {
                j -= 1;
                edge = Edge::Top;
            }
            _ => break,
        }
    }

    let origin = Point::new(0.0, 0.0);
    if reversed.last() != Some(&origin) {
        reversed.push(origin);
    }
    reversed.reverse();

    let corner = Point::new(rows as f64, cols as f64);
    if reversed.len() > 1
        && let Some(last) = reversed.last_mut()
    {
        *last = corner;
    } else {
        reversed.push(corner);
    }

    tracing::trace!(points = reversed.len(), "extracted critical path");
    CriticalPath(reversed)
}
