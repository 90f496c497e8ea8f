//! Free-space diagram construction.
//!
//! For curves `P` (m segments) and `Q` (n segments) the diagram is an
//! `m x n` grid of [`Cell`]s. Cell `(i, j)` pairs segment `i` of `P` with
//! segment `j` of `Q` and covers the unit square of the parameter plane
//! with lower-left corner `(i, j)`. The x axis follows `P`, the y axis
//! follows `Q`.
//!
//! Each cell stores, per boundary, the sub-interval on which the two
//! curve points are within ε of each other. These come from solving the
//! quadratic inequality `|(1 - s)A + sB - C|^2 <= eps^2` for a moving
//! point on segment `AB` against a fixed vertex `C`
//! (see [`segment_point_interval`]).
//!
//! The grid lives in one flat `Vec<Cell>` indexed by `i * n + j`.
//! Neighbours are reached by index arithmetic only.

use serde::{Deserialize, Serialize};

use crate::critical_path::{self, CriticalPath};
use crate::interval::Interval;
use crate::reachability;
use crate::types::{DecisionConfig, Point, Polyline};

/// Which neighbour made a top or right edge reachable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Predecessor {
    /// The edge is unreachable.
    #[default]
    None,
    /// Reached through the cell's left edge, i.e. from cell `(i - 1, j)`.
    Left,
    /// Reached through the cell's bottom edge, i.e. from cell `(i, j - 1)`.
    Bottom,
}

/// One of the four boundaries of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// `y = j`, parameter runs along `P`'s segment.
    Bottom,
    /// `y = j + 1`, parameter runs along `P`'s segment.
    Top,
    /// `x = i`, parameter runs along `Q`'s segment.
    Left,
    /// `x = i + 1`, parameter runs along `Q`'s segment.
    Right,
}

impl Side {
    /// All four sides in drawing order.
    pub const ALL: [Self; 4] = [Self::Bottom, Self::Top, Self::Left, Self::Right];
}

/// A single cell of the free-space diagram.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Free interval of `P(s)` against `Q_j`.
    pub bottom: Interval,
    /// Free interval of `P(s)` against `Q_{j+1}`.
    pub top: Interval,
    /// Free interval of `Q(t)` against `P_i`.
    pub left: Interval,
    /// Free interval of `Q(t)` against `P_{i+1}`.
    pub right: Interval,

    /// Monotone-reachable part of [`Cell::bottom`].
    pub reachable_bottom: Interval,
    /// Monotone-reachable part of [`Cell::top`].
    pub reachable_top: Interval,
    /// Monotone-reachable part of [`Cell::left`].
    pub reachable_left: Interval,
    /// Monotone-reachable part of [`Cell::right`].
    pub reachable_right: Interval,

    /// Neighbour that enabled [`Cell::reachable_top`].
    pub pred_top: Predecessor,
    /// Neighbour that enabled [`Cell::reachable_right`].
    pub pred_right: Predecessor,
}

impl Cell {
    /// Feasibility interval of the given side.
    #[must_use]
    pub const fn feasible(&self, side: Side) -> Interval {
        match side {
            Side::Bottom => self.bottom,
            Side::Top => self.top,
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// Reachable sub-interval of the given side.
    #[must_use]
    pub const fn reachable(&self, side: Side) -> Interval {
        match side {
            Side::Bottom => self.reachable_bottom,
            Side::Top => self.reachable_top,
            Side::Left => self.reachable_left,
            Side::Right => self.reachable_right,
        }
    }

    /// Reset all reachability data to empty / [`Predecessor::None`].
    pub(crate) fn clear_reachability(&mut self) {
        self.reachable_bottom = Interval::EMPTY;
        self.reachable_top = Interval::EMPTY;
        self.reachable_left = Interval::EMPTY;
        self.reachable_right = Interval::EMPTY;
        self.pred_top = Predecessor::None;
        self.pred_right = Predecessor::None;
    }
}

/// Solve `|(1 - s)A + sB - C|^2 <= eps^2` for `s` in `[0, 1]`.
///
/// Returns the (convex) solution set as an [`Interval`]. A segment whose
/// squared length is below
/// [`DecisionConfig::DEFAULT_DEGENERATE_SEGMENT_THRESHOLD`] is treated as
/// the single point `A`: the result is `[0, 1]` when `A` is within ε of `C`
/// and empty otherwise.
///
/// # Examples
///
/// ```
/// use frechet_core::{Interval, Point, segment_point_interval};
///
/// // Horizontal segment from (0,0) to (2,0), fixed point 1 unit above its middle.
/// let iv = segment_point_interval(
///     Point::new(0.0, 0.0),
///     Point::new(2.0, 0.0),
///     Point::new(1.0, 1.0),
///     1.0,
/// );
/// assert_eq!(iv, Interval::new(0.5, 0.5));
/// ```
#[must_use]
pub fn segment_point_interval(a: Point, b: Point, c: Point, eps: f64) -> Interval {
    solve_segment_point(
        a,
        b,
        c,
        eps,
        DecisionConfig::DEFAULT_DEGENERATE_SEGMENT_THRESHOLD,
    )
}

/// [`segment_point_interval`] with an explicit degenerate-segment threshold.
#[must_use]
pub fn solve_segment_point(a: Point, b: Point, c: Point, eps: f64, threshold: f64) -> Interval {
    let d = b - a;
    let f = a - c;

    let qa = d.dot(d);
    let qb = 2.0 * d.dot(f);
    let qc = eps.mul_add(-eps, f.dot(f));

    // Non-finite coordinates leave nothing to compare against.
    if !(qa.is_finite() && qb.is_finite() && qc.is_finite()) {
        return Interval::EMPTY;
    }

    if qa.abs() < threshold {
        return if qc <= 0.0 {
            Interval::UNIT
        } else {
            Interval::EMPTY
        };
    }

    // Plain products here: a fused multiply-add would turn an exactly
    // tangent configuration into a tiny negative discriminant.
    #[allow(clippy::suboptimal_flops)]
    let disc = qb * qb - 4.0 * qa * qc;
    if disc.is_nan() || disc < 0.0 {
        return Interval::EMPTY;
    }

    let sqrt_disc = disc.sqrt();
    let s1 = (-qb - sqrt_disc) / (2.0 * qa);
    let s2 = (-qb + sqrt_disc) / (2.0 * qa);

    Interval::new(s1.min(s2).max(0.0), s1.max(s2).min(1.0))
}

/// The free-space diagram of two curves at one tolerance.
///
/// Owns copies of both curves, the current ε, and the cell grid.
/// Feasibility intervals are always in sync with ε. Reachability data is
/// only refreshed by an explicit [`FreeSpaceDiagram::propagate`] call;
/// use [`FreeSpaceDiagram::is_stale`] to check whether it matches the
/// current ε.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreeSpaceDiagram {
    p: Polyline,
    q: Polyline,
    eps: f64,
    degenerate_segment_threshold: f64,
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
    propagated_eps: Option<f64>,
    critical_path: Option<CriticalPath>,
    critical_eps: Option<f64>,
}

impl FreeSpaceDiagram {
    /// Build the diagram of `p` and `q` at tolerance `eps`.
    ///
    /// If either curve has fewer than 2 vertices the grid has no cells
    /// and the far corner is never reachable. Negative or NaN tolerances
    /// are treated as 0.
    #[must_use]
    pub fn new(p: Polyline, q: Polyline, eps: f64) -> Self {
        Self::with_config(p, q, &DecisionConfig::with_eps(eps))
    }

    /// Build the diagram using the tolerance and thresholds of `config`.
    #[must_use]
    pub fn with_config(p: Polyline, q: Polyline, config: &DecisionConfig) -> Self {
        let (rows, cols) = if p.len() < 2 || q.len() < 2 {
            (0, 0)
        } else {
            (p.segment_count(), q.segment_count())
        };

        let mut diagram = Self {
            p,
            q,
            eps: sanitize_eps(config.eps),
            degenerate_segment_threshold: config.degenerate_segment_threshold,
            rows,
            cols,
            cells: vec![Cell::default(); rows * cols],
            propagated_eps: None,
            critical_path: None,
            critical_eps: None,
        };
        diagram.compute_cells();

        tracing::debug!(rows, cols, eps = diagram.eps, "built free-space diagram");
        diagram
    }

    /// Grid dimensions `(m, n)`: segment counts of `P` and `Q`.
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Returns `true` when the grid has no cells.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// The current tolerance.
    #[must_use]
    pub const fn eps(&self) -> f64 {
        self.eps
    }

    /// The curve along the x axis.
    #[must_use]
    pub const fn p(&self) -> &Polyline {
        &self.p
    }

    /// The curve along the y axis.
    #[must_use]
    pub const fn q(&self) -> &Polyline {
        &self.q
    }

    /// Cell `(i, j)`, or `None` when out of range.
    #[must_use]
    pub fn cell(&self, i: usize, j: usize) -> Option<&Cell> {
        self.index(i, j).map(|k| &self.cells[k])
    }

    /// Mutable access to cell `(i, j)`, or `None` when out of range.
    pub fn cell_mut(&mut self, i: usize, j: usize) -> Option<&mut Cell> {
        self.index(i, j).map(|k| &mut self.cells[k])
    }

    /// All cells in row-major order (`i * n + j`).
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable access to all cells in row-major order.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Replace ε and recompute every feasibility interval.
    ///
    /// Reachability data is left as is (now stale) and must be refreshed
    /// with [`FreeSpaceDiagram::propagate`]. A cached critical path is
    /// discarded.
    pub fn set_eps(&mut self, eps: f64) {
        self.eps = sanitize_eps(eps);
        self.critical_path = None;
        self.critical_eps = None;
        self.compute_cells();
        tracing::trace!(eps = self.eps, "recomputed feasibility intervals");
    }

    /// Run reachability propagation at the current ε.
    pub fn propagate(&mut self) {
        reachability::propagate(self);
    }

    /// Whether the far corner `(m, n)` is reachable by a monotone path.
    ///
    /// Reads the data of the last [`FreeSpaceDiagram::propagate`] call.
    #[must_use]
    pub fn is_far_corner_reachable(&self) -> bool {
        reachability::is_far_corner_reachable(self)
    }

    /// Returns `true` if reachability data does not belong to the
    /// current ε (never propagated, or ε changed since).
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_stale(&self) -> bool {
        self.propagated_eps != Some(self.eps)
    }

    /// The critical path for the current ε, computed on first request.
    ///
    /// Returns `None` when the far corner is unreachable or the
    /// reachability data is stale. Once computed, the path is cached
    /// until the next [`FreeSpaceDiagram::set_eps`].
    pub fn critical_path(&mut self) -> Option<&CriticalPath> {
        if self.critical_path.is_none() {
            if self.is_stale() {
                tracing::warn!(
                    eps = self.eps,
                    "critical path requested before propagation at the current eps"
                );
                return None;
            }
            if !self.is_far_corner_reachable() {
                return None;
            }
            let path = critical_path::extract(self);
            tracing::debug!(
                eps = self.eps,
                points = path.len(),
                "computed critical path"
            );
            self.critical_path = Some(path);
            self.critical_eps = Some(self.eps);
        }
        self.critical_path.as_ref()
    }

    /// The cached critical path, without computing it.
    #[must_use]
    pub const fn cached_critical_path(&self) -> Option<&CriticalPath> {
        self.critical_path.as_ref()
    }

    /// The ε at which the cached critical path was computed.
    #[must_use]
    pub const fn critical_eps(&self) -> Option<f64> {
        self.critical_eps
    }

    /// Number of cell boundaries with a non-empty feasibility interval.
    ///
    /// Shared boundaries between neighbouring cells are counted once per cell.
    #[must_use]
    pub fn free_edge_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|c| Side::ALL.map(|s| c.feasible(s)))
            .filter(|iv| !iv.is_empty())
            .count()
    }

    /// Number of cell boundaries with a non-empty reachable interval.
    #[must_use]
    pub fn reachable_edge_count(&self) -> usize {
        self.cells
            .iter()
            .flat_map(|c| Side::ALL.map(|s| c.reachable(s)))
            .filter(|iv| !iv.is_empty())
            .count()
    }

    pub(crate) const fn mark_propagated(&mut self) {
        self.propagated_eps = Some(self.eps);
    }

    pub(crate) const fn index(&self, i: usize, j: usize) -> Option<usize> {
        if i < self.rows && j < self.cols {
            Some(i * self.cols + j)
        } else {
            None
        }
    }

    fn compute_cells(&mut self) {
        let p = self.p.points();
        let q = self.q.points();
        let eps = self.eps;
        let threshold = self.degenerate_segment_threshold;
        let cols = self.cols;

        for (k, cell) in self.cells.iter_mut().enumerate() {
            let (i, j) = (k / cols, k % cols);
            let (p0, p1) = (p[i], p[i + 1]);
            let (q0, q1) = (q[j], q[j + 1]);

            cell.bottom = solve_segment_point(p0, p1, q0, eps, threshold);
            cell.top = solve_segment_point(p0, p1, q1, eps, threshold);
            cell.left = solve_segment_point(q0, q1, p0, eps, threshold);
            cell.right = solve_segment_point(q0, q1, p1, eps, threshold);
        }
    }
}

fn sanitize_eps(eps: f64) -> f64 {
    if eps > 0.0 { eps } else { 0.0 }
}
