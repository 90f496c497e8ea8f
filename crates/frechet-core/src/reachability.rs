//! Reachability propagation over the free-space diagram.
//!
//! A dynamic program over the grid, sweeping `i` outer and `j` inner so
//! that cell `(i, j)` is handled after `(i - 1, j)` and `(i, j - 1)`.
//! For every cell it derives the parts of the four boundaries that a
//! path monotone in both coordinates can reach from `(0, 0)` while
//! staying in free space, and tags which neighbour enabled the top and
//! right edges.
//!
//! Free space inside one cell is convex, so:
//!
//! - if any point of the left edge is reachable, the whole free top edge
//!   is reachable;
//! - if only the bottom edge is reachable, the top edge is reachable from
//!   the leftmost reachable bottom point onwards.
//!
//! The right edge is symmetric with bottom and left swapped.

use crate::freespace::{Cell, FreeSpaceDiagram, Predecessor};
use crate::interval::Interval;

/// Recompute every reachable interval and predecessor tag of `diagram`.
///
/// Previous reachability data is discarded first, so the result depends
/// only on the current feasibility intervals.
pub fn propagate(diagram: &mut FreeSpaceDiagram) {
    let (rows, cols) = diagram.dimensions();

    for cell in diagram.cells_mut() {
        cell.clear_reachability();
    }

    for i in 0..rows {
        for j in 0..cols {
            let reachable_bottom = incoming_bottom(diagram, i, j);
            let reachable_left = incoming_left(diagram, i, j);

            let Some(cell) = diagram.cell_mut(i, j) else {
                continue;
            };
            cell.reachable_bottom = reachable_bottom;
            cell.reachable_left = reachable_left;
            resolve_outgoing(cell);
        }
    }

    diagram.mark_propagated();

    tracing::debug!(
        rows,
        cols,
        eps = diagram.eps(),
        reachable = is_far_corner_reachable(diagram),
        "propagated reachability"
    );
}

/// Whether the far corner `(m, n)` of the parameter plane is reachable.
///
/// True iff the top or right reachable interval of cell `(m - 1, n - 1)`
/// contains 1. Always false for a grid without cells.
#[must_use]
pub fn is_far_corner_reachable(diagram: &FreeSpaceDiagram) -> bool {
    let (rows, cols) = diagram.dimensions();
    if rows == 0 || cols == 0 {
        return false;
    }
    diagram
        .cell(rows - 1, cols - 1)
        .is_some_and(|c| c.reachable_top.contains(1.0) || c.reachable_right.contains(1.0))
}

/// Reachable part of the bottom edge of `(i, j)`.
///
/// Inside the grid this is the top edge of the cell below. Along the
/// bottom row it is seeded from the origin: the free bottom interval
/// counts only when it starts at parameter 0 and the boundary to its left
/// is reachable all the way to parameter 1.
fn incoming_bottom(diagram: &FreeSpaceDiagram, i: usize, j: usize) -> Interval {
    let Some(cell) = diagram.cell(i, j) else {
        return Interval::EMPTY;
    };
    if j > 0 {
        return diagram
            .cell(i, j - 1)
            .map_or(Interval::EMPTY, |below| below.reachable_top);
    }

    let chained = i == 0
        || diagram
            .cell(i - 1, 0)
            .is_some_and(|prev| prev.reachable_bottom.contains(1.0));
    if chained && cell.bottom.contains(0.0) {
        cell.bottom
    } else {
        Interval::EMPTY
    }
}

/// Reachable part of the left edge of `(i, j)`; see [`incoming_bottom`].
fn incoming_left(diagram: &FreeSpaceDiagram, i: usize, j: usize) -> Interval {
    let Some(cell) = diagram.cell(i, j) else {
        return Interval::EMPTY;
    };
    if i > 0 {
        return diagram
            .cell(i - 1, j)
            .map_or(Interval::EMPTY, |left| left.reachable_right);
    }

    let chained = j == 0
        || diagram
            .cell(0, j - 1)
            .is_some_and(|prev| prev.reachable_left.contains(1.0));
    if chained && cell.left.contains(0.0) {
        cell.left
    } else {
        Interval::EMPTY
    }
}

/// Fill the top/right reachable intervals and predecessor tags of a cell
/// whose bottom/left reachable intervals are already set.
fn resolve_outgoing(cell: &mut Cell) {
    let from_left = !cell.reachable_left.is_empty();
    let from_bottom = !cell.reachable_bottom.is_empty();

    cell.reachable_top = pass_through(cell.top, cell.reachable_left, cell.reachable_bottom);
    cell.reachable_right = pass_through(cell.right, cell.reachable_bottom, cell.reachable_left);

    cell.pred_top = if from_left {
        Predecessor::Left
    } else if from_bottom {
        Predecessor::Bottom
    } else {
        Predecessor::None
    };

    cell.pred_right = if from_bottom {
        Predecessor::Bottom
    } else if from_left {
        Predecessor::Left
    } else {
        Predecessor::None
    };
}

/// Reachable part of an outgoing edge.
///
/// `across` is the incoming edge perpendicular to `target` (any point
/// reaches the whole target); `parallel` is the incoming edge facing it
/// (only points at or beyond its start are reachable).
fn pass_through(target: Interval, across: Interval, parallel: Interval) -> Interval {
    if !across.is_empty() {
        return target;
    }
    match (parallel.start(), target.bounds()) {
        (Some(from), Some((start, end))) => Interval::new(from.max(start), end),
        _ => Interval::EMPTY,
    }
}
