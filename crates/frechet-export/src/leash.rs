//! Leash sampling along a critical path.
//!
//! A critical path couples a parameter on `P` with a parameter on `Q`.
//! Walking it and evaluating both curves gives the two "walkers" and the
//! leash between them, which is what a viewer animates.

use serde::{Deserialize, Serialize};

use frechet_core::{CriticalPath, Point, Polyline};

/// One frame of the walk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LeashSample {
    /// Position on `P`.
    pub p_point: Point,
    /// Position on `Q`.
    pub q_point: Point,
    /// Distance between the two.
    pub length: f64,
}

/// Samples per critical-path segment used by viewers.
pub const DEFAULT_SAMPLES_PER_SEGMENT: usize = 30;

/// Sample the leash along `path`.
///
/// Each path segment contributes `samples_per_segment` evenly spaced
/// samples starting at its first vertex; the final path vertex is always
/// included. A path with one point yields one sample and an empty path
/// (or an empty curve) yields none. `samples_per_segment` of 0 is treated
/// as 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn sample_leash(
    p: &Polyline,
    q: &Polyline,
    path: &CriticalPath,
    samples_per_segment: usize,
) -> Vec<LeashSample> {
    let steps = samples_per_segment.max(1);
    let points = path.points();
    let Some(&last) = points.last() else {
        return Vec::new();
    };

    let mut samples = Vec::with_capacity(points.len().saturating_sub(1) * steps + 1);
    for pair in points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        for k in 0..steps {
            let t = k as f64 / steps as f64;
            match sample_at(p, q, from.lerp(to, t)) {
                Some(sample) => samples.push(sample),
                None => return Vec::new(),
            }
        }
    }
    match sample_at(p, q, last) {
        Some(sample) => samples.push(sample),
        None => return Vec::new(),
    }

    tracing::trace!(samples = samples.len(), "sampled leash");
    samples
}

/// The longest leash among `samples`, or `None` when there are none.
#[must_use]
pub fn max_leash_length(samples: &[LeashSample]) -> Option<f64> {
    samples.iter().map(|s| s.length).reduce(f64::max)
}

fn sample_at(p: &Polyline, q: &Polyline, param: Point) -> Option<LeashSample> {
    let p_point = p.point_at(param.x)?;
    let q_point = q.point_at(param.y)?;
    Some(LeashSample {
        p_point,
        q_point,
        length: p_point.distance(q_point),
    })
}
