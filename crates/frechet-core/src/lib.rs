//! frechet-core: Fréchet distance decision procedure (sans-IO).
//!
//! Decides whether the continuous Fréchet distance of two polygonal
//! curves `P` and `Q` is at most ε, and when it is, produces a coupling
//! realizing that bound:
//!
//! free-space diagram -> reachability propagation -> critical path.
//!
//! This crate has **no I/O dependencies**. Curve loading, rendering and
//! the command-line surface live in `frechet-export` and `frechet-bench`.

pub mod critical_path;
pub mod diagnostics;
pub mod freespace;
pub mod interval;
pub mod reachability;
pub mod types;

use serde::{Deserialize, Serialize};

pub use critical_path::CriticalPath;
pub use diagnostics::{Clock, DecisionDiagnostics};
pub use freespace::{
    Cell, FreeSpaceDiagram, Predecessor, Side, segment_point_interval, solve_segment_point,
};
pub use interval::Interval;
pub use types::{CurveError, DecisionConfig, Point, Polyline};

use diagnostics::{DecisionSummary, StageDiagnostics, StageMetrics};

/// Outcome of a one-shot decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the Fréchet distance is at most `eps`.
    pub reachable: bool,
    /// Grid dimensions `(m, n)`.
    pub dimensions: (usize, usize),
    /// The tolerance used.
    pub eps: f64,
    /// Coupling in parameter space; empty when unreachable.
    pub critical_path: CriticalPath,
}

/// Decide `Fréchet(p, q) <= config.eps` in one call.
///
/// Builds the free-space diagram, propagates reachability and, when the
/// far corner is reachable, extracts a critical path.
///
/// # Examples
///
/// ```
/// use frechet_core::{DecisionConfig, Point, Polyline, decide};
///
/// let p = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
/// let q = Polyline::new(vec![Point::new(0.0, 1.0), Point::new(2.0, 1.0)]);
///
/// assert!(decide(&p, &q, &DecisionConfig::with_eps(1.0)).reachable);
/// assert!(!decide(&p, &q, &DecisionConfig::with_eps(0.5)).reachable);
/// ```
#[must_use]
pub fn decide(p: &Polyline, q: &Polyline, config: &DecisionConfig) -> Decision {
    let mut diagram = FreeSpaceDiagram::with_config(p.clone(), q.clone(), config);
    diagram.propagate();
    let reachable = diagram.is_far_corner_reachable();
    let critical_path = if reachable {
        critical_path::extract(&diagram)
    } else {
        CriticalPath::default()
    };

    Decision {
        reachable,
        dimensions: diagram.dimensions(),
        eps: diagram.eps(),
        critical_path,
    }
}

/// [`decide`] with per-stage timing and counts.
#[must_use]
pub fn decide_with_diagnostics<C: Clock>(
    p: &Polyline,
    q: &Polyline,
    config: &DecisionConfig,
    clock: &C,
) -> (Decision, DecisionDiagnostics) {
    let start = clock.now();

    let t = clock.now();
    let mut diagram = FreeSpaceDiagram::with_config(p.clone(), q.clone(), config);
    let (rows, cols) = diagram.dimensions();
    let build = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Build {
            rows,
            cols,
            free_edge_count: diagram.free_edge_count(),
        },
    };

    let t = clock.now();
    diagram.propagate();
    let reachable = diagram.is_far_corner_reachable();
    let propagation = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Propagation {
            reachable_edge_count: diagram.reachable_edge_count(),
            far_corner_reachable: reachable,
        },
    };

    let (critical_path, extraction) = if reachable {
        let t = clock.now();
        let path = critical_path::extract(&diagram);
        let stage = StageDiagnostics {
            duration: clock.elapsed(&t),
            metrics: StageMetrics::Extraction {
                point_count: path.len(),
                monotone: path.is_monotone(),
            },
        };
        (path, Some(stage))
    } else {
        (CriticalPath::default(), None)
    };

    let diagnostics = DecisionDiagnostics {
        build,
        propagation,
        extraction,
        total_duration: clock.elapsed(&start),
        summary: DecisionSummary {
            eps: diagram.eps(),
            rows,
            cols,
            reachable,
            path_point_count: critical_path.len(),
        },
    };

    let decision = Decision {
        reachable,
        dimensions: (rows, cols),
        eps: diagram.eps(),
        critical_path,
    };
    (decision, diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell as StdCell;
    use std::time::Duration;

    use proptest::prelude::*;

    use super::*;

    /// Clock that advances one millisecond per reading.
    struct StepClock(StdCell<u64>);

    impl Clock for StepClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get();
            self.0.set(t + 1);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.now() - since)
        }
    }

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    fn reachable(p: &Polyline, q: &Polyline, eps: f64) -> bool {
        decide(p, q, &DecisionConfig::with_eps(eps)).reachable
    }

    #[test]
    fn boundary_distance_is_included() {
        let p = pl(&[(0.0, 0.0), (2.0, 0.0)]);
        let q = pl(&[(0.0, 1.0), (2.0, 1.0)]);
        assert!(reachable(&p, &q, 1.0));
        assert!(!reachable(&p, &q, 0.5));
    }

    #[test]
    fn identical_curves_at_zero_eps() {
        let p = pl(&[(0.0, 0.0), (3.0, 1.0), (5.0, -2.0), (9.0, 4.0)]);
        assert!(reachable(&p, &p, 0.0));
    }

    #[test]
    fn curve_with_repeated_vertex() {
        let p = pl(&[(0.0, 0.0), (1.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let q = pl(&[(0.0, 0.5), (2.0, 0.5)]);
        let d = decide(&p, &q, &DecisionConfig::with_eps(0.5));
        assert_eq!(d.dimensions, (3, 1));
        assert!(d.reachable);
        assert!(!decide(&p, &q, &DecisionConfig::with_eps(0.4)).reachable);
    }

    #[test]
    fn degenerate_input_is_unreachable() {
        let p = pl(&[(0.0, 0.0)]);
        let q = pl(&[(0.0, 0.0), (1.0, 0.0)]);
        let d = decide(&p, &q, &DecisionConfig::with_eps(100.0));
        assert!(!d.reachable);
        assert_eq!(d.dimensions, (0, 0));
        assert!(d.critical_path.is_empty());
    }

    #[test]
    fn nan_vertex_is_never_within_eps() {
        let p = pl(&[(0.0, 0.0), (f64::NAN, 0.0)]);
        let q = pl(&[(1000.0, 1000.0), (2000.0, 5000.0)]);
        let d = decide(&p, &q, &DecisionConfig::with_eps(0.001));
        assert!(!d.reachable);
        assert!(d.critical_path.is_empty());

        let diagram = FreeSpaceDiagram::new(p, q, 0.001);
        let cell = diagram.cell(0, 0).unwrap();
        assert!(cell.bottom.is_empty());
        assert!(cell.left.is_empty());
    }

    #[test]
    fn diagnostics_match_decision() {
        let p = pl(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]);
        let q = pl(&[(0.0, 0.2), (2.0, 0.2)]);
        let clock = StepClock(StdCell::new(0));
        let (decision, diag) =
            decide_with_diagnostics(&p, &q, &DecisionConfig::with_eps(0.5), &clock);
        assert!(decision.reachable);
        assert_eq!(decision, decide(&p, &q, &DecisionConfig::with_eps(0.5)));
        assert!(diag.extraction.is_some());
        assert_eq!(diag.summary.rows, 2);
        assert_eq!(diag.summary.cols, 1);
        assert_eq!(diag.summary.path_point_count, decision.critical_path.len());
        assert!(diag.total_duration >= diag.build.duration);
    }

    #[test]
    fn diagnostics_skip_extraction_when_unreachable() {
        let p = pl(&[(0.0, 0.0), (2.0, 0.0)]);
        let q = pl(&[(0.0, 5.0), (2.0, 5.0)]);
        let clock = StepClock(StdCell::new(0));
        let (decision, diag) =
            decide_with_diagnostics(&p, &q, &DecisionConfig::with_eps(1.0), &clock);
        assert!(!decision.reachable);
        assert!(diag.extraction.is_none());
        assert_eq!(diag.summary.path_point_count, 0);
    }

    #[test]
    fn decision_serde_round_trip() {
        let p = pl(&[(0.0, 0.0), (2.0, 0.0)]);
        let q = pl(&[(0.0, 1.0), (2.0, 1.0)]);
        let d = decide(&p, &q, &DecisionConfig::with_eps(1.0));
        let json = serde_json::to_string(&d).unwrap();
        let back: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(d, back);
    }

    // --- Properties ---

    fn arb_curve() -> impl Strategy<Value = Polyline> {
        prop::collection::vec((-50.0..50.0f64, -50.0..50.0f64), 2..7)
            .prop_map(|pts| pl(&pts))
    }

    proptest! {
        #[test]
        fn identity_is_always_reachable(p in arb_curve(), eps in 0.0..20.0f64) {
            prop_assert!(reachable(&p, &p, eps));
        }

        #[test]
        fn reachability_is_monotone_in_eps(
            p in arb_curve(),
            q in arb_curve(),
            eps in 0.0..80.0f64,
            extra in 0.0..40.0f64,
        ) {
            if reachable(&p, &q, eps) {
                prop_assert!(reachable(&p, &q, eps + extra));
            }
        }

        #[test]
        fn decision_is_symmetric(p in arb_curve(), q in arb_curve(), eps in 0.0..80.0f64) {
            prop_assert_eq!(reachable(&p, &q, eps), reachable(&q, &p, eps));
        }

        #[test]
        fn critical_path_spans_the_grid(p in arb_curve(), q in arb_curve(), eps in 0.0..80.0f64) {
            let d = decide(&p, &q, &DecisionConfig::with_eps(eps));
            if d.reachable {
                let (m, n) = d.dimensions;
                prop_assert_eq!(d.critical_path.first(), Some(&Point::new(0.0, 0.0)));
                #[allow(clippy::cast_precision_loss)]
                let corner = Point::new(m as f64, n as f64);
                prop_assert_eq!(d.critical_path.last(), Some(&corner));
            } else {
                prop_assert!(d.critical_path.is_empty());
            }
        }

        #[test]
        fn very_large_eps_always_reachable(p in arb_curve(), q in arb_curve()) {
            // The diameter of the sampling box bounds every distance.
            prop_assert!(reachable(&p, &q, 200.0));
        }
    }
}
