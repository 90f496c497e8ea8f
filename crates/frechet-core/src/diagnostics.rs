//! Decision diagnostics: timing and counts for each stage.
//!
//! Collected by [`decide_with_diagnostics`](crate::decide_with_diagnostics)
//! alongside the decision itself. Intended for the bench CLI and for
//! comparing curve pairs of different sizes.
//!
//! Time is read through the [`Clock`] trait so the core stays free of
//! platform time sources and tests can use a fixed clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single decision run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionDiagnostics {
    /// Diagram construction (feasibility intervals).
    pub build: StageDiagnostics,
    /// Reachability propagation.
    pub propagation: StageDiagnostics,
    /// Critical-path extraction (only when the far corner is reachable).
    pub extraction: Option<StageDiagnostics>,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary of the run.
    pub summary: DecisionSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Diagram construction metrics.
    Build {
        /// Segments of `P`.
        rows: usize,
        /// Segments of `Q`.
        cols: usize,
        /// Cell boundaries with a non-empty feasibility interval.
        free_edge_count: usize,
    },
    /// Propagation metrics.
    Propagation {
        /// Cell boundaries with a non-empty reachable interval.
        reachable_edge_count: usize,
        /// Whether the far corner was reached.
        far_corner_reachable: bool,
    },
    /// Critical-path metrics.
    Extraction {
        /// Number of points on the path.
        point_count: usize,
        /// Whether the path is monotone in both parameters.
        monotone: bool,
    },
}

/// High-level summary of a decision run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSummary {
    /// Tolerance the run used.
    pub eps: f64,
    /// Segments of `P`.
    pub rows: usize,
    /// Segments of `Q`.
    pub cols: usize,
    /// The decision: Fréchet distance at most ε.
    pub reachable: bool,
    /// Points on the critical path (0 when unreachable).
    pub path_point_count: usize,
}

impl DecisionDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Decision Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Grid: {}x{} ({} cells)  eps={}",
            self.summary.rows,
            self.summary.cols,
            self.summary.rows * self.summary.cols,
            self.summary.eps,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);

        let mut stages = vec![("Build", &self.build), ("Propagation", &self.propagation)];
        if let Some(ref extraction) = self.extraction {
            stages.push(("Extraction", extraction));
        }

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Reachable: {}  |  Critical path points: {}",
            if self.summary.reachable { "yes" } else { "no" },
            self.summary.path_point_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Build {
            rows,
            cols,
            free_edge_count,
        } => {
            let total = rows * cols * 4;
            #[allow(clippy::cast_precision_loss)]
            let density = if total > 0 {
                *free_edge_count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            format!("{rows}x{cols} free edges={free_edge_count}/{total} ({density:.1}%)")
        }
        StageMetrics::Propagation {
            reachable_edge_count,
            far_corner_reachable,
        } => {
            format!("reachable edges={reachable_edge_count} far corner={far_corner_reachable}")
        }
        StageMetrics::Extraction {
            point_count,
            monotone,
        } => format!("{point_count} pts monotone={monotone}"),
    }
}
