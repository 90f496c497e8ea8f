//! Plain-text curve pair format.
//!
//! A file holds two polylines. A line containing only `P` or `Q` starts
//! the corresponding curve; every following line up to the next header
//! holds one vertex as two whitespace-separated numbers:
//!
//! ```text
//! # sample pair
//! P
//! 0 0
//! 40 0
//! Q
//! 0 50
//! 30 80
//! ```
//!
//! Blank lines and lines beginning with `#` are ignored. Malformed lines
//! are skipped with a warning rather than failing the whole file; only a
//! curve left with fewer than 2 vertices is an error.
//!
//! This is sans-IO: reading works on `&str`, writing returns a `String`.

use std::fmt::Write;

use frechet_core::{Point, Polyline};

/// Both curves of a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct CurvePair {
    /// Curve `P` (rows of the free-space diagram).
    pub p: Polyline,
    /// Curve `Q` (columns of the free-space diagram).
    pub q: Polyline,
    /// Number of non-blank, non-comment lines that were ignored.
    pub skipped_lines: usize,
}

/// Errors from [`parse_curves`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurveFileError {
    /// A curve ended up with too few vertices to form a segment.
    #[error("curve {label} needs at least 2 points, got {points}")]
    InvalidCurve {
        /// `'P'` or `'Q'`.
        label: char,
        /// Number of vertices read for it.
        points: usize,
    },
}

/// Parse a curve pair.
///
/// # Errors
///
/// Returns [`CurveFileError::InvalidCurve`] if either curve has fewer
/// than 2 valid vertices (`P` is checked first).
///
/// # Examples
///
/// ```
/// use frechet_export::curves::parse_curves;
///
/// let pair = parse_curves("P\n0 0\n1 0\nQ\n0 1\n1 1\n").unwrap();
/// assert_eq!(pair.p.len(), 2);
/// assert_eq!(pair.q.segment_count(), 1);
/// assert_eq!(pair.skipped_lines, 0);
/// ```
pub fn parse_curves(text: &str) -> Result<CurvePair, CurveFileError> {
    let mut p = Vec::new();
    let mut q = Vec::new();
    let mut current: Option<char> = None;
    let mut skipped_lines = 0;

    for (index, raw) in text.lines().enumerate() {
        let line = raw.trim();
        let line_number = index + 1;
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line {
            "P" => {
                current = Some('P');
                continue;
            }
            "Q" => {
                current = Some('Q');
                continue;
            }
            _ => {}
        }

        let Some(label) = current else {
            tracing::warn!(line_number, line, "point without curve header");
            skipped_lines += 1;
            continue;
        };
        let Some(point) = parse_point(line) else {
            tracing::warn!(line_number, line, "invalid curve line");
            skipped_lines += 1;
            continue;
        };

        if label == 'P' {
            p.push(point);
        } else {
            q.push(point);
        }
    }

    for (label, points) in [('P', &p), ('Q', &q)] {
        if points.len() < 2 {
            return Err(CurveFileError::InvalidCurve {
                label,
                points: points.len(),
            });
        }
    }

    tracing::debug!(
        p_points = p.len(),
        q_points = q.len(),
        skipped_lines,
        "parsed curve pair"
    );

    Ok(CurvePair {
        p: Polyline::new(p),
        q: Polyline::new(q),
        skipped_lines,
    })
}

/// Exactly two finite numbers, or `None`.
fn parse_point(line: &str) -> Option<Point> {
    let mut tokens = line.split_whitespace();
    let x: f64 = tokens.next()?.parse().ok()?;
    let y: f64 = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    let point = Point::new(x, y);
    point.is_finite().then_some(point)
}

/// Serialize a curve pair in the format read by [`parse_curves`].
///
/// Coordinates use the shortest representation that parses back to the
/// same `f64`.
#[must_use]
pub fn to_curve_text(p: &Polyline, q: &Polyline) -> String {
    let mut out = String::new();
    for (label, curve) in [('P', p), ('Q', q)] {
        let _ = writeln!(out, "{label}");
        for point in curve.points() {
            let _ = writeln!(out, "{} {}", point.x, point.y);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pl(points: &[(f64, f64)]) -> Polyline {
        Polyline::new(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn parses_both_curves() {
        let text = "P\n0 0\n40 0\n80 30\nQ\n0 50\n30 80\n";
        let pair = parse_curves(text).unwrap();
        assert_eq!(pair.p, pl(&[(0.0, 0.0), (40.0, 0.0), (80.0, 30.0)]));
        assert_eq!(pair.q, pl(&[(0.0, 50.0), (30.0, 80.0)]));
        assert_eq!(pair.skipped_lines, 0);
    }

    #[test]
    fn q_may_come_first() {
        let pair = parse_curves("Q\n5 5\n6 6\nP\n1 1\n2 2\n").unwrap();
        assert_eq!(pair.p.first(), Some(&Point::new(1.0, 1.0)));
        assert_eq!(pair.q.first(), Some(&Point::new(5.0, 5.0)));
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let text = "# header\n\nP\n0 0\n\n# mid\n1 0\nQ\n0 1\n1 1\n\n";
        let pair = parse_curves(text).unwrap();
        assert_eq!(pair.p.len(), 2);
        assert_eq!(pair.skipped_lines, 0);
    }

    #[test]
    fn tabs_and_crlf_are_accepted() {
        let pair = parse_curves("P\r\n0\t0\r\n1   2\r\nQ\r\n3 4\r\n5\t6\r\n").unwrap();
        assert_eq!(pair.p.last(), Some(&Point::new(1.0, 2.0)));
        assert_eq!(pair.q.last(), Some(&Point::new(5.0, 6.0)));
    }

    #[test]
    fn malformed_lines_are_skipped_and_counted() {
        let text = "1 1\nP\n0 0\nabc 1\n1 2 3\n7\n1 0\nQ\n0 1\nnan 2\n1 1\n";
        let pair = parse_curves(text).unwrap();
        assert_eq!(pair.p, pl(&[(0.0, 0.0), (1.0, 0.0)]));
        assert_eq!(pair.q, pl(&[(0.0, 1.0), (1.0, 1.0)]));
        // Headerless point, three bad P lines, one non-finite Q line.
        assert_eq!(pair.skipped_lines, 5);
    }

    #[test]
    fn repeated_header_appends() {
        let pair = parse_curves("P\n0 0\nQ\n0 1\n1 1\nP\n1 0\n").unwrap();
        assert_eq!(pair.p, pl(&[(0.0, 0.0), (1.0, 0.0)]));
    }

    #[test]
    fn short_curve_is_rejected() {
        let err = parse_curves("P\n0 0\nQ\n0 1\n1 1\n").unwrap_err();
        assert_eq!(err, CurveFileError::InvalidCurve { label: 'P', points: 1 });
        assert_eq!(err.to_string(), "curve P needs at least 2 points, got 1");

        let err = parse_curves("P\n0 0\n1 0\n").unwrap_err();
        assert_eq!(err, CurveFileError::InvalidCurve { label: 'Q', points: 0 });
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(parse_curves("").is_err());
    }

    #[test]
    fn writer_output_reads_back() {
        let p = pl(&[(0.0, 0.0), (40.5, -1.25), (0.1, 1e-7)]);
        let q = pl(&[(3.0, 4.0), (5.0, 6.0)]);
        let text = to_curve_text(&p, &q);
        assert!(text.starts_with("P\n0 0\n40.5 -1.25\n"));
        let pair = parse_curves(&text).unwrap();
        assert_eq!(pair.p, p);
        assert_eq!(pair.q, q);
    }
}
