//! SVG renderings of curves and free-space diagrams.
//!
//! Documents are built with the [`svg`] crate, which handles XML
//! escaping and path data formatting.
//!
//! - [`diagram_to_svg`] draws the parameter plane `[0, m] x [0, n]`:
//!   the cell grid, feasibility intervals, reachable intervals and the
//!   cached critical path. The y axis is flipped so parameter `(0, 0)`
//!   sits bottom-left.
//! - [`curves_to_svg`] draws both curves in their own coordinates with a
//!   marker on every vertex.
//!
//! Optional [`SvgMetadata`] embeds `<title>`, `<desc>` and a `<metadata>`
//! element carrying the decision config as JSON.
//!
//! These are pure functions with no I/O; they return a `String`.

use serde::{Deserialize, Serialize};
use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Line, Path, Rectangle, Title};
use svg::node::{Node, Text, Value};

use frechet_core::{Cell, FreeSpaceDiagram, Interval, Point, Polyline, Side};

/// Namespace of the `<frechet:config>` metadata element.
const CONFIG_NAMESPACE: &str = "urn:frechet:config:1";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped by the `svg`
/// crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the curve file name.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized `DecisionConfig`, emitted inside `<metadata>` as a
    /// namespaced `<frechet:config>` element so the rendering can be
    /// reproduced.
    pub config_json: Option<&'a str>,
}

/// Colours and sizes for [`diagram_to_svg`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SvgStyle {
    /// Side length of one cell in SVG user units.
    pub cell_size: f64,
    /// Blank border around the grid.
    pub margin: f64,
    /// Grid line colour.
    pub grid_color: String,
    /// Feasibility interval colour.
    pub free_color: String,
    /// Reachable interval colour.
    pub reachable_color: String,
    /// Critical path colour.
    pub path_color: String,
    /// Stroke width of interval and path strokes.
    pub stroke_width: f64,
}

impl SvgStyle {
    /// Default cell size.
    pub const DEFAULT_CELL_SIZE: f64 = 60.0;
    /// Default margin.
    pub const DEFAULT_MARGIN: f64 = 10.0;
    /// Default stroke width.
    pub const DEFAULT_STROKE_WIDTH: f64 = 3.0;
}

impl Default for SvgStyle {
    fn default() -> Self {
        Self {
            cell_size: Self::DEFAULT_CELL_SIZE,
            margin: Self::DEFAULT_MARGIN,
            grid_color: "black".to_owned(),
            free_color: "blue".to_owned(),
            reachable_color: "green".to_owned(),
            path_color: "red".to_owned(),
            stroke_width: Self::DEFAULT_STROKE_WIDTH,
        }
    }
}

/// Build an SVG path `d` attribute string from a polyline.
///
/// Uses `M` for the first point and `L` for subsequent points.
/// Returns an empty string for polylines with fewer than 2 points.
///
/// # Examples
///
/// ```
/// use frechet_core::{Point, Polyline};
/// use frechet_export::svg::build_path_data;
///
/// let polyline = Polyline::new(vec![
///     Point::new(10.0, 20.0),
///     Point::new(30.0, 40.0),
/// ]);
/// assert_eq!(build_path_data(polyline.points(), |p| (p.x, p.y)), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[Point], transform: impl Fn(Point) -> (f64, f64)) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(transform(*first));
    for p in rest {
        data = data.line_to(transform(*p));
    }
    String::from(Value::from(data))
}

/// Serialize a free-space diagram into an SVG string.
///
/// The reachable layer is omitted while the diagram's reachability data
/// is stale, and the critical path is drawn only if one is cached (see
/// [`FreeSpaceDiagram::critical_path`]).
///
/// # Examples
///
/// ```
/// use frechet_core::{FreeSpaceDiagram, Point, Polyline};
/// use frechet_export::svg::{SvgMetadata, SvgStyle, diagram_to_svg};
///
/// let p = Polyline::new(vec![Point::new(0.0, 0.0), Point::new(2.0, 0.0)]);
/// let q = Polyline::new(vec![Point::new(0.0, 1.0), Point::new(2.0, 1.0)]);
/// let mut diagram = FreeSpaceDiagram::new(p, q, 1.0);
/// diagram.propagate();
/// diagram.critical_path();
///
/// let svg = diagram_to_svg(&diagram, &SvgStyle::default(), &SvgMetadata::default());
/// assert!(svg.contains(r#"<g id="critical-path""#));
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn diagram_to_svg(
    diagram: &FreeSpaceDiagram,
    style: &SvgStyle,
    metadata: &SvgMetadata<'_>,
) -> String {
    let (rows, cols) = diagram.dimensions();
    let cell = style.cell_size;
    let margin = style.margin;
    let width = (rows as f64).mul_add(cell, 2.0 * margin);
    let height = (cols as f64).mul_add(cell, 2.0 * margin);

    // Parameter plane -> SVG user units, y up.
    let to_svg = |p: Point| {
        (
            p.x.mul_add(cell, margin),
            (cols as f64 - p.y).mul_add(cell, margin),
        )
    };

    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));
    doc = add_metadata(doc, metadata);

    doc = doc.add(
        Rectangle::new()
            .set("width", width)
            .set("height", height)
            .set("fill", "white"),
    );

    let mut grid = Group::new()
        .set("id", "grid")
        .set("stroke", style.grid_color.as_str())
        .set("stroke-width", 1);
    for i in 0..=rows {
        let x = i as f64;
        grid = grid.add(line(
            to_svg(Point::new(x, 0.0)),
            to_svg(Point::new(x, cols as f64)),
        ));
    }
    for j in 0..=cols {
        let y = j as f64;
        grid = grid.add(line(
            to_svg(Point::new(0.0, y)),
            to_svg(Point::new(rows as f64, y)),
        ));
    }
    doc = doc.add(grid);

    doc = doc.add(interval_layer(
        diagram,
        "free",
        &style.free_color,
        style.stroke_width,
        Cell::feasible,
        to_svg,
    ));

    if !diagram.is_stale() {
        doc = doc.add(interval_layer(
            diagram,
            "reachable",
            &style.reachable_color,
            style.stroke_width,
            Cell::reachable,
            to_svg,
        ));
    }

    if let Some(path) = diagram.cached_critical_path() {
        let d = build_path_data(path.points(), to_svg);
        if !d.is_empty() {
            doc = doc.add(
                Group::new().set("id", "critical-path").add(
                    Path::new()
                        .set("d", d)
                        .set("fill", "none")
                        .set("stroke", style.path_color.as_str())
                        .set("stroke-width", style.stroke_width),
                ),
            );
        }
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Serialize both curves into an SVG string.
///
/// The view box is the bounding box of both curves plus a 5% border,
/// with y pointing up. `P` is drawn in blue, `Q` in orange.
#[must_use]
pub fn curves_to_svg(p: &Polyline, q: &Polyline, metadata: &SvgMetadata<'_>) -> String {
    let bounds = p
        .points()
        .iter()
        .chain(q.points())
        .fold(None, |acc: Option<(Point, Point)>, pt| {
            Some(acc.map_or((*pt, *pt), |(lo, hi)| {
                (
                    Point::new(lo.x.min(pt.x), lo.y.min(pt.y)),
                    Point::new(hi.x.max(pt.x), hi.y.max(pt.y)),
                )
            }))
        });
    let (lo, hi) = bounds.unwrap_or((Point::new(0.0, 0.0), Point::new(1.0, 1.0)));

    let extent = (hi.x - lo.x).max(hi.y - lo.y).max(1.0);
    let pad = extent * 0.05;
    let width = 2.0f64.mul_add(pad, hi.x - lo.x);
    let height = 2.0f64.mul_add(pad, hi.y - lo.y);
    let stroke = extent / 300.0;
    let to_svg = |pt: Point| (pt.x - lo.x + pad, hi.y - pt.y + pad);

    let mut doc = Document::new()
        .set("width", width)
        .set("height", height)
        .set("viewBox", (0.0, 0.0, width, height));
    doc = add_metadata(doc, metadata);

    for (id, curve, color) in [("P", p, "#1f77b4"), ("Q", q, "#ff7f0e")] {
        let mut group = Group::new().set("fill", color).set("id", id);
        let d = build_path_data(curve.points(), to_svg);
        if !d.is_empty() {
            group = group.add(
                Path::new()
                    .set("d", d)
                    .set("fill", "none")
                    .set("stroke", color)
                    .set("stroke-width", stroke),
            );
        }
        for pt in curve.points() {
            let (cx, cy) = to_svg(*pt);
            group = group.add(
                Circle::new()
                    .set("cx", cx)
                    .set("cy", cy)
                    .set("r", stroke * 2.0),
            );
        }
        doc = doc.add(group);
    }

    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}

/// Add the optional `<title>`, `<desc>` and `<metadata>` elements.
fn add_metadata(mut doc: Document, metadata: &SvgMetadata<'_>) -> Document {
    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("frechet:config");
        config_el.assign("xmlns:frechet", CONFIG_NAMESPACE);
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    doc
}

fn line((x1, y1): (f64, f64), (x2, y2): (f64, f64)) -> Line {
    Line::new()
        .set("x1", x1)
        .set("x2", x2)
        .set("y1", y1)
        .set("y2", y2)
}

/// One stroke per non-empty interval of every cell side.
///
/// Single-point intervals become zero-length strokes, which the round
/// line caps render as dots.
#[allow(clippy::cast_precision_loss)]
fn interval_layer(
    diagram: &FreeSpaceDiagram,
    id: &str,
    color: &str,
    stroke_width: f64,
    pick: impl Fn(&Cell, Side) -> Interval,
    to_svg: impl Fn(Point) -> (f64, f64),
) -> Group {
    let (rows, cols) = diagram.dimensions();
    let mut group = Group::new()
        .set("id", id)
        .set("stroke", color)
        .set("stroke-linecap", "round")
        .set("stroke-width", stroke_width);

    for i in 0..rows {
        for j in 0..cols {
            let Some(cell) = diagram.cell(i, j) else {
                continue;
            };
            let (x, y) = (i as f64, j as f64);
            for side in Side::ALL {
                let Some((s, e)) = pick(cell, side).bounds() else {
                    continue;
                };
                let (a, b) = match side {
                    Side::Bottom => (Point::new(x + s, y), Point::new(x + e, y)),
                    Side::Top => (Point::new(x + s, y + 1.0), Point::new(x + e, y + 1.0)),
                    Side::Left => (Point::new(x, y + s), Point::new(x, y + e)),
                    Side::Right => (Point::new(x + 1.0, y + s), Point::new(x + 1.0, y + e)),
                };
                group = group.add(line(to_svg(a), to_svg(b)));
            }
        }
    }

    group
}
