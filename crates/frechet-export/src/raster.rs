//! PNG rendering of the free-space diagram.
//!
//! Unlike the SVG view, which only shows the cell boundaries, the raster
//! view samples the free space inside every cell: each pixel centre is
//! mapped to a parameter pair `(s, t)` and painted when
//! `|P(s) - Q(t)| <= eps`. Grid lines, reachable intervals and the cached
//! critical path are stroked on top with `tiny-skia`, and the result is
//! encoded with `image`.

use image::{ImageEncoder, Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tiny_skia::{
    Color, ColorU8, FillRule, LineCap, LineJoin, Paint, Path, PathBuilder, Pixmap, Stroke,
    Transform,
};

use frechet_core::{FreeSpaceDiagram, Point, Side};

/// Errors from rasterizing a diagram.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The requested image size is zero or too large to allocate.
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncode(String),
}

impl From<image::ImageError> for RenderError {
    fn from(err: image::ImageError) -> Self {
        Self::PngEncode(err.to_string())
    }
}

/// Raster output settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterConfig {
    /// Side length of one cell in pixels.
    pub cell_pixels: u32,
    /// Blank border around the grid in pixels.
    pub margin_pixels: u32,
    /// Width of grid, interval and path strokes in pixels.
    pub line_width: f32,
    /// Colour outside the free space.
    pub background: [u8; 4],
    /// Colour of the free space.
    pub free: [u8; 4],
    /// Grid line colour.
    pub grid: [u8; 4],
    /// Reachable interval colour.
    pub reachable: [u8; 4],
    /// Critical path colour.
    pub path: [u8; 4],
}

impl RasterConfig {
    /// Default cell size in pixels.
    pub const DEFAULT_CELL_PIXELS: u32 = 64;
    /// Default margin in pixels.
    pub const DEFAULT_MARGIN_PIXELS: u32 = 8;
    /// Default stroke width in pixels.
    pub const DEFAULT_LINE_WIDTH: f32 = 2.0;
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            cell_pixels: Self::DEFAULT_CELL_PIXELS,
            margin_pixels: Self::DEFAULT_MARGIN_PIXELS,
            line_width: Self::DEFAULT_LINE_WIDTH,
            background: [255, 255, 255, 255],
            free: [173, 200, 255, 255],
            grid: [0, 0, 0, 255],
            reachable: [0, 160, 0, 255],
            path: [220, 0, 0, 255],
        }
    }
}

/// Render `diagram` into an RGBA image.
///
/// # Errors
///
/// Returns [`RenderError::Pixmap`] if the image would be empty or too
/// large to allocate.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_lossless
)]
pub fn diagram_to_image(
    diagram: &FreeSpaceDiagram,
    config: &RasterConfig,
) -> Result<RgbaImage, RenderError> {
    let (rows, cols) = diagram.dimensions();
    let cell = config.cell_pixels;
    let margin = config.margin_pixels;
    let too_large = || RenderError::Pixmap {
        width: u32::MAX,
        height: u32::MAX,
    };
    let width = side_pixels(rows, cell, margin).ok_or_else(too_large)?;
    let height = side_pixels(cols, cell, margin).ok_or_else(too_large)?;
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;

    let [r, g, b, a] = config.background;
    pixmap.fill(Color::from_rgba8(r, g, b, a));

    // Parameter plane -> pixel coordinates, y up.
    let cell_f = f64::from(cell);
    let margin_f = f64::from(margin);
    let cols_f = cols as f64;
    let to_pixel = |p: Point| {
        (
            p.x.mul_add(cell_f, margin_f) as f32,
            (cols_f - p.y).mul_add(cell_f, margin_f) as f32,
        )
    };

    shade_free_space(diagram, &mut pixmap, config);

    let stroke = Stroke {
        width: config.line_width,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..Stroke::default()
    };

    let mut grid = PathBuilder::new();
    for i in 0..=rows {
        let x = i as f64;
        segment(&mut grid, to_pixel(Point::new(x, 0.0)), to_pixel(Point::new(x, cols_f)));
    }
    for j in 0..=cols {
        let y = j as f64;
        segment(&mut grid, to_pixel(Point::new(0.0, y)), to_pixel(Point::new(rows as f64, y)));
    }
    let grid_stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };
    stroke_with(&mut pixmap, grid.finish(), config.grid, &grid_stroke);

    if !diagram.is_stale() {
        let mut reachable = PathBuilder::new();
        let mut dots = Vec::new();
        for i in 0..rows {
            for j in 0..cols {
                let Some(c) = diagram.cell(i, j) else {
                    continue;
                };
                let (x, y) = (i as f64, j as f64);
                for side in Side::ALL {
                    let Some((s, e)) = c.reachable(side).bounds() else {
                        continue;
                    };
                    let (from, to) = match side {
                        Side::Bottom => (Point::new(x + s, y), Point::new(x + e, y)),
                        Side::Top => (Point::new(x + s, y + 1.0), Point::new(x + e, y + 1.0)),
                        Side::Left => (Point::new(x, y + s), Point::new(x, y + e)),
                        Side::Right => (Point::new(x + 1.0, y + s), Point::new(x + 1.0, y + e)),
                    };
                    if from == to {
                        dots.push(to_pixel(from));
                    } else {
                        segment(&mut reachable, to_pixel(from), to_pixel(to));
                    }
                }
            }
        }
        stroke_with(&mut pixmap, reachable.finish(), config.reachable, &stroke);
        for (x, y) in dots {
            fill_with(
                &mut pixmap,
                PathBuilder::from_circle(x, y, config.line_width),
                config.reachable,
            );
        }
    }

    if let Some(path) = diagram.cached_critical_path() {
        let mut pb = PathBuilder::new();
        if let [first, rest @ ..] = path.points() {
            let (x, y) = to_pixel(*first);
            pb.move_to(x, y);
            for p in rest {
                let (x, y) = to_pixel(*p);
                pb.line_to(x, y);
            }
        }
        stroke_with(&mut pixmap, pb.finish(), config.path, &stroke);
    }

    Ok(unpremultiply(&pixmap))
}

/// Render `diagram` and encode it as PNG bytes.
///
/// # Errors
///
/// Returns [`RenderError::Pixmap`] if the image cannot be allocated and
/// [`RenderError::PngEncode`] if encoding fails.
pub fn diagram_to_png(
    diagram: &FreeSpaceDiagram,
    config: &RasterConfig,
) -> Result<Vec<u8>, RenderError> {
    let img = diagram_to_image(diagram, config)?;
    let mut png_bytes = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
    encoder.write_image(
        img.as_raw(),
        img.width(),
        img.height(),
        image::ExtendedColorType::Rgba8,
    )?;

    tracing::debug!(
        width = img.width(),
        height = img.height(),
        bytes = png_bytes.len(),
        "encoded free-space PNG"
    );
    Ok(png_bytes)
}

/// `count * cell + 2 * margin`, or `None` on overflow.
fn side_pixels(count: usize, cell: u32, margin: u32) -> Option<u32> {
    u32::try_from(count)
        .ok()?
        .checked_mul(cell)?
        .checked_add(margin.checked_mul(2)?)
}

/// Paint every pixel whose centre lies in the free space.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn shade_free_space(diagram: &FreeSpaceDiagram, pixmap: &mut Pixmap, config: &RasterConfig) {
    let (rows, cols) = diagram.dimensions();
    if rows == 0 || cols == 0 || config.cell_pixels == 0 {
        return;
    }

    let width = pixmap.width() as usize;
    let cell = f64::from(config.cell_pixels);
    let margin = config.margin_pixels as usize;
    let grid_w = rows * config.cell_pixels as usize;
    let grid_h = cols * config.cell_pixels as usize;
    let eps = diagram.eps();
    let [r, g, b, a] = config.free;
    let free = ColorU8::from_rgba(r, g, b, a).premultiply();

    let pixels = pixmap.pixels_mut();
    for py in 0..grid_h {
        let t = cols as f64 - (py as f64 + 0.5) / cell;
        let Some(q) = diagram.q().point_at(t) else {
            return;
        };
        for px in 0..grid_w {
            let s = (px as f64 + 0.5) / cell;
            let Some(p) = diagram.p().point_at(s) else {
                return;
            };
            if p.distance(q) <= eps {
                pixels[(py + margin) * width + px + margin] = free;
            }
        }
    }
}

fn segment(pb: &mut PathBuilder, (x1, y1): (f32, f32), (x2, y2): (f32, f32)) {
    pb.move_to(x1, y1);
    pb.line_to(x2, y2);
}

fn paint_for([r, g, b, a]: [u8; 4]) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

fn stroke_with(pixmap: &mut Pixmap, path: Option<Path>, color: [u8; 4], stroke: &Stroke) {
    // Empty builders yield no path; nothing to draw.
    if let Some(path) = path {
        pixmap.stroke_path(&path, &paint_for(color), stroke, Transform::identity(), None);
    }
}

fn fill_with(pixmap: &mut Pixmap, path: Option<Path>, color: [u8; 4]) {
    if let Some(path) = path {
        pixmap.fill_path(
            &path,
            &paint_for(color),
            FillRule::Winding,
            Transform::identity(),
            None,
        );
    }
}

/// Convert the pixmap (premultiplied RGBA) to an `RgbaImage` (straight RGBA).
#[allow(clippy::cast_possible_truncation)]
fn unpremultiply(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (pixel, src) in img.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        let a = src[3];
        *pixel = if a == 0 {
            Rgba([0, 0, 0, 0])
        } else {
            let channel = |c: u8| (u16::from(c) * 255 / u16::from(a)) as u8;
            Rgba([channel(src[0]), channel(src[1]), channel(src[2]), a])
        };
    }
    img
}
