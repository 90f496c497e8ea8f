//! frechet-export: formats around the Fréchet decision core (sans-IO).
//!
//! Reads and writes the plain-text curve pair format, samples the leash
//! along a critical path and renders free-space diagrams as SVG or PNG.
//! Every function works on in-memory values; file handling is left to
//! the caller.

pub mod curves;
pub mod leash;
pub mod raster;
pub mod svg;

pub use curves::{CurveFileError, CurvePair, parse_curves, to_curve_text};
pub use leash::{LeashSample, max_leash_length, sample_leash};
pub use raster::{RasterConfig, RenderError, diagram_to_image, diagram_to_png};
pub use svg::{SvgMetadata, SvgStyle, curves_to_svg, diagram_to_svg};
