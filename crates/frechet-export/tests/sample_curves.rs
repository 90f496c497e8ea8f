//! Integration test: load the sample curve files, decide, and export SVG/PNG.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::PathBuf;

use frechet_core::{DecisionConfig, FreeSpaceDiagram, decide};
use frechet_export::{
    RasterConfig, SvgMetadata, SvgStyle, diagram_to_png, diagram_to_svg, max_leash_length,
    parse_curves, sample_leash,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn load(name: &str) -> frechet_export::CurvePair {
    let path = workspace_root().join("assets/curves").join(name);
    assert!(path.exists(), "curve file not found at {path:?}");
    let text = std::fs::read_to_string(&path).unwrap();
    parse_curves(&text).expect("sample curve file should parse")
}

#[test]
fn default_pair_decides_and_renders() {
    let pair = load("default.txt");
    assert_eq!(pair.skipped_lines, 0);
    assert_eq!(pair.p.segment_count(), 3);
    assert_eq!(pair.q.segment_count(), 3);

    // (30, 80) on Q is 70 away from every point of P.
    assert!(!decide(&pair.p, &pair.q, &DecisionConfig::with_eps(69.0)).reachable);
    // Walking vertex to vertex keeps the leash under 81.
    let decision = decide(&pair.p, &pair.q, &DecisionConfig::with_eps(81.0));
    assert!(decision.reachable);

    let samples = sample_leash(&pair.p, &pair.q, &decision.critical_path, 1);
    assert!(max_leash_length(&samples).unwrap() <= 81.0 + 1e-9);

    let mut diagram = FreeSpaceDiagram::new(pair.p, pair.q, 81.0);
    diagram.propagate();
    assert!(diagram.critical_path().is_some());

    let meta = SvgMetadata {
        title: Some("default"),
        description: Some("eps=81"),
        ..SvgMetadata::default()
    };
    let svg = diagram_to_svg(&diagram, &SvgStyle::default(), &meta);
    assert!(svg.contains("<svg"));
    assert!(svg.contains(r#"id="critical-path""#));
    assert!(svg.contains("</svg>"));

    let png = diagram_to_png(&diagram, &RasterConfig::default()).unwrap();
    assert!(!png.is_empty());

    let out_dir = workspace_root().join("target");
    std::fs::create_dir_all(&out_dir).unwrap();
    let output_path = out_dir.join("default-freespace.svg");
    std::fs::write(&output_path, &svg).unwrap();
    eprintln!("SVG written to {output_path:?} ({} bytes)", svg.len());
}

#[test]
fn backtracking_pair_needs_half_the_detour() {
    let pair = load("backtrack.txt");
    let mut diagram = FreeSpaceDiagram::new(pair.p, pair.q, 2.9);
    diagram.propagate();
    assert!(!diagram.is_far_corner_reachable());
    assert!(diagram.critical_path().is_none());

    diagram.set_eps(3.0 + 1e-9);
    assert!(diagram.is_stale());
    diagram.propagate();
    assert!(diagram.is_far_corner_reachable());
    assert!(diagram.critical_path().is_some());
}
