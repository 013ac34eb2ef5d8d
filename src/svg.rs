//! SVG visualization of a composition plan.
//!
//! Draws two annotated panels: the source image with the region that is
//! read, then the canvas with every region that is written.
//!
//! # Example
//!
//! ```
//! use wallfit::{FitPolicy, Size, plan, svg::render_plan_svg};
//!
//! let plan = plan(Size::new(1600, 900), Size::new(400, 400), FitPolicy::Fit).unwrap();
//! let svg = render_plan_svg(&plan);
//!
//! assert!(svg.starts_with("<svg"));
//! assert!(svg.contains("Canvas  400×400"));
//! ```

use core::fmt::Write as _;

use crate::geometry::{CompositionPlan, Rect, Size};

/// Maximum pixel width for any panel in the SVG output.
const MAX_PANEL_W: f64 = 300.0;
/// Maximum pixel height for any panel in the SVG output.
const MAX_PANEL_H: f64 = 200.0;
/// Vertical gap between panels.
const PANEL_GAP: f64 = 50.0;
/// Horizontal margin.
const MARGIN_X: f64 = 50.0;
/// Top margin for first panel.
const MARGIN_TOP: f64 = 30.0;
/// Height of label text area above each panel.
const LABEL_H: f64 = 22.0;
/// Space below a panel for its annotation.
const ANNOTATION_H: f64 = 20.0;
/// Tiles drawn individually; denser tilings are drawn as one region.
const MAX_DRAWN_TILES: usize = 256;

/// One panel: an outer box with highlighted regions inside it.
struct Panel {
    label: String,
    outer: Size,
    /// Highlighted regions, in outer-box pixel coordinates.
    regions: Vec<Rect>,
    /// Outer box painted as background fill rather than neutral.
    background: bool,
    annotation: String,
}

/// Render a complete SVG document for `plan`.
pub fn render_plan_svg(plan: &CompositionPlan) -> String {
    render_panels(&[source_panel(plan), canvas_panel(plan)])
}

fn source_panel(plan: &CompositionPlan) -> Panel {
    let read = plan.source_rect;
    let annotation = if read.is_full(plan.source) {
        String::from("whole image")
    } else {
        format!("read {}×{} at ({}, {})", read.width, read.height, read.x, read.y)
    };
    Panel {
        label: format!("Source  {}", plan.source),
        outer: plan.source,
        regions: vec![read],
        background: false,
        annotation,
    }
}

fn canvas_panel(plan: &CompositionPlan) -> Panel {
    let blits: Vec<_> = plan.blits().collect();
    let regions = if blits.len() > MAX_DRAWN_TILES {
        vec![plan.dest_rect]
    } else {
        blits.iter().map(|b| b.dest).collect()
    };

    let mut annotation = String::from(plan.policy.name());
    if plan.tiled {
        let _ = write!(annotation, ", {} tiles", blits.len());
    } else if plan.needs_scaling() {
        let dest = plan.dest_rect;
        let _ = write!(annotation, ", scaled to {}×{}", dest.width, dest.height);
    }
    if !plan.covers_canvas() && !plan.tiled {
        let dest = plan.dest_rect;
        let _ = write!(annotation, ", placed at ({}, {})", dest.x, dest.y);
    }

    Panel {
        label: format!("Canvas  {}", plan.canvas),
        outer: plan.canvas,
        regions,
        background: plan.needs_background(),
        annotation,
    }
}

/// Scale a Size to fit within MAX_PANEL_W × MAX_PANEL_H, preserving aspect ratio.
fn scale_to_fit(size: Size) -> (f64, f64, f64) {
    let w = size.width as f64;
    let h = size.height as f64;
    if w == 0.0 || h == 0.0 {
        return (1.0, 1.0, 1.0);
    }
    let scale = (MAX_PANEL_W / w).min(MAX_PANEL_H / h);
    (w * scale, h * scale, scale)
}

fn render_panels(panels: &[Panel]) -> String {
    let n = panels.len() as f64;
    let total_h = 2.0 * MARGIN_TOP
        + n * (LABEL_H + MAX_PANEL_H + ANNOTATION_H)
        + (n - 1.0).max(0.0) * PANEL_GAP;
    let total_w = MAX_PANEL_W + 2.0 * MARGIN_X;

    let mut svg = String::with_capacity(4096);
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    );

    svg.push_str(
        r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 11px; fill: #666; }
  .outer { fill: #e8e8e8; stroke: #999; stroke-width: 1; }
  .background { fill: #404040; stroke: #999; stroke-width: 1; }
  .region { fill: #6ba3d6; stroke: #2c6faa; stroke-width: 1; }
  .arrow { stroke: #666; stroke-width: 1.5; fill: none; marker-end: url(#arrowhead); }
  .arrowhead { fill: #666; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #aaa; }
    .outer { fill: #2d2d2d; stroke: #555; }
    .region { fill: #3a72a4; stroke: #5a9fd4; }
    .arrow { stroke: #888; }
    .arrowhead { fill: #888; }
  }
</style>
<defs>
  <marker id="arrowhead" markerWidth="8" markerHeight="6" refX="8" refY="3" orient="auto">
    <polygon points="0 0, 8 3, 0 6" class="arrowhead"/>
  </marker>
</defs>
"##,
    );

    let center_x = total_w / 2.0;
    let mut y = MARGIN_TOP;

    for (i, panel) in panels.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"<text x="{}" y="{}" class="label" text-anchor="middle">{}</text>"#,
            center_x,
            y + 14.0,
            escape_xml(&panel.label)
        );
        y += LABEL_H;

        let (pw, ph, scale) = scale_to_fit(panel.outer);
        let px = center_x - pw / 2.0;
        let class = if panel.background { "background" } else { "outer" };
        let _ = writeln!(
            svg,
            r#"<rect x="{px:.1}" y="{y:.1}" width="{pw:.1}" height="{ph:.1}" class="{class}" rx="2"/>"#
        );

        for r in &panel.regions {
            let _ = writeln!(
                svg,
                r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" class="region"/>"#,
                px + r.x as f64 * scale,
                y + r.y as f64 * scale,
                r.width as f64 * scale,
                r.height as f64 * scale
            );
        }

        if !panel.annotation.is_empty() {
            let _ = writeln!(
                svg,
                r#"<text x="{}" y="{:.1}" class="annotation" text-anchor="middle">{}</text>"#,
                center_x,
                y + ph + 14.0,
                escape_xml(&panel.annotation)
            );
        }
        y += MAX_PANEL_H + ANNOTATION_H;

        if i + 1 < panels.len() {
            let _ = writeln!(
                svg,
                r#"<line x1="{center_x}" y1="{:.1}" x2="{center_x}" y2="{:.1}" class="arrow"/>"#,
                y + 8.0,
                y + PANEL_GAP - 8.0
            );
            y += PANEL_GAP;
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
