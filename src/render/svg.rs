//! SVG serialization of vector drawings.

use crate::model::BBox;
use crate::source::{Drawing, PathSegment, Point, Rgb};

/// Render a drawing as a standalone SVG document.
///
/// Paths keep their page coordinates; the view box is the block's bbox,
/// so the file shows exactly the area the block occupies on the page.
pub fn render_drawing(bbox: &BBox, drawing: &Drawing) -> String {
    let width = bbox.width().max(1.0);
    let height = bbox.height().max(1.0);

    let mut out = String::new();
    out.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"{x} {y} {w} {h}\">",
        x = num(bbox.x0),
        y = num(bbox.y0),
        w = num(width),
        h = num(height),
    ));

    for path in &drawing.paths {
        let d = path_data(&path.segments);
        if d.is_empty() {
            continue;
        }

        let paint = &path.paint;
        out.push_str(&format!("\n<path d=\"{}\" fill=\"{}\"", d, color(paint.fill)));
        if paint.fill.is_some() && paint.even_odd {
            out.push_str(" fill-rule=\"evenodd\"");
        }
        match paint.stroke {
            Some(stroke) => {
                out.push_str(&format!(
                    " stroke=\"{}\" stroke-width=\"{}\"",
                    color(Some(stroke)),
                    num(paint.line_width.max(0.1))
                ));
            }
            None => out.push_str(" stroke=\"none\""),
        }
        out.push_str("/>");
    }

    out.push_str("\n</svg>\n");
    out
}

fn path_data(segments: &[PathSegment]) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(segments.len());
    for segment in segments {
        parts.push(match segment {
            PathSegment::MoveTo(p) => format!("M{}", point(p)),
            PathSegment::LineTo(p) => format!("L{}", point(p)),
            PathSegment::CurveTo(a, b, c) => format!("C{} {} {}", point(a), point(b), point(c)),
            PathSegment::Close => "Z".to_string(),
        });
    }
    parts.join(" ")
}

fn point(p: &Point) -> String {
    format!("{} {}", num(p.x), num(p.y))
}

fn color(c: Option<Rgb>) -> String {
    match c {
        Some(Rgb(r, g, b)) => format!("#{:02x}{:02x}{:02x}", r, g, b),
        None => "none".to_string(),
    }
}

/// Format a coordinate with at most two decimals.
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}
