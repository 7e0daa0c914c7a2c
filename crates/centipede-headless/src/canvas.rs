use std::fmt::Write as _;

use bytemuck::{Pod, Zeroable};
use centipede_platform::{Canvas, Dimensions, Result, Rgba};
use glam::Vec2;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Background {
        color: Rgba,
    },
    Line {
        from: Vec2,
        to: Vec2,
        stroke: Rgba,
        weight: f32,
    },
    Circle {
        center: Vec2,
        diameter: f32,
        stroke: Rgba,
        fill: Option<Rgba>,
        weight: f32,
    },
    Curve {
        points: Vec<Vec2>,
        stroke: Rgba,
        weight: f32,
    },
}

/// Two of these per line segment, ready for a GPU line-list upload.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct LineVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl LineVertex {
    fn new(position: Vec2, color: Rgba) -> Self {
        Self {
            position: position.to_array(),
            color: [
                color.r as f32 / 255.0,
                color.g as f32 / 255.0,
                color.b as f32 / 255.0,
                color.a as f32 / 255.0,
            ],
        }
    }
}

/// Canvas that keeps the primitives of the latest frame instead of
/// rasterising them.
#[derive(Debug)]
pub struct RecordingCanvas {
    size: Option<Dimensions>,
    stroke: Rgba,
    weight: f32,
    fill: Option<Rgba>,
    frame: Vec<DrawCommand>,
    frames: u64,
    resizes: u32,
}

impl Default for RecordingCanvas {
    fn default() -> Self {
        Self {
            size: None,
            stroke: Rgba::gray(0),
            weight: 1.0,
            fill: Some(Rgba::gray(255)),
            frame: Vec::new(),
            frames: 0,
            resizes: 0,
        }
    }
}

impl RecordingCanvas {
    pub fn size(&self) -> Option<Dimensions> {
        self.size
    }

    /// Commands issued since the last `background` call.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.frame
    }

    /// Frames started with a `background` call.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn resizes(&self) -> u32 {
        self.resizes
    }

    pub fn line_vertices(&self) -> Vec<LineVertex> {
        let mut vertices = Vec::new();
        for command in &self.frame {
            match command {
                DrawCommand::Line {
                    from, to, stroke, ..
                } => {
                    vertices.push(LineVertex::new(*from, *stroke));
                    vertices.push(LineVertex::new(*to, *stroke));
                }
                DrawCommand::Curve { points, stroke, .. } => {
                    for pair in points.windows(2) {
                        vertices.push(LineVertex::new(pair[0], *stroke));
                        vertices.push(LineVertex::new(pair[1], *stroke));
                    }
                }
                DrawCommand::Background { .. } | DrawCommand::Circle { .. } => {}
            }
        }
        vertices
    }

    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.line_vertices()).to_vec()
    }

    /// The latest frame as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let size = self.size.unwrap_or(Dimensions::new(0, 0));
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = size.width,
            h = size.height
        );
        for command in &self.frame {
            match command {
                DrawCommand::Background { color } => {
                    let _ = writeln!(
                        svg,
                        r#"  <rect width="100%" height="100%" {}/>"#,
                        paint("fill", *color)
                    );
                }
                DrawCommand::Line {
                    from,
                    to,
                    stroke,
                    weight,
                } => {
                    let _ = writeln!(
                        svg,
                        r#"  <line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" {} stroke-width="{weight}"/>"#,
                        from.x,
                        from.y,
                        to.x,
                        to.y,
                        paint("stroke", *stroke)
                    );
                }
                DrawCommand::Circle {
                    center,
                    diameter,
                    stroke,
                    fill,
                    weight,
                } => {
                    let fill = fill
                        .map_or_else(|| r#"fill="none""#.to_string(), |c| paint("fill", c));
                    let _ = writeln!(
                        svg,
                        r#"  <circle cx="{:.2}" cy="{:.2}" r="{:.2}" {fill} {} stroke-width="{weight}"/>"#,
                        center.x,
                        center.y,
                        diameter / 2.0,
                        paint("stroke", *stroke)
                    );
                }
                DrawCommand::Curve {
                    points,
                    stroke,
                    weight,
                } => {
                    if let Some(d) = curve_path(points) {
                        let _ = writeln!(
                            svg,
                            r#"  <path d="{d}" fill="none" {} stroke-width="{weight}"/>"#,
                            paint("stroke", *stroke)
                        );
                    }
                }
            }
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn paint(attribute: &str, color: Rgba) -> String {
    let mut out = format!(
        r##"{attribute}="#{:02x}{:02x}{:02x}""##,
        color.r, color.g, color.b
    );
    if color.a < 255 {
        let _ = write!(out, r#" {attribute}-opacity="{:.3}""#, color.a as f32 / 255.0);
    }
    out
}

/// Catmull-Rom through `points[1..n-1]` as cubic Bezier segments; the outer
/// two points only shape the end tangents.
fn curve_path(points: &[Vec2]) -> Option<String> {
    if points.len() < 4 {
        let (first, rest) = points.split_first()?;
        if rest.is_empty() {
            return None;
        }
        let mut d = format!("M{:.2},{:.2}", first.x, first.y);
        for p in rest {
            let _ = write!(d, " L{:.2},{:.2}", p.x, p.y);
        }
        return Some(d);
    }

    let mut d = format!("M{:.2},{:.2}", points[1].x, points[1].y);
    for w in points.windows(4) {
        let (p0, p1, p2, p3) = (w[0], w[1], w[2], w[3]);
        let c1 = p1 + (p2 - p0) / 6.0;
        let c2 = p2 - (p3 - p1) / 6.0;
        let _ = write!(
            d,
            " C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}",
            c1.x, c1.y, c2.x, c2.y, p2.x, p2.y
        );
    }
    Some(d)
}

impl Canvas for RecordingCanvas {
    fn create(&mut self, size: Dimensions) -> Result<()> {
        if !size.is_positive() {
            return Err(format!("cannot create a {size} canvas").into());
        }
        debug!(%size, "canvas created");
        self.size = Some(size);
        Ok(())
    }

    fn resize(&mut self, size: Dimensions) -> Result<()> {
        if self.size.is_none() {
            return Err("resize before create".into());
        }
        if !size.is_positive() {
            return Err(format!("cannot resize canvas to {size}").into());
        }
        self.size = Some(size);
        self.resizes += 1;
        Ok(())
    }

    fn background(&mut self, color: Rgba) {
        self.frame.clear();
        self.frames += 1;
        self.frame.push(DrawCommand::Background { color });
    }

    fn stroke(&mut self, color: Rgba) {
        self.stroke = color;
    }

    fn stroke_weight(&mut self, weight: f32) {
        self.weight = weight;
    }

    fn fill(&mut self, color: Rgba) {
        self.fill = Some(color);
    }

    fn no_fill(&mut self) {
        self.fill = None;
    }

    fn line(&mut self, from: Vec2, to: Vec2) {
        self.frame.push(DrawCommand::Line {
            from,
            to,
            stroke: self.stroke,
            weight: self.weight,
        });
    }

    fn circle(&mut self, center: Vec2, diameter: f32) {
        self.frame.push(DrawCommand::Circle {
            center,
            diameter,
            stroke: self.stroke,
            fill: self.fill,
            weight: self.weight,
        });
    }

    fn curve(&mut self, points: &[Vec2]) {
        self.frame.push(DrawCommand::Curve {
            points: points.to_vec(),
            stroke: self.stroke,
            weight: self.weight,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_starts_a_new_frame() {
        let mut canvas = RecordingCanvas::default();
        canvas.create(Dimensions::new(10, 10)).unwrap();
        canvas.background(Rgba::gray(0));
        canvas.line(Vec2::ZERO, Vec2::ONE);
        canvas.background(Rgba::gray(0));
        canvas.circle(Vec2::ONE, 3.0);
        assert_eq!(canvas.frames(), 2);
        assert_eq!(canvas.commands().len(), 2);
    }

    #[test]
    fn vertices_pack_tightly() {
        let mut canvas = RecordingCanvas::default();
        canvas.stroke(Rgba::new(255, 0, 0, 255));
        canvas.line(Vec2::new(1.0, 2.0), Vec2::new(3.0, 4.0));
        let vertices = canvas.line_vertices();
        assert_eq!(vertices.len(), 2);
        assert_eq!(vertices[1].position, [3.0, 4.0]);
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(canvas.vertex_bytes().len(), 2 * std::mem::size_of::<LineVertex>());
    }

    #[test]
    fn curve_skips_guide_points() {
        let points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(20.0, 0.0),
            Vec2::new(30.0, 0.0),
            Vec2::new(40.0, 0.0),
        ];
        let d = curve_path(&points).unwrap();
        assert!(d.starts_with("M10.00,0.00"));
        assert!(d.ends_with("30.00,0.00"));
        assert_eq!(d.matches('C').count(), 2);
    }

    #[test]
    fn svg_has_viewbox_and_semi_transparent_paint() {
        let mut canvas = RecordingCanvas::default();
        canvas.create(Dimensions::new(40, 30)).unwrap();
        canvas.background(Rgba::gray(0));
        canvas.stroke(Rgba::new(200, 200, 200, 128));
        canvas.line(Vec2::ZERO, Vec2::new(5.0, 5.0));
        let svg = canvas.to_svg();
        assert!(svg.contains(r#"viewBox="0 0 40 30""#));
        assert!(svg.contains(r##"stroke="#c8c8c8" stroke-opacity="0.502""##));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn rejects_empty_sizes() {
        let mut canvas = RecordingCanvas::default();
        assert!(canvas.create(Dimensions::new(0, 10)).is_err());
        assert!(canvas.resize(Dimensions::new(10, 10)).is_err());
    }
}
