//! On-screen LED outlines, drawn as filled shapes on a half-block canvas.
//!
//! Geometry works in pixel units with `y` growing downwards; [`Led`] flips
//! into the canvas' y-up space when painting.

use std::f64::consts::{FRAC_PI_2, PI};

use ratatui::style::Color;
use ratatui::widgets::canvas::{Painter, Shape};

use crate::settings::LedShape;

const STAR_POINTS: usize = 5;
const STAR_INNER: f64 = 0.4;
const X_REACH: f64 = 0.8;
const X_HALF_WIDTH: f64 = 0.2;

type Point = (f64, f64);

fn cross(o: Point, a: Point, b: Point) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Even-odd ray cast.
fn in_polygon(p: Point, poly: &[Point]) -> bool {
    let mut inside = false;
    let mut j = poly.len() - 1;
    for i in 0..poly.len() {
        let (a, b) = (poly[i], poly[j]);
        if (a.1 > p.1) != (b.1 > p.1) && p.0 < (b.0 - a.0) * (p.1 - a.1) / (b.1 - a.1) + a.0 {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let len2 = vx * vx + vy * vy;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * vx + (p.1 - a.1) * vy) / len2).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * vx, a.1 + t * vy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}

fn star(r: f64) -> [Point; STAR_POINTS * 2] {
    let mut pts = [(0.0, 0.0); STAR_POINTS * 2];
    for (i, pt) in pts.iter_mut().enumerate() {
        let radius = if i % 2 == 0 { r } else { r * STAR_INNER };
        let angle = -FRAC_PI_2 + i as f64 * PI / STAR_POINTS as f64;
        *pt = (radius * angle.cos(), radius * angle.sin());
    }
    pts
}

/// Whether offset `(dx, dy)` from the LED centre falls inside `shape` of
/// radius `r`. Triangles and stars point up.
pub fn contains(shape: LedShape, dx: f64, dy: f64, r: f64) -> bool {
    let p = (dx, dy);
    match shape {
        LedShape::Circle => dx * dx + dy * dy <= r * r,
        LedShape::Square => dx.abs() <= r && dy.abs() <= r,
        LedShape::Triangle => {
            let half_base = r * 3f64.sqrt() / 2.0;
            let (a, b, c) = ((0.0, -r), (half_base, r / 2.0), (-half_base, r / 2.0));
            let (d1, d2, d3) = (cross(a, b, p), cross(b, c, p), cross(c, a, p));
            let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
            let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
            !(has_neg && has_pos)
        }
        LedShape::Star => in_polygon(p, &star(r)),
        LedShape::X => {
            let k = r * X_REACH;
            let w = r * X_HALF_WIDTH;
            segment_distance(p, (-k, -k), (k, k)) <= w || segment_distance(p, (-k, k), (k, -k)) <= w
        }
    }
}

/// One LED in canvas pixel space. `cy` is measured from the top.
pub struct Led {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub shape: LedShape,
    pub color: Color,
    /// Canvas height in pixels, used to flip `y`.
    pub height: f64,
}

impl Shape for Led {
    fn draw(&self, painter: &mut Painter) {
        let r = self.radius;
        let (x0, x1) = ((self.cx - r).floor() as i64, (self.cx + r).ceil() as i64);
        let (y0, y1) = ((self.cy - r).floor() as i64, (self.cy + r).ceil() as i64);
        for py in y0..=y1 {
            for px in x0..=x1 {
                let (x, y) = (px as f64, py as f64);
                if !contains(self.shape, x - self.cx, y - self.cy, r) {
                    continue;
                }
                if let Some((gx, gy)) = painter.get_point(x, self.height - 1.0 - y) {
                    painter.paint(gx, gy, self.color);
                }
            }
        }
    }
}
