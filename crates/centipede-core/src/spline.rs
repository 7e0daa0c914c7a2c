//! Cubic B-spline evaluation with De Boor's algorithm.

use glam::Vec2;

use crate::error::ConfigError;

pub const DEGREE: usize = 3;

/// A cubic B-spline over a clamped uniform knot vector.
///
/// The knot vector is `[0; DEGREE+1] ++ 1..(n-DEGREE) ++ [n-DEGREE; DEGREE+1]`, so
/// the curve starts on the first control point and ends on the last.
#[derive(Debug, Clone)]
pub struct BSpline {
    points: Vec<Vec2>,
    knots: Vec<f32>,
}

impl BSpline {
    pub fn cubic(points: Vec<Vec2>) -> Result<Self, ConfigError> {
        if points.len() < DEGREE + 1 {
            return Err(ConfigError::TooFewControlPoints {
                required: DEGREE + 1,
                got: points.len(),
            });
        }
        let knots = clamped_uniform_knots(points.len(), DEGREE);
        Ok(Self { points, knots })
    }

    pub fn control_points(&self) -> &[Vec2] {
        &self.points
    }

    pub fn knots(&self) -> &[f32] {
        &self.knots
    }

    /// Point on the curve at `t`.
    ///
    /// `t` must lie in `[0, 1]`; values outside are not checked and give an
    /// extrapolated, unspecified point.
    pub fn evaluate(&self, t: f32) -> Vec2 {
        let n = self.points.len();
        let p = DEGREE;
        let x = t * self.knots[n];

        let span = find_span(&self.knots, n, p, x);
        let mut d = [Vec2::ZERO; DEGREE + 1];
        for (j, slot) in d.iter_mut().enumerate() {
            *slot = self.points[span - p + j];
        }
        de_boor(&mut d, span, p, x, &self.knots);
        d[p]
    }

    /// `count + 1` points at uniformly spaced `t`, both ends included.
    pub fn sample(&self, count: usize) -> Vec<Vec2> {
        if count == 0 {
            return vec![self.evaluate(0.0)];
        }
        (0..=count)
            .map(|i| self.evaluate(i as f32 / count as f32))
            .collect()
    }
}

fn clamped_uniform_knots(n: usize, p: usize) -> Vec<f32> {
    let interior = n - p;
    let mut knots = Vec::with_capacity(n + p + 1);
    knots.extend(std::iter::repeat(0.0).take(p + 1));
    knots.extend((1..interior).map(|k| k as f32));
    knots.extend(std::iter::repeat(interior as f32).take(p + 1));
    knots
}

/// Index `k` with `knots[k] <= x < knots[k + 1]`, scanning the valid spans
/// `p..n`. Anything past the last span (including the right end) clamps to it.
fn find_span(knots: &[f32], n: usize, p: usize, x: f32) -> usize {
    (p..n)
        .find(|&k| x >= knots[k] && x < knots[k + 1])
        .unwrap_or(if x < knots[p] { p } else { n - 1 })
}

fn de_boor(d: &mut [Vec2], span: usize, p: usize, x: f32, knots: &[f32]) {
    for r in 1..=p {
        for j in (r..=p).rev() {
            let i = span - p + j;
            let denom = knots[i + p + 1 - r] - knots[i];
            let alpha = if denom == 0.0 { 0.0 } else { (x - knots[i]) / denom };
            d[j] = d[j - 1].lerp(d[j], alpha);
        }
    }
}
