//! Vector helpers on top of [`glam::Vec2`]. Add, subtract, scale and magnitude
//! come straight from glam's operators and `length`.

use glam::Vec2;

/// Unit vector along `v`, or `fallback` when `v` has no usable direction.
#[inline]
pub fn normalize_or(v: Vec2, fallback: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(fallback)
}

/// Move a unit `heading` a fraction `factor` toward `target` and renormalize.
///
/// Repeated calls converge exponentially on `target`.
#[inline]
pub fn steer(heading: Vec2, target: Vec2, factor: f32) -> Vec2 {
    normalize_or(heading.lerp(target, factor), heading)
}

/// Rotate `v` counter-clockwise by `radians`.
#[inline]
pub fn rotate(v: Vec2, radians: f32) -> Vec2 {
    Vec2::from_angle(radians).rotate(v)
}

/// Right-hand normal used for the side-to-side gait: `(y, -x)`.
#[inline]
pub fn sway_normal(heading: Vec2) -> Vec2 {
    -heading.perp()
}

#[cfg(test)]
pub(crate) fn assert_close(a: Vec2, b: Vec2, eps: f32) {
    assert!(
        a.abs_diff_eq(b, eps),
        "expected {b:?}, got {a:?} (tolerance {eps})"
    );
}
