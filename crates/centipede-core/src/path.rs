//! Spline-path kinematics: the body rides a sliding window over samples of a
//! cubic B-spline laid across the surface.

use glam::Vec2;
use tracing::debug;

use crate::config::SplineConfig;
use crate::error::ConfigError;
use crate::legs::{envelope, GaitLegs, LegPhase};
use crate::math::normalize_or;
use crate::spline::BSpline;

/// One body segment's placement for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSegment {
    pub index: usize,
    pub center: Vec2,
    pub heading: Vec2,
    /// Leg size envelope at this segment.
    pub lambda: f32,
}

#[derive(Debug, Clone)]
pub struct SplinePath {
    config: SplineConfig,
    samples: Vec<Vec2>,
    total_time_steps: usize,
    cursor: usize,
}

impl SplinePath {
    /// Scale the control path to `bounds` and sample it densely.
    ///
    /// Fails if the configured window leaves no time steps to walk.
    pub fn seeded(config: SplineConfig, bounds: Vec2) -> Result<Self, ConfigError> {
        config.validate()?;
        let steps = config.total_time_steps() as usize;
        let control = config.control_points.iter().map(|p| *p * bounds).collect();
        let samples = BSpline::cubic(control)?.sample(config.total_points());
        debug!(
            samples = samples.len(),
            time_steps = steps,
            "sampled spline path for {}x{}",
            bounds.x,
            bounds.y
        );
        Ok(Self {
            config,
            samples,
            total_time_steps: steps,
            cursor: 0,
        })
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    pub fn samples(&self) -> &[Vec2] {
        &self.samples
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total_time_steps(&self) -> usize {
        self.total_time_steps
    }

    pub fn advance(&mut self) {
        self.cursor = (self.cursor + 1) % self.total_time_steps;
    }

    /// Samples under the body this frame, head last. Truncated at the end of
    /// the buffer.
    pub fn window(&self) -> &[Vec2] {
        let start = self.cursor.min(self.samples.len());
        let end = (self.cursor + self.config.segments).min(self.samples.len());
        &self.samples[start..end]
    }

    /// Segments `1..segments-2` with their center, heading and envelope.
    /// Segments whose samples fall past the buffer are skipped.
    pub fn segments(&self) -> impl Iterator<Item = PathSegment> + '_ {
        let segments = self.config.segments;
        (1..segments.saturating_sub(2)).filter_map(move |index| {
            let center = *self.samples.get(self.cursor + index)?;
            let next = *self.samples.get(self.cursor + index + 1)?;
            Some(PathSegment {
                index,
                center,
                heading: normalize_or(next - center, Vec2::X),
                lambda: envelope(index, segments),
            })
        })
    }

    pub fn leg_phase(&self, gait: &GaitLegs, segment: &PathSegment) -> LegPhase {
        LegPhase::gait(
            segment.index,
            segment.lambda,
            gait.angles(self.cursor, segment.index),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: Vec2 = Vec2::new(800.0, 600.0);

    #[test]
    fn buffer_holds_one_sample_per_span_plus_one() {
        let config = SplineConfig::default();
        let expected = config.total_points() + 1;
        let path = SplinePath::seeded(config, BOUNDS).unwrap();
        assert_eq!(path.samples().len(), expected);
        assert_eq!(path.total_time_steps(), 8 * 48 - 48 - 1);
    }

    #[test]
    fn path_is_scaled_to_surface() {
        let config = SplineConfig::default();
        let first = config.control_points[0] * BOUNDS;
        let path = SplinePath::seeded(config, BOUNDS).unwrap();
        assert!(path.samples()[0].abs_diff_eq(first, 1e-3));
        for sample in path.samples() {
            assert!(sample.x >= 0.0 && sample.x <= BOUNDS.x);
            assert!(sample.y >= 0.0 && sample.y <= BOUNDS.y);
        }
    }

    #[test]
    fn cursor_wraps_at_time_steps() {
        let mut path = SplinePath::seeded(SplineConfig::default(), BOUNDS).unwrap();
        let steps = path.total_time_steps();
        for _ in 0..steps - 1 {
            path.advance();
        }
        assert_eq!(path.cursor(), steps - 1);
        path.advance();
        assert_eq!(path.cursor(), 0);
    }

    #[test]
    fn full_window_every_frame_with_default_config() {
        let mut path = SplinePath::seeded(SplineConfig::default(), BOUNDS).unwrap();
        for _ in 0..path.total_time_steps() {
            assert_eq!(path.segments().count(), 48 - 3);
            assert_eq!(path.window().len(), 48);
            path.advance();
        }
    }

    #[test]
    fn out_of_range_segments_are_skipped() {
        let config = SplineConfig {
            factor2: 0.5,
            ..SplineConfig::default()
        };
        let mut path = SplinePath::seeded(config, BOUNDS).unwrap();
        let available = path.samples().len();
        while path.cursor() + 40 <= available {
            path.advance();
        }
        let visible: Vec<_> = path.segments().collect();
        assert!(visible.len() < 45);
        assert!(visible
            .iter()
            .all(|s| path.cursor() + s.index + 1 < available));
    }

    #[test]
    fn degenerate_window_fails_fast() {
        let config = SplineConfig {
            factor1: 1.02,
            ..SplineConfig::default()
        };
        assert!(matches!(
            SplinePath::seeded(config, BOUNDS),
            Err(ConfigError::DegenerateTimeWindow { .. })
        ));
    }

    #[test]
    fn envelope_shrinks_end_segments() {
        let path = SplinePath::seeded(SplineConfig::default(), BOUNDS).unwrap();
        let segments: Vec<_> = path.segments().collect();
        let first = segments.first().unwrap();
        let middle = segments.iter().find(|s| s.index == 24).unwrap();
        assert!(first.lambda < middle.lambda);
        assert!(segments.iter().all(|s| (s.heading.length() - 1.0).abs() < 1e-4));
    }
}
