//! Direction-smoothing body model: a head steered each frame and the
//! fixed-length trail of positions it leaves behind.

use std::collections::VecDeque;

use glam::Vec2;

use crate::config::{DirectionSource, TrailConfig};
use crate::math::{normalize_or, steer, sway_normal};

#[derive(Debug, Clone)]
pub struct BodyTrail {
    config: TrailConfig,
    /// Most recent position first.
    spine: VecDeque<Vec2>,
    direction: Vec2,
    target: Vec2,
    frame_count: u64,
    bounds: Vec2,
    phase_x: f32,
    phase_y: f32,
}

impl BodyTrail {
    /// Fill the whole trail at the configured spawn point of a `bounds`-sized surface.
    pub fn seeded(config: TrailConfig, bounds: Vec2) -> Self {
        let origin = config.spawn.point(bounds);
        Self::seeded_at(config, bounds, origin)
    }

    pub fn seeded_at(config: TrailConfig, bounds: Vec2, origin: Vec2) -> Self {
        let spine = std::iter::repeat(origin).take(config.num_segments).collect();
        Self {
            config,
            spine,
            direction: Vec2::X,
            target: Vec2::X,
            frame_count: 0,
            bounds,
            phase_x: 0.0,
            phase_y: 0.0,
        }
    }

    pub fn config(&self) -> &TrailConfig {
        &self.config
    }

    pub fn spine(&self) -> &VecDeque<Vec2> {
        &self.spine
    }

    /// The spine as one slice, head first.
    pub fn contiguous_spine(&mut self) -> &[Vec2] {
        self.spine.make_contiguous()
    }

    pub fn head(&self) -> Vec2 {
        self.spine.front().copied().unwrap_or(Vec2::ZERO)
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn target(&self) -> Vec2 {
        self.target
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// True once the trail holds its full complement of positions.
    pub fn is_warm(&self) -> bool {
        self.spine.len() >= self.config.num_segments
    }

    /// Aim at `pointer`. The heading turns toward it over the next frames.
    ///
    /// Ignored by the Lissajous driver and when the pointer sits on the head.
    pub fn point_at(&mut self, pointer: Vec2) {
        if self.config.direction_source != DirectionSource::Pointer {
            return;
        }
        if let Some(target) = (pointer - self.head()).try_normalize() {
            self.target = target;
        }
    }

    pub fn advance(&mut self) {
        match self.config.direction_source {
            DirectionSource::Pointer => {
                self.direction = steer(self.direction, self.target, self.config.steering);
            }
            DirectionSource::Lissajous => self.wander(),
        }

        let angle = self.frame_count as f32 * self.config.frequency;
        let offset = sway_normal(self.direction) * (self.config.amplitude * angle.sin());
        let head = self.head() + self.direction * self.config.speed + offset;

        self.spine.push_front(head);
        self.spine.truncate(self.config.num_segments);
        self.frame_count += 1;
    }

    /// Lissajous drift plus edge reflection.
    fn wander(&mut self) {
        let lissajous = &self.config.lissajous;
        self.phase_x += lissajous.rate_x;
        self.phase_y += lissajous.rate_y;
        let drift = Vec2::new(self.phase_x.sin(), self.phase_y.cos()) * lissajous.wander;
        let mut heading = normalize_or(self.direction + drift, self.direction);

        let head = self.head();
        let margin = lissajous.margin;
        if head.x < margin {
            heading.x = heading.x.abs();
        } else if head.x > self.bounds.x - margin {
            heading.x = -heading.x.abs();
        }
        if head.y < margin {
            heading.y = heading.y.abs();
        } else if head.y > self.bounds.y - margin {
            heading.y = -heading.y.abs();
        }
        self.direction = normalize_or(heading, self.direction);
    }

    /// Change the trail length in place, repeating the tail when growing.
    pub fn set_capacity(&mut self, num_segments: usize) {
        let tail = self.spine.back().copied().unwrap_or_else(|| self.head());
        self.spine.resize(num_segments, tail);
        self.config.num_segments = num_segments;
    }

    pub fn config_mut(&mut self) -> &mut TrailConfig {
        &mut self.config
    }
}
