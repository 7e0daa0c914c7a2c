//! Sketch configuration: one engine, parameterised by direction source,
//! oscillator constants and leg profile. Loadable from TOML.

use std::path::Path;
use std::time::Duration;

use centipede_platform::Rgba;
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::legs::{GaitLegs, JitterLegs, LegProfile};
use crate::spline::DEGREE;

pub const PRESETS: &[&str] = &["wanderer", "lissajous", "crawler"];

/// Upper bound on trail positions and spline body segments.
pub const MAX_SEGMENTS: usize = 100_000;
/// Upper bound on the spline sample buffer.
pub const MAX_PATH_SAMPLES: usize = 1_000_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Head steered frame by frame, body is the trail it leaves.
    #[default]
    Trail,
    /// Body slides along a precomputed B-spline path.
    Spline,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSource {
    #[default]
    Pointer,
    Lissajous,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Spawn {
    #[default]
    BottomLeft,
    Center,
}

impl Spawn {
    pub fn point(self, extent: Vec2) -> Vec2 {
        match self {
            Spawn::BottomLeft => Vec2::new(0.0, extent.y),
            Spawn::Center => extent * 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LissajousConfig {
    pub rate_x: f32,
    pub rate_y: f32,
    pub wander: f32,
    /// Distance from an edge at which heading components start reflecting.
    pub margin: f32,
}

impl Default for LissajousConfig {
    fn default() -> Self {
        Self {
            rate_x: 0.013,
            rate_y: 0.021,
            wander: 0.05,
            margin: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailConfig {
    pub num_segments: usize,
    pub segment_length: f32,
    pub speed: f32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Fraction of the remaining heading error removed each frame.
    pub steering: f32,
    pub leg_offset: usize,
    pub leg_spacing: usize,
    pub spawn: Spawn,
    pub direction_source: DirectionSource,
    pub lissajous: LissajousConfig,
}

impl Default for TrailConfig {
    fn default() -> Self {
        Self {
            num_segments: 3000,
            segment_length: 40.0,
            speed: 0.5,
            amplitude: 0.8,
            frequency: 0.01,
            steering: 0.1,
            leg_offset: 40,
            leg_spacing: 15,
            spawn: Spawn::BottomLeft,
            direction_source: DirectionSource::Pointer,
            lissajous: LissajousConfig::default(),
        }
    }
}

impl TrailConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("trail.num_segments", self.num_segments as f64)?;
        at_most("trail.num_segments", self.num_segments as f64, MAX_SEGMENTS)?;
        positive("trail.segment_length", self.segment_length)?;
        positive("trail.speed", self.speed)?;
        positive("trail.amplitude", self.amplitude)?;
        positive("trail.frequency", self.frequency)?;
        positive("trail.steering", self.steering)?;
        positive("trail.leg_spacing", self.leg_spacing as f64)?;
        if self.leg_offset == 0 {
            return Err(ConfigError::LegOffset);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineConfig {
    /// Body segments riding the path window.
    pub segments: usize,
    pub factor1: f32,
    pub factor2: f32,
    pub segment_length: f32,
    /// Control path in unit coordinates, scaled to the surface on re-seed.
    pub control_points: Vec<Vec2>,
}

impl Default for SplineConfig {
    fn default() -> Self {
        Self {
            segments: 48,
            factor1: 8.0,
            factor2: 1.0,
            segment_length: 14.0,
            control_points: vec![
                Vec2::new(0.10, 0.50),
                Vec2::new(0.25, 0.15),
                Vec2::new(0.50, 0.45),
                Vec2::new(0.75, 0.85),
                Vec2::new(0.90, 0.50),
                Vec2::new(0.75, 0.15),
                Vec2::new(0.50, 0.55),
                Vec2::new(0.25, 0.85),
                Vec2::new(0.10, 0.50),
            ],
        }
    }
}

impl SplineConfig {
    /// Spans sampled along the path; the buffer holds one more point than this.
    pub fn total_points(&self) -> usize {
        (self.factor1 * self.factor2 * self.segments as f32).floor() as usize
    }

    pub fn total_time_steps(&self) -> i64 {
        (self.factor1 * self.segments as f32).floor() as i64 - self.segments as i64 - 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spline.segments", self.segments as f64)?;
        positive("spline.factor1", self.factor1)?;
        positive("spline.factor2", self.factor2)?;
        positive("spline.segment_length", self.segment_length)?;
        at_most("spline.segments", self.segments as f64, MAX_SEGMENTS)?;
        // Checked before `total_points` casts the product to usize.
        let span = f64::from(self.factor1) * f64::from(self.factor2) * self.segments as f64;
        at_most("spline sample count", span, MAX_PATH_SAMPLES)?;
        at_most(
            "spline time steps",
            f64::from(self.factor1) * self.segments as f64,
            MAX_PATH_SAMPLES,
        )?;
        if self.control_points.len() < DEGREE + 1 {
            return Err(ConfigError::TooFewControlPoints {
                required: DEGREE + 1,
                got: self.control_points.len(),
            });
        }
        let steps = self.total_time_steps();
        if steps <= 0 {
            return Err(ConfigError::DegenerateTimeWindow {
                factor1: self.factor1,
                segments: self.segments,
                steps,
                min_factor1: (self.segments as f32 + 2.0) / self.segments as f32,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    pub background: Rgba,
    pub body: Rgba,
    pub body_weight: f32,
    pub leg: Rgba,
    pub leg_weight: f32,
    pub joint: Rgba,
    pub joint_diameter: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Rgba::gray(0),
            body: Rgba::gray(255),
            body_weight: 2.0,
            leg: Rgba::gray(200),
            leg_weight: 1.0,
            joint: Rgba::gray(255),
            joint_diameter: 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub retry_delay_ms: u64,
    pub max_attempts: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            retry_delay_ms: 50,
            max_attempts: 200,
        }
    }
}

impl SurfaceConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    pub name: String,
    pub mode: Mode,
    pub trail: TrailConfig,
    pub spline: SplineConfig,
    pub legs: LegProfile,
    pub style: Style,
    pub surface: SurfaceConfig,
}

impl Default for SketchConfig {
    fn default() -> Self {
        Self {
            name: "wanderer".into(),
            mode: Mode::Trail,
            trail: TrailConfig::default(),
            spline: SplineConfig::default(),
            legs: LegProfile::default(),
            style: Style::default(),
            surface: SurfaceConfig::default(),
        }
    }
}

impl SketchConfig {
    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "wanderer" => Ok(Self::default()),
            "lissajous" => Ok(Self {
                name: "lissajous".into(),
                trail: TrailConfig {
                    num_segments: 1200,
                    speed: 1.5,
                    amplitude: 0.3,
                    frequency: 0.05,
                    leg_offset: 15,
                    leg_spacing: 12,
                    spawn: Spawn::Center,
                    direction_source: DirectionSource::Lissajous,
                    ..TrailConfig::default()
                },
                legs: LegProfile::Jitter(JitterLegs {
                    tip_rate_x: 0.0005,
                    tip_rate_y: 0.0005,
                    ..JitterLegs::default()
                }),
                ..Self::default()
            }),
            "crawler" => Ok(Self {
                name: "crawler".into(),
                mode: Mode::Spline,
                legs: LegProfile::Gait(GaitLegs::default()),
                ..Self::default()
            }),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Parse a TOML document. Missing fields keep their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.mode {
            Mode::Trail => self.trail.validate()?,
            Mode::Spline => self.spline.validate()?,
        }
        positive("surface.max_attempts", self.surface.max_attempts as f64)?;
        Ok(())
    }

    /// Segment length feeding leg articulation in the active mode.
    pub fn segment_length(&self) -> f32 {
        match self.mode {
            Mode::Trail => self.trail.segment_length,
            Mode::Spline => self.spline.segment_length,
        }
    }
}

fn positive(name: &'static str, value: impl Into<f64>) -> Result<(), ConfigError> {
    let value = value.into();
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::non_positive(name, value))
    }
}

fn at_most(name: &'static str, value: f64, max: usize) -> Result<(), ConfigError> {
    if value <= max as f64 {
        Ok(())
    } else {
        Err(ConfigError::TooLarge { name, value, max })
    }
}
