//! One mounted centipede: the callbacks a frame driver invokes.

use centipede_platform::{Canvas, Dimensions, ResizeSource};
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::config::{Mode, SketchConfig, Style};
use crate::error::{ConfigError, CoreResult};
use crate::legs::{envelope, leg_pose, LegPhase, LegPose, LegProfile};
use crate::path::SplinePath;
use crate::surface::{Reseed, SetupStatus, SurfaceLifecycle, SurfaceState};
use crate::trail::BodyTrail;
use crate::tuning::{binding, Tunable};

#[derive(Debug, Clone)]
pub enum Kinematics {
    Trail(BodyTrail),
    Spline(SplinePath),
}

impl Kinematics {
    pub fn seeded(config: &SketchConfig, size: Dimensions) -> Result<Self, ConfigError> {
        let bounds = size.extent();
        Ok(match config.mode {
            Mode::Trail => Kinematics::Trail(BodyTrail::seeded(config.trail.clone(), bounds)),
            Mode::Spline => Kinematics::Spline(SplinePath::seeded(config.spline.clone(), bounds)?),
        })
    }
}

#[derive(Debug)]
struct Animation {
    config: SketchConfig,
    kinematics: Option<Kinematics>,
    reseeds: u64,
}

impl Reseed for Animation {
    fn reseed(&mut self, size: Dimensions) -> Result<(), ConfigError> {
        self.kinematics = Some(Kinematics::seeded(&self.config, size)?);
        self.reseeds += 1;
        info!(sketch = %self.config.name, %size, reseeds = self.reseeds, "animation re-seeded");
        Ok(())
    }
}

pub struct CentipedeSketch {
    animation: Animation,
    surface: SurfaceLifecycle,
    frame_count: u64,
}

impl CentipedeSketch {
    pub fn new(config: SketchConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let surface = SurfaceLifecycle::new(config.surface.clone());
        Ok(Self {
            animation: Animation {
                config,
                kinematics: None,
                reseeds: 0,
            },
            surface,
            frame_count: 0,
        })
    }

    pub fn config(&self) -> &SketchConfig {
        &self.animation.config
    }

    pub fn kinematics(&self) -> Option<&Kinematics> {
        self.animation.kinematics.as_ref()
    }

    pub fn surface_state(&self) -> SurfaceState {
        self.surface.state()
    }

    pub fn reseed_count(&self) -> u64 {
        self.animation.reseeds
    }

    /// Frames actually painted; blank frames before seeding do not count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Size the surface to `container` and start following its resizes.
    ///
    /// Returns [`SetupStatus::Pending`] while the container has no layout;
    /// the driver calls again after the suggested delay.
    pub fn setup<C, S>(&mut self, canvas: &mut C, container: &mut S) -> CoreResult<SetupStatus>
    where
        C: Canvas + ?Sized,
        S: ResizeSource + ?Sized,
    {
        let status = self
            .surface
            .initialize(container.dimensions(), canvas, &mut self.animation)?;
        if status != SetupStatus::TornDown {
            self.surface.observe(container);
        }
        Ok(status)
    }

    /// Apply pending resizes, advance one step and paint. A no-op until the
    /// first re-seed; from then on every call paints a full body.
    pub fn draw<C: Canvas + ?Sized>(&mut self, canvas: &mut C) -> CoreResult<()> {
        self.surface.pump(canvas, &mut self.animation)?;

        let Animation {
            config, kinematics, ..
        } = &mut self.animation;
        let Some(kinematics) = kinematics.as_mut() else {
            return Ok(());
        };

        match kinematics {
            Kinematics::Trail(trail) => {
                // Seeding pre-fills the spine and `set_capacity` keeps it full.
                debug_assert!(trail.is_warm());
                self.frame_count += 1;
                canvas.background(config.style.background);
                trail.advance();
                draw_trail(canvas, config, trail, self.frame_count);
            }
            Kinematics::Spline(path) => {
                self.frame_count += 1;
                canvas.background(config.style.background);
                path.advance();
                draw_path(canvas, config, path, self.frame_count);
            }
        }
        Ok(())
    }

    pub fn pointer_pressed(&mut self, position: Vec2) {
        if let Some(Kinematics::Trail(trail)) = self.animation.kinematics.as_mut() {
            trail.point_at(position);
            debug!(x = position.x, y = position.y, "pointer target set");
        }
    }

    /// Nudge a tunable bound to `key`. Returns what changed, if anything.
    pub fn key_pressed(&mut self, key: char) -> Option<Tunable> {
        let (tunable, nudge) = binding(key)?;
        let config = &mut self.animation.config;

        match config.mode {
            Mode::Trail => {
                if !config.trail.nudge(tunable, nudge) {
                    debug!(?tunable, ?nudge, "already at its bound");
                    return None;
                }
                let tuned = config.trail.clone();
                if let Some(Kinematics::Trail(trail)) = self.animation.kinematics.as_mut() {
                    trail.set_capacity(tuned.num_segments);
                    *trail.config_mut() = tuned;
                }
            }
            Mode::Spline => {
                let previous = config.spline.clone();
                if !config.spline.nudge(tunable, nudge) {
                    debug!(?tunable, ?nudge, "not tunable on a spline path or at its bound");
                    return None;
                }
                let reseeded = match self.surface.size() {
                    Some(size) => self.animation.reseed(size),
                    None => self.animation.config.spline.validate(),
                };
                // A failed re-seed leaves the running path untouched.
                if let Err(err) = reseeded {
                    warn!(?tunable, ?nudge, %err, "rejected tuning, keeping previous path");
                    self.animation.config.spline = previous;
                    return None;
                }
            }
        }
        info!(?tunable, ?nudge, "tuned");
        Some(tunable)
    }

    /// Tear down: stop following resizes and drop all animation state.
    pub fn remove<S: ResizeSource + ?Sized>(&mut self, container: &mut S) {
        self.surface.teardown(container);
        if self.animation.kinematics.take().is_some() {
            info!(sketch = %self.animation.config.name, "sketch removed");
        }
    }
}

fn leg_phase(
    legs: &LegProfile,
    time: u64,
    step: usize,
    index: usize,
    body_len: usize,
) -> LegPhase {
    match legs {
        LegProfile::Jitter(_) => LegPhase::at_time(time as f32, index),
        LegProfile::Gait(gait) => {
            LegPhase::gait(index, envelope(index, body_len), gait.angles(step, index))
        }
    }
}

fn draw_trail<C: Canvas + ?Sized>(
    canvas: &mut C,
    config: &SketchConfig,
    trail: &mut BodyTrail,
    time: u64,
) {
    let (offset, spacing) = (config.trail.leg_offset, config.trail.leg_spacing);
    let segment_length = config.trail.segment_length;
    let spine = trail.contiguous_spine();

    draw_body(canvas, &config.style, spine);
    for index in (offset..spine.len()).step_by(spacing) {
        let phase = leg_phase(&config.legs, time, time as usize, index, spine.len());
        let legs = leg_pose(
            &config.legs,
            spine[index],
            spine[index - 1],
            segment_length,
            &phase,
        );
        draw_legs(canvas, &config.style, spine[index], &legs);
    }
}

fn draw_path<C: Canvas + ?Sized>(
    canvas: &mut C,
    config: &SketchConfig,
    path: &SplinePath,
    time: u64,
) {
    let segments = path.config().segments;
    let segment_length = path.config().segment_length;

    draw_body(canvas, &config.style, path.window());
    for segment in path.segments() {
        let phase = match &config.legs {
            LegProfile::Gait(gait) => path.leg_phase(gait, &segment),
            jitter => leg_phase(jitter, time, path.cursor(), segment.index, segments),
        };
        let legs = config
            .legs
            .articulate(segment.center, segment.heading, segment_length, &phase);
        draw_legs(canvas, &config.style, segment.center, &legs);
    }
}

fn draw_body<C: Canvas + ?Sized>(canvas: &mut C, style: &Style, points: &[Vec2]) {
    canvas.stroke(style.body);
    canvas.stroke_weight(style.body_weight);
    canvas.no_fill();
    canvas.curve(points);
}

fn draw_legs<C: Canvas + ?Sized>(canvas: &mut C, style: &Style, anchor: Vec2, legs: &[LegPose; 2]) {
    canvas.stroke(style.leg);
    canvas.stroke_weight(style.leg_weight);
    for leg in legs {
        canvas.line(anchor, leg.root);
        canvas.line(leg.root, leg.joint);
        canvas.line(leg.joint, leg.tip);

        canvas.fill(style.joint);
        canvas.circle(leg.root, style.joint_diameter);
        canvas.circle(leg.joint, style.joint_diameter);
        canvas.circle(leg.tip, style.joint_diameter);
    }
}
