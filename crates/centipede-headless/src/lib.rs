//! Headless backend for Centipede: a recording canvas, a scripted container,
//! and a frame driver that plays a session against them.

use centipede_core::{CentipedeSketch, Kinematics, SetupStatus, SketchConfig};
use centipede_platform::{Dimensions, Result};
use glam::Vec2;
use serde::Serialize;
use tracing::{debug, info, warn};

mod canvas;
mod container;

pub use crate::canvas::{DrawCommand, LineVertex, RecordingCanvas};
pub use crate::container::ScriptedContainer;

/// An input applied just before frame `frame` is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scheduled<T> {
    pub frame: u64,
    pub event: T,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub config: SketchConfig,
    pub frames: u64,
    pub size: Dimensions,
    /// Dimension reads that report an empty container before layout settles.
    pub layout_delay: u32,
    pub resizes: Vec<Scheduled<Dimensions>>,
    pub clicks: Vec<Scheduled<Vec2>>,
    pub keys: Vec<Scheduled<char>>,
    /// Honour the retry delay between setup attempts with a real sleep.
    pub sleep_on_retry: bool,
}

impl RunOptions {
    pub fn new(config: SketchConfig, size: Dimensions, frames: u64) -> Self {
        Self {
            config,
            frames,
            size,
            layout_delay: 0,
            resizes: Vec::new(),
            clicks: Vec::new(),
            keys: Vec::new(),
            sleep_on_retry: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub sketch: String,
    pub setup_attempts: u32,
    pub frames_requested: u64,
    pub frames_painted: u64,
    pub reseeds: u64,
    pub final_size: Option<Dimensions>,
    pub head: Option<Vec2>,
    pub trail_len: Option<usize>,
    pub cursor: Option<usize>,
    pub commands_last_frame: usize,
}

impl RunSummary {
    fn capture(
        sketch: &CentipedeSketch,
        canvas: &RecordingCanvas,
        setup_attempts: u32,
        frames: u64,
    ) -> Self {
        let (head, trail_len, cursor) = match sketch.kinematics() {
            Some(Kinematics::Trail(trail)) => {
                (Some(trail.head()), Some(trail.spine().len()), None)
            }
            Some(Kinematics::Spline(path)) => {
                (path.window().last().copied(), None, Some(path.cursor()))
            }
            None => (None, None, None),
        };
        Self {
            sketch: sketch.config().name.clone(),
            setup_attempts,
            frames_requested: frames,
            frames_painted: sketch.frame_count(),
            reseeds: sketch.reseed_count(),
            final_size: canvas.size(),
            head,
            trail_len,
            cursor,
            commands_last_frame: canvas.commands().len(),
        }
    }
}

/// Mount a sketch on a scripted container, drive `options.frames` frames and
/// tear it down. Returns the summary and the canvas holding the last frame.
pub fn run_app(options: &RunOptions) -> Result<(RunSummary, RecordingCanvas)> {
    let mut sketch = CentipedeSketch::new(options.config.clone())?;
    let mut canvas = RecordingCanvas::default();
    let mut container = ScriptedContainer::new(options.size).laid_out_after(options.layout_delay);

    let mut attempts = 0;
    loop {
        attempts += 1;
        match sketch.setup(&mut canvas, &mut container)? {
            SetupStatus::Ready(size) => {
                info!(sketch = %sketch.config().name, %size, attempts, "sketch mounted");
                break;
            }
            SetupStatus::Pending {
                attempt,
                retry_after,
            } => {
                debug!(attempt, ?retry_after, "container not ready");
                if options.sleep_on_retry {
                    std::thread::sleep(retry_after);
                }
            }
            SetupStatus::TornDown => return Err("sketch was torn down during setup".into()),
        }
    }

    for frame in 0..options.frames {
        for resize in options.resizes.iter().filter(|r| r.frame == frame) {
            container.set_dimensions(resize.event);
        }
        for click in options.clicks.iter().filter(|c| c.frame == frame) {
            sketch.pointer_pressed(click.event);
        }
        for key in options.keys.iter().filter(|k| k.frame == frame) {
            if sketch.key_pressed(key.event).is_none() {
                warn!(key = %key.event, "key had no effect");
            }
        }
        sketch.draw(&mut canvas)?;
    }

    let summary = RunSummary::capture(&sketch, &canvas, attempts, options.frames);
    sketch.remove(&mut container);
    info!(
        frames = summary.frames_painted,
        reseeds = summary.reseeds,
        "session finished"
    );
    Ok((summary, canvas))
}
