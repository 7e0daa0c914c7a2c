//! Centipede core engine: backend-agnostic body kinematics, legs, and the
//! surface lifecycle that keeps them sized to their container.

pub mod config;
pub mod error;
pub mod legs;
pub mod math;
pub mod path;
pub mod sketch;
pub mod spline;
pub mod surface;
pub mod trail;
pub mod tuning;

pub use config::{DirectionSource, Mode, SketchConfig, Spawn, PRESETS};
pub use error::{ConfigError, CoreError, CoreResult, SurfaceError};
pub use legs::{LegPhase, LegPose, LegProfile};
pub use path::SplinePath;
pub use sketch::{CentipedeSketch, Kinematics};
pub use spline::BSpline;
pub use surface::{Reseed, SetupStatus, SurfaceLifecycle, SurfaceState};
pub use trail::BodyTrail;
pub use tuning::{Nudge, Tunable};
