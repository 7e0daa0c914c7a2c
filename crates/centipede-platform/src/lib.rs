//! Platform abstraction traits so `centipede-core` stays backend-agnostic.

use crossbeam_channel::Receiver;
use glam::Vec2;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Size of a hosting container or drawing surface, in pixels.
///
/// Signed because containers that have not been laid out yet report zero or
/// negative extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: i32,
    pub height: i32,
}

impl Dimensions {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub const fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn gray(value: u8) -> Self {
        Self::new(value, value, value, 255)
    }
}

/// Drawing capability the animation core renders into.
///
/// Mirrors the immediate-mode state machine of sketching libraries: color and
/// weight setters affect every primitive issued after them.
pub trait Canvas {
    /// Create the surface at exactly `size`.
    fn create(&mut self, size: Dimensions) -> Result<()>;
    fn resize(&mut self, size: Dimensions) -> Result<()>;
    fn background(&mut self, color: Rgba);
    fn stroke(&mut self, color: Rgba);
    fn stroke_weight(&mut self, weight: f32);
    fn fill(&mut self, color: Rgba);
    fn no_fill(&mut self);
    fn line(&mut self, from: Vec2, to: Vec2);
    fn circle(&mut self, center: Vec2, diameter: f32);
    /// Smooth curve through `points` in order. The first and last points only
    /// guide the end tangents.
    fn curve(&mut self, points: &[Vec2]);
}

/// Token returned by [`ResizeSource::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u64);

/// Container whose dimension changes can be observed.
pub trait ResizeSource {
    fn dimensions(&self) -> Dimensions;
    /// Every dimension change after this call is delivered on the returned
    /// receiver until [`ResizeSource::unsubscribe`] is called with the id.
    fn subscribe(&mut self) -> (SubscriptionId, Receiver<Dimensions>);
    fn unsubscribe(&mut self, id: SubscriptionId);
}
