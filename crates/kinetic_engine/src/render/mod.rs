//! Render data handed to the outside renderer
//!
//! The simulation core never draws anything. Each frame the graphics system
//! collects a [`RenderData`] snapshot per entity and submits the whole frame to
//! a [`RenderSink`].

use serde::{Deserialize, Serialize};

use crate::construct::ShapeDesc;
use crate::entity::EntityHandle;
use crate::foundation::math::{Point2, Pose2};

/// RGBA colour with components in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red
    pub r: f32,
    /// Green
    pub g: f32,
    /// Blue
    pub b: f32,
    /// Alpha
    pub a: f32,
}

impl Color {
    /// Opaque colour
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Colour with alpha
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Pick a colour from the default palette; ids wrap around
    pub fn from_palette(id: usize) -> Self {
        PALETTE[id % PALETTE.len()]
    }
}

impl Default for Color {
    fn default() -> Self {
        PALETTE[0]
    }
}

/// Default entity palette
pub const PALETTE: [Color; 6] = [
    Color::rgb(0.90, 0.90, 0.90),
    Color::rgb(0.86, 0.30, 0.26),
    Color::rgb(0.30, 0.69, 0.31),
    Color::rgb(0.25, 0.47, 0.85),
    Color::rgb(0.95, 0.77, 0.20),
    Color::rgb(0.61, 0.35, 0.71),
];

/// Snapshot of one entity for drawing
#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    /// Owning entity
    pub entity: EntityHandle,
    /// Entity name
    pub name: String,
    /// Fill colour
    pub color: Color,
    /// Every shape with its world pose
    pub shapes: Vec<(ShapeDesc, Pose2)>,
    /// World-space end points of every joint
    pub joints: Vec<(Point2, Point2)>,
}

/// Receiver of finished frames
pub trait RenderSink {
    /// Take one frame of render data; nothing is returned to the core
    fn submit(&mut self, frame: &[RenderData]);
}

/// Sink that keeps the last frame, for headless runs and tests
#[derive(Debug, Default)]
pub struct HeadlessSink {
    last_frame: Vec<RenderData>,
    frames: u64,
}

impl HeadlessSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recently submitted frame
    pub fn last_frame(&self) -> &[RenderData] {
        &self.last_frame
    }

    /// Number of frames submitted
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderSink for HeadlessSink {
    fn submit(&mut self, frame: &[RenderData]) {
        self.last_frame.clear();
        self.last_frame.extend_from_slice(frame);
        self.frames += 1;
    }
}

impl<S: RenderSink + ?Sized> RenderSink for std::rc::Rc<std::cell::RefCell<S>> {
    fn submit(&mut self, frame: &[RenderData]) {
        self.borrow_mut().submit(frame);
    }
}
