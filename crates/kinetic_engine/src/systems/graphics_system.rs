//! Graphics system: hands every entity's render data to the sink

use crate::error::{Result, SessionError};
use crate::render::{RenderData, RenderSink};
use crate::scene::Scene;

/// Collects render data and submits one frame per update
pub struct GraphicsSystem {
    sink: Box<dyn RenderSink>,
    frame: Vec<RenderData>,
}

impl GraphicsSystem {
    /// Graphics system submitting to `sink`
    pub fn new(sink: Box<dyn RenderSink>) -> Self {
        Self {
            sink,
            frame: Vec::new(),
        }
    }

    /// Read every entity's pose and submit; never mutates the scene
    pub fn update(&mut self, scene: &Scene, _dt: f32) -> Result<()> {
        self.frame.clear();
        for (handle, entity) in scene.entities() {
            let data = entity
                .render_data(handle, scene.world())
                .map_err(|source| SessionError::MissingBody { entity: handle, source })?;
            self.frame.push(data);
        }

        self.sink.submit(&self.frame);
        Ok(())
    }
}
