use crate::camera::Camera;
use crate::error::Result;
use crate::scene::SceneGraph;

/// Something that can draw a scene graph, usually a window surface
pub trait RenderSurface {
    /// Track a new surface size in physical pixels
    fn resize(&mut self, width: u32, height: u32);

    /// Draw the current state of `scene` as seen from `camera`
    fn render(&mut self, scene: &SceneGraph, camera: &Camera) -> Result<()>;
}
