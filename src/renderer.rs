//! The seam between the background and whatever draws it.
//!
//! [`crate::background::WeatherBackground`] owns the scene state; a
//! [`Renderer`] owns the graphics resources. The wgpu implementation lives in
//! the private `gpu` module; tests use recording doubles.

use glam::Mat4;

use crate::backdrop::SceneBackdrop;
use crate::camera::Viewport;
use crate::error::RenderError;
use crate::field::ParticleField;

/// Everything a renderer needs for one frame.
#[derive(Debug)]
pub struct Frame<'a, F> {
    /// Camera view matrix.
    pub view: Mat4,
    /// Camera projection matrix.
    pub projection: Mat4,
    /// Current background and fog.
    pub backdrop: &'a SceneBackdrop,
    /// The installed field, if any.
    pub field: Option<FrameField<'a, F>>,
}

/// The installed field as seen by [`Renderer::render`].
#[derive(Debug)]
pub struct FrameField<'a, F> {
    /// GPU-side resources created by [`Renderer::create_field`].
    pub resources: &'a F,
    /// CPU-side particle state.
    pub particles: &'a ParticleField,
    /// The field's rotation.
    pub model: Mat4,
}

/// Draws a weather background.
///
/// A renderer is created once and disposed once. Particle field resources
/// are created and released many times in between, one field at a time.
pub trait Renderer {
    /// Graphics resources for one particle field (geometry plus material).
    type Field;

    /// Allocate resources for `field` and upload its initial positions.
    fn create_field(&mut self, field: &ParticleField) -> Self::Field;

    /// Re-upload positions after the field has stepped.
    fn upload_positions(&mut self, resources: &mut Self::Field, field: &ParticleField);

    /// Free a field's resources. Consumes them so they cannot be used again.
    fn release_field(&mut self, resources: Self::Field);

    /// Apply a new backdrop.
    fn set_backdrop(&mut self, backdrop: &SceneBackdrop);

    /// Match the output size to the viewport.
    fn resize(&mut self, viewport: Viewport);

    /// Draw one frame. Must succeed with no field installed.
    fn render(&mut self, frame: &Frame<'_, Self::Field>) -> Result<(), RenderError>;

    /// Free everything. Called exactly once, after all fields are released.
    fn dispose(&mut self);
}
