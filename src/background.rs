//! The animated weather background component.
//!
//! [`WeatherBackground`] ties the pieces together: it owns a [`Renderer`],
//! the camera, the frame loop, the single live [`ParticleField`] and the
//! current [`SceneBackdrop`].
//!
//! # Lifecycle
//!
//! - [`mount`](WeatherBackground::mount) sizes the renderer, starts the frame
//!   loop and installs the field and backdrop for the initial condition.
//! - [`set_condition`](WeatherBackground::set_condition) releases the old
//!   field, builds and installs a new one, then swaps the backdrop.
//! - [`frame`](WeatherBackground::frame) steps the field and draws.
//! - [`unmount`](WeatherBackground::unmount) cancels the frame loop, releases
//!   the field and disposes the renderer. It runs at most once, and also on
//!   drop.
//!
//! Every method is safe to call after unmount; they do nothing.

use log::{debug, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::backdrop::SceneBackdrop;
use crate::camera::{PerspectiveCamera, Viewport};
use crate::condition::WeatherCondition;
use crate::field::ParticleField;
use crate::frame_loop::{CancelToken, FrameLoop};
use crate::renderer::{Frame, FrameField, Renderer};

/// What happened to one call of [`WeatherBackground::frame`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// The field stepped and the frame was drawn.
    Rendered,
    /// The renderer reported an error; it was logged and the frame dropped.
    Failed,
    /// The background is unmounted; nothing was touched.
    Cancelled,
}

/// A particle field together with its graphics resources.
struct InstalledField<F> {
    particles: ParticleField,
    resources: F,
}

/// Full-window particle background reacting to a weather condition.
pub struct WeatherBackground<R: Renderer> {
    /// `None` once unmounted.
    renderer: Option<R>,
    camera: PerspectiveCamera,
    viewport: Viewport,
    frames: FrameLoop,
    condition: WeatherCondition,
    field: Option<InstalledField<R::Field>>,
    backdrop: SceneBackdrop,
    rng: SmallRng,
}

impl<R: Renderer> WeatherBackground<R> {
    /// Mount onto `renderer` showing `condition`.
    pub fn mount(renderer: R, viewport: Viewport, condition: WeatherCondition) -> Self {
        Self::mount_with_rng(renderer, viewport, condition, SmallRng::from_entropy())
    }

    /// Like [`mount`](Self::mount) but with reproducible particle placement.
    pub fn mount_seeded(
        renderer: R,
        viewport: Viewport,
        condition: WeatherCondition,
        seed: u64,
    ) -> Self {
        Self::mount_with_rng(renderer, viewport, condition, SmallRng::seed_from_u64(seed))
    }

    fn mount_with_rng(
        mut renderer: R,
        viewport: Viewport,
        condition: WeatherCondition,
        rng: SmallRng,
    ) -> Self {
        renderer.resize(viewport);

        let mut background = Self {
            renderer: Some(renderer),
            camera: PerspectiveCamera::new(viewport.aspect()),
            viewport,
            frames: FrameLoop::new(),
            condition,
            field: None,
            backdrop: SceneBackdrop::for_condition(condition),
            rng,
        };
        background.set_weather(condition);

        info!(
            "Weather background mounted at {}x{} (scale {}) showing {}",
            viewport.width, viewport.height, viewport.scale_factor, condition
        );
        background
    }

    /// Switch to the condition named by `label`. Unknown labels use the fallback.
    pub fn set_condition(&mut self, label: &str) {
        self.set_weather(WeatherCondition::parse(label));
    }

    /// Replace the particle field and backdrop for `condition`.
    ///
    /// The old field is released before the new one is built, so there is
    /// never more than one field's resources alive. Calling this with the
    /// current condition rebuilds an equivalent, freshly randomised field.
    pub fn set_weather(&mut self, condition: WeatherCondition) {
        let Some(renderer) = self.renderer.as_mut() else {
            debug!("Ignoring condition change to {} after unmount", condition);
            return;
        };

        if let Some(old) = self.field.take() {
            renderer.release_field(old.resources);
        }

        let mut particles = ParticleField::build_with_rng(condition, &mut self.rng);
        let resources = renderer.create_field(&particles);
        // create_field uploads the initial positions
        particles.take_upload();
        debug!("Installed {} field with {} particles", condition, particles.len());
        self.field = Some(InstalledField {
            particles,
            resources,
        });

        self.backdrop = SceneBackdrop::for_condition(condition);
        renderer.set_backdrop(&self.backdrop);
        self.condition = condition;
    }

    /// Follow a viewport size change.
    pub fn resize(&mut self, viewport: Viewport) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };
        if viewport.is_collapsed() {
            debug!("Skipping resize to collapsed viewport");
            return;
        }
        self.viewport = viewport;
        self.camera.set_aspect(viewport.aspect());
        renderer.resize(viewport);
        debug!("Resized to {}x{}", viewport.width, viewport.height);
    }

    /// Run one frame: step the field, upload it and draw.
    ///
    /// Never panics on render failure; the error is logged and the next
    /// frame tries again.
    pub fn frame(&mut self) -> FrameOutcome {
        if !self.frames.begin_frame() {
            return FrameOutcome::Cancelled;
        }
        let Some(renderer) = self.renderer.as_mut() else {
            return FrameOutcome::Cancelled;
        };

        if let Some(installed) = self.field.as_mut() {
            installed.particles.step();
            if installed.particles.take_upload() {
                renderer.upload_positions(&mut installed.resources, &installed.particles);
            }
        }

        let frame = Frame {
            view: self.camera.view_matrix(),
            projection: self.camera.projection_matrix(),
            backdrop: &self.backdrop,
            field: self.field.as_ref().map(|installed| FrameField {
                resources: &installed.resources,
                particles: &installed.particles,
                model: installed.particles.model_matrix(),
            }),
        };

        match renderer.render(&frame) {
            Ok(()) => FrameOutcome::Rendered,
            Err(e) => {
                warn!("Background frame dropped: {}", e);
                FrameOutcome::Failed
            }
        }
    }

    /// Whether another frame should be queued. `false` once unmounted.
    pub fn schedule_next(&mut self) -> bool {
        self.renderer.is_some() && self.frames.schedule_next()
    }

    /// Tear everything down. Later calls do nothing.
    pub fn unmount(&mut self) {
        let Some(mut renderer) = self.renderer.take() else {
            return;
        };
        self.frames.cancel();

        if let Some(installed) = self.field.take() {
            renderer.release_field(installed.resources);
        }
        renderer.dispose();

        info!(
            "Weather background unmounted after {} frames",
            self.frames.frames_run()
        );
    }

    #[inline]
    pub fn is_mounted(&self) -> bool {
        self.renderer.is_some()
    }

    /// The most recently applied condition.
    #[inline]
    pub fn condition(&self) -> WeatherCondition {
        self.condition
    }

    /// The live particle field, if mounted.
    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref().map(|installed| &installed.particles)
    }

    #[inline]
    pub fn backdrop(&self) -> &SceneBackdrop {
        &self.backdrop
    }

    #[inline]
    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    #[inline]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[inline]
    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frames
    }

    /// Cancellation handle for whoever queues frames.
    pub fn cancel_token(&self) -> CancelToken {
        self.frames.token()
    }

    /// The renderer, until unmount.
    pub fn renderer(&self) -> Option<&R> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut R> {
        self.renderer.as_mut()
    }
}

impl<R: Renderer> Drop for WeatherBackground<R> {
    fn drop(&mut self) {
        self.unmount();
    }
}
