//! Perspective camera and viewport for a full-window background.

use glam::{Mat4, Vec3};

/// Size of the drawing surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width.
    pub width: f32,
    /// Logical height.
    pub height: f32,
    /// Physical pixels per logical pixel.
    pub scale_factor: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32, scale_factor: f32) -> Self {
        Self {
            width,
            height,
            scale_factor,
        }
    }

    /// Build from a physical size and the display's pixel density.
    pub fn from_physical(width: u32, height: u32, scale_factor: f64) -> Self {
        let scale = if scale_factor > 0.0 { scale_factor as f32 } else { 1.0 };
        Self::new(width as f32 / scale, height as f32 / scale, scale)
    }

    /// Width over height. A collapsed viewport reports `1.0`.
    pub fn aspect(&self) -> f32 {
        if self.width <= 0.0 || self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }

    /// Output size in physical pixels, never smaller than 1x1.
    pub fn physical_size(&self) -> (u32, u32) {
        let w = (self.width * self.scale_factor).round().max(1.0) as u32;
        let h = (self.height * self.scale_factor).round().max(1.0) as u32;
        (w, h)
    }

    /// Whether either side is zero, as on a minimised window.
    pub fn is_collapsed(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0, 1.0)
    }
}

/// Fixed perspective camera looking down -Z at the particle volume.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    /// Vertical field of view in degrees.
    pub fov_y_degrees: f32,
    /// Width over height.
    pub aspect: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Eye position.
    pub position: Vec3,
}

impl PerspectiveCamera {
    pub const FOV_Y_DEGREES: f32 = 75.0;
    pub const NEAR: f32 = 0.1;
    pub const FAR: f32 = 1000.0;
    pub const EYE_DISTANCE: f32 = 5.0;

    /// Camera sized for `aspect`, five units back from the origin.
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_y_degrees: Self::FOV_Y_DEGREES,
            aspect,
            near: Self::NEAR,
            far: Self::FAR,
            position: Vec3::new(0.0, 0.0, Self::EYE_DISTANCE),
        }
    }

    /// Update the aspect ratio after a resize.
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position - Vec3::Z, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(Viewport::default().aspect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect() {
        assert_eq!(Viewport::new(1600.0, 800.0, 1.0).aspect(), 2.0);
        assert_eq!(Viewport::new(800.0, 0.0, 1.0).aspect(), 1.0);
    }

    #[test]
    fn test_physical_size_uses_scale() {
        let vp = Viewport::new(640.0, 480.0, 2.0);
        assert_eq!(vp.physical_size(), (1280, 960));
        assert_eq!(Viewport::new(0.0, 0.0, 1.0).physical_size(), (1, 1));
    }

    #[test]
    fn test_from_physical() {
        let vp = Viewport::from_physical(2560, 1440, 2.0);
        assert_eq!(vp.width, 1280.0);
        assert_eq!(vp.height, 720.0);
        assert_eq!(vp.physical_size(), (2560, 1440));
    }

    #[test]
    fn test_camera_defaults() {
        let cam = PerspectiveCamera::new(1.5);
        assert_eq!(cam.fov_y_degrees, 75.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 1000.0);
        assert_eq!(cam.position, Vec3::new(0.0, 0.0, 5.0));
    }

    #[test]
    fn test_origin_projects_to_center() {
        let cam = PerspectiveCamera::new(16.0 / 9.0);
        let clip = cam.view_proj() * glam::Vec4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&ndc.z));
    }

    #[test]
    fn test_set_aspect_changes_projection() {
        let mut cam = PerspectiveCamera::new(1.0);
        let before = cam.projection_matrix();
        cam.set_aspect(2.0);
        assert_ne!(before, cam.projection_matrix());
    }
}
