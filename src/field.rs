//! Particle fields: the falling, drifting points behind the page.
//!
//! A [`ParticleField`] is the CPU half of what gets drawn: positions, one
//! downward velocity per particle, the field's Y rotation and its material.
//! The GPU half lives in the renderer (see [`crate::renderer::Renderer`]) and
//! is re-uploaded whenever [`ParticleField::take_upload`] reports a change.
//!
//! # Motion
//!
//! Every frame each particle moves down by its own speed. A particle that
//! drops below [`FIELD_BOTTOM`] reappears at [`FIELD_TOP`], so the field
//! loops forever without gaps. The whole field also turns slowly around the
//! vertical axis.
//!
//! ```ignore
//! let mut field = ParticleField::build(WeatherCondition::Snow);
//! assert_eq!(field.len(), 1500);
//! field.step();
//! ```

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::condition::WeatherCondition;
use crate::profile::ParticleFieldConfig;
use crate::visuals::Material;

/// Particles above this height never spawn; wrapped particles restart here.
pub const FIELD_TOP: f32 = 10.0;
/// Particles falling below this height wrap to [`FIELD_TOP`].
pub const FIELD_BOTTOM: f32 = -10.0;
/// Y rotation added to the field every frame, in radians.
pub const ROTATION_STEP: f32 = 0.001;
/// Smallest fall speed any particle can have.
pub const MIN_FALL_SPEED: f32 = 0.01;

/// A live particle field for one weather condition.
#[derive(Debug, Clone)]
pub struct ParticleField {
    condition: WeatherCondition,
    config: ParticleFieldConfig,
    material: Material,
    positions: Vec<Vec3>,
    /// Per-particle Y velocity; always negative.
    velocities: Vec<f32>,
    rotation_y: f32,
    needs_upload: bool,
}

impl ParticleField {
    /// Build a freshly randomised field for `condition`.
    pub fn build(condition: WeatherCondition) -> Self {
        Self::build_with_rng(condition, &mut SmallRng::from_entropy())
    }

    /// Build a field drawing randomness from `rng`.
    ///
    /// X and Z are uniform in `[-spread/2, spread/2)`, Y is uniform in
    /// `[FIELD_BOTTOM, FIELD_TOP)`. Each velocity is
    /// `-(r * speed + MIN_FALL_SPEED)` for a fresh `r` in `[0, 1)`.
    pub fn build_with_rng<R: Rng>(condition: WeatherCondition, rng: &mut R) -> Self {
        let config = ParticleFieldConfig::for_condition(condition);
        let count = config.count as usize;
        let band = FIELD_TOP - FIELD_BOTTOM;

        let mut positions = Vec::with_capacity(count);
        let mut velocities = Vec::with_capacity(count);

        for _ in 0..count {
            let x = (rng.gen::<f32>() - 0.5) * config.spread;
            let y = rng.gen::<f32>() * band + FIELD_BOTTOM;
            let z = (rng.gen::<f32>() - 0.5) * config.spread;
            positions.push(Vec3::new(x, y, z));
            velocities.push(-(rng.gen::<f32>() * config.speed) - MIN_FALL_SPEED);
        }

        Self {
            condition,
            config,
            material: config.material(),
            positions,
            velocities,
            rotation_y: 0.0,
            needs_upload: true,
        }
    }

    /// Advance the field by one frame.
    pub fn step(&mut self) {
        self.rotation_y += ROTATION_STEP;

        for (position, velocity) in self.positions.iter_mut().zip(&self.velocities) {
            position.y += velocity;
            if position.y < FIELD_BOTTOM {
                position.y = FIELD_TOP;
            }
        }

        self.needs_upload = true;
    }

    /// Return whether positions changed since the last call, clearing the flag.
    pub fn take_upload(&mut self) -> bool {
        std::mem::take(&mut self.needs_upload)
    }

    /// Whether positions changed since they were last uploaded.
    #[inline]
    pub fn needs_upload(&self) -> bool {
        self.needs_upload
    }

    /// Model matrix: the field's rotation around Y.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_y(self.rotation_y)
    }

    #[inline]
    pub fn condition(&self) -> WeatherCondition {
        self.condition
    }

    #[inline]
    pub fn config(&self) -> &ParticleFieldConfig {
        &self.config
    }

    #[inline]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Positions as raw bytes, tightly packed `vec3<f32>`.
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.positions)
    }

    #[inline]
    pub fn velocities(&self) -> &[f32] {
        &self.velocities
    }

    #[inline]
    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Overwrite one particle's state.
    #[cfg(test)]
    pub(crate) fn set_particle(&mut self, index: usize, position: Vec3, velocity: f32) {
        self.positions[index] = position;
        self.velocities[index] = velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(condition: WeatherCondition, seed: u64) -> ParticleField {
        ParticleField::build_with_rng(condition, &mut SmallRng::seed_from_u64(seed))
    }

    #[test]
    fn test_counts_match_profiles() {
        for condition in WeatherCondition::ALL.into_iter().chain([WeatherCondition::Default]) {
            let field = seeded(condition, 1);
            let expected = ParticleFieldConfig::for_condition(condition).count as usize;
            assert_eq!(field.len(), expected, "{condition}");
            assert_eq!(field.velocities().len(), expected);
        }
    }

    #[test]
    fn test_initial_positions_in_volume() {
        for condition in WeatherCondition::ALL {
            let field = seeded(condition, 7);
            let half = field.config().half_spread();
            for p in field.positions() {
                assert!((FIELD_BOTTOM..=FIELD_TOP).contains(&p.y), "y = {}", p.y);
                assert!((-half..=half).contains(&p.x), "x = {}", p.x);
                assert!((-half..=half).contains(&p.z), "z = {}", p.z);
            }
        }
    }

    #[test]
    fn test_velocities_always_downward() {
        for condition in WeatherCondition::ALL {
            let field = seeded(condition, 42);
            let speed = field.config().speed;
            for &v in field.velocities() {
                assert!(v < 0.0);
                assert!(-v >= MIN_FALL_SPEED);
                assert!(-v < speed + MIN_FALL_SPEED + 1e-6, "v = {v}, speed = {speed}");
            }
        }
    }

    #[test]
    fn test_velocities_are_not_uniform() {
        let field = seeded(WeatherCondition::Rain, 3);
        let first = field.velocities()[0];
        assert!(field.velocities().iter().any(|&v| v != first));
    }

    #[test]
    fn test_step_moves_down() {
        let mut field = seeded(WeatherCondition::Snow, 9);
        field.set_particle(0, Vec3::new(1.0, 5.0, -1.0), -0.5);
        field.step();
        assert_eq!(field.positions()[0], Vec3::new(1.0, 4.5, -1.0));
    }

    #[test]
    fn test_wraps_to_top() {
        let mut field = seeded(WeatherCondition::Rain, 11);
        field.set_particle(0, Vec3::new(0.0, 0.0, 0.0), -0.3);

        let mut steps = 0;
        loop {
            let before = field.positions()[0].y;
            field.step();
            steps += 1;
            if before - 0.3 < FIELD_BOTTOM {
                assert_eq!(field.positions()[0].y, FIELD_TOP);
                break;
            }
            assert!(field.positions()[0].y >= FIELD_BOTTOM);
            assert!(steps < 1000, "particle never wrapped");
        }
    }

    #[test]
    fn test_particles_stay_in_band_over_time() {
        let mut field = seeded(WeatherCondition::Thunderstorm, 5);
        for _ in 0..500 {
            field.step();
        }
        for p in field.positions() {
            assert!((FIELD_BOTTOM..=FIELD_TOP).contains(&p.y));
        }
    }

    #[test]
    fn test_rotation_accumulates() {
        let mut field = seeded(WeatherCondition::Clear, 2);
        for _ in 0..10 {
            field.step();
        }
        assert!((field.rotation_y() - 10.0 * ROTATION_STEP).abs() < 1e-6);
        let rotated = field.model_matrix().transform_point3(Vec3::X);
        assert!(rotated.z < 0.0);
    }

    #[test]
    fn test_upload_flag() {
        let mut field = seeded(WeatherCondition::Fog, 4);
        assert!(field.take_upload());
        assert!(!field.take_upload());
        field.step();
        assert!(field.needs_upload());
        assert!(field.take_upload());
    }

    #[test]
    fn test_building_leaves_other_fields_alone() {
        let original = seeded(WeatherCondition::Mist, 8);
        let snapshot = original.positions().to_vec();
        let _other = seeded(WeatherCondition::Mist, 8);
        let _third = ParticleField::build(WeatherCondition::Rain);
        assert_eq!(original.positions(), snapshot.as_slice());
    }

    #[test]
    fn test_position_bytes_are_packed() {
        let field = seeded(WeatherCondition::Clear, 1);
        assert_eq!(field.position_bytes().len(), field.len() * 12);
    }
}
