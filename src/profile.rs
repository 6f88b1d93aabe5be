//! Per-condition particle field parameters.

use crate::condition::WeatherCondition;
use crate::visuals::{Material, Rgb};

/// Parameters for one weather condition's particle field.
///
/// A pure function of the condition; see [`ParticleFieldConfig::for_condition`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleFieldConfig {
    /// Number of particles.
    pub count: u32,
    /// Particle colour.
    pub color: Rgb,
    /// Point size in world units.
    pub size: f32,
    /// Upper bound of the random part of each particle's fall speed, per frame.
    pub speed: f32,
    /// Width and depth of the spawn volume.
    pub spread: f32,
}

impl ParticleFieldConfig {
    /// Look up the field parameters for a condition.
    pub const fn for_condition(condition: WeatherCondition) -> Self {
        match condition {
            WeatherCondition::Rain => Self::new(3000, 0x4a9eff, 0.15, 0.15, 40.0),
            WeatherCondition::Drizzle => Self::new(2000, 0x6eb5ff, 0.1, 0.08, 40.0),
            WeatherCondition::Snow => Self::new(1500, 0xffffff, 0.25, 0.03, 40.0),
            WeatherCondition::Thunderstorm => Self::new(3500, 0x1e3a5f, 0.2, 0.2, 40.0),
            WeatherCondition::Clouds => Self::new(500, 0xcccccc, 0.3, 0.01, 50.0),
            WeatherCondition::Mist => Self::new(800, 0xaaaaaa, 0.4, 0.02, 35.0),
            WeatherCondition::Fog => Self::new(800, 0x999999, 0.5, 0.015, 35.0),
            WeatherCondition::Clear => Self::new(200, 0xffeb99, 0.2, 0.005, 60.0),
            WeatherCondition::Default => Self::new(300, 0xffffff, 0.2, 0.02, 40.0),
        }
    }

    const fn new(count: u32, color: u32, size: f32, speed: f32, spread: f32) -> Self {
        Self {
            count,
            color: Rgb::from_hex(color),
            size,
            speed,
            spread,
        }
    }

    /// Half of [`Self::spread`]; particles spawn in `[-half, half]` on X and Z.
    #[inline]
    pub fn half_spread(&self) -> f32 {
        self.spread * 0.5
    }

    /// The point material for this field.
    pub fn material(&self) -> Material {
        Material::points(self.color, self.size)
    }
}

impl From<WeatherCondition> for ParticleFieldConfig {
    fn from(condition: WeatherCondition) -> Self {
        Self::for_condition(condition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_counts() {
        let expected = [
            (WeatherCondition::Rain, 3000),
            (WeatherCondition::Drizzle, 2000),
            (WeatherCondition::Snow, 1500),
            (WeatherCondition::Thunderstorm, 3500),
            (WeatherCondition::Clouds, 500),
            (WeatherCondition::Mist, 800),
            (WeatherCondition::Fog, 800),
            (WeatherCondition::Clear, 200),
            (WeatherCondition::Default, 300),
        ];
        for (condition, count) in expected {
            assert_eq!(ParticleFieldConfig::for_condition(condition).count, count, "{condition}");
        }
    }

    #[test]
    fn test_default_profile() {
        let p = ParticleFieldConfig::for_condition(WeatherCondition::parse("unknown"));
        assert_eq!(p.count, 300);
        assert_eq!(p.color, Rgb::WHITE);
        assert_eq!(p.size, 0.2);
        assert_eq!(p.speed, 0.02);
        assert_eq!(p.spread, 40.0);
    }

    #[test]
    fn test_snow_profile() {
        let p = ParticleFieldConfig::from(WeatherCondition::Snow);
        assert_eq!(p.color, Rgb::WHITE);
        assert_eq!(p.size, 0.25);
        assert_eq!(p.speed, 0.03);
    }

    #[test]
    fn test_wide_profiles() {
        assert_eq!(ParticleFieldConfig::for_condition(WeatherCondition::Clear).spread, 60.0);
        assert_eq!(ParticleFieldConfig::for_condition(WeatherCondition::Clouds).spread, 50.0);
        assert_eq!(ParticleFieldConfig::for_condition(WeatherCondition::Fog).half_spread(), 17.5);
    }

    #[test]
    fn test_material_uses_profile_look() {
        let p = ParticleFieldConfig::for_condition(WeatherCondition::Rain);
        let m = p.material();
        assert_eq!(m.color.hex(), 0x4a9eff);
        assert_eq!(m.size, 0.15);
    }
}
