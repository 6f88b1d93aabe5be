//! Scene backdrop: clear colour plus a smooth depth fade.

use crate::condition::WeatherCondition;
use crate::visuals::Rgb;

/// Smoothstep depth fade toward a colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    /// Colour particles fade toward.
    pub color: Rgb,
    /// View depth where fading starts.
    pub near: f32,
    /// View depth where particles are fully faded.
    pub far: f32,
}

impl Fog {
    pub const NEAR: f32 = 5.0;
    pub const FAR: f32 = 15.0;
    /// Smallest fade width; `near == far` behaves as a hard step at `near`.
    /// Mirrored in `particles.wgsl`.
    pub const MIN_RANGE: f32 = 0.0001;

    pub fn new(color: Rgb) -> Self {
        Self {
            color,
            near: Self::NEAR,
            far: Self::FAR,
        }
    }

    /// Fade amount at `depth`: 0 up to `near`, 1 from `far`, smoothstep between.
    ///
    /// This is the curve the particle shader applies per vertex.
    pub fn factor(&self, depth: f32) -> f32 {
        let range = (self.far - self.near).max(Self::MIN_RANGE);
        let t = ((depth - self.near) / range).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }
}

/// Background colour and fog for one condition.
///
/// Replaced wholesale on every condition change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBackdrop {
    /// Clear colour, the top of the condition's gradient.
    pub background: Rgb,
    /// Depth fade, coloured with the bottom of the gradient.
    pub fog: Fog,
}

impl SceneBackdrop {
    /// Look up the backdrop for a condition.
    pub fn for_condition(condition: WeatherCondition) -> Self {
        let (top, bottom) = gradient(condition);
        Self {
            background: Rgb::from_hex(top),
            fog: Fog::new(Rgb::from_hex(bottom)),
        }
    }
}

impl Default for SceneBackdrop {
    fn default() -> Self {
        Self::for_condition(WeatherCondition::Default)
    }
}

/// `(top, bottom)` gradient pair.
fn gradient(condition: WeatherCondition) -> (u32, u32) {
    match condition {
        WeatherCondition::Clear => (0x87ceeb, 0xffd700),
        WeatherCondition::Rain => (0x4a5f7f, 0x2c3e50),
        WeatherCondition::Drizzle => (0x667c99, 0x455a75),
        WeatherCondition::Snow => (0xb0c4de, 0xe6f2ff),
        WeatherCondition::Thunderstorm => (0x1a1a2e, 0x16213e),
        WeatherCondition::Clouds => (0x7f8c99, 0xb0bec5),
        WeatherCondition::Mist | WeatherCondition::Fog => (0x9e9e9e, 0xbdbdbd),
        WeatherCondition::Default => (0x667eea, 0x764ba2),
    }
}
