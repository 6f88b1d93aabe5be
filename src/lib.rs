//! # Weather Backdrop
//!
//! An animated particle background that reacts to the current weather.
//!
//! Give it a condition label such as `"rain"` or `"Snow"` and it draws a
//! full-window field of falling particles plus a matching background colour
//! and depth fade. Change the label and the field is rebuilt; everything else
//! (fetching weather, panels, charts) is the caller's business.
//!
//! ## Quick Start
//!
//! ```ignore
//! use weather_backdrop::prelude::*;
//!
//! fn main() -> Result<(), BackgroundError> {
//!     weather_backdrop::run(BackdropConfig::new().with_condition("snow"))
//! }
//! ```
//!
//! ## Embedding
//!
//! [`WeatherBackground`] is generic over a [`Renderer`], so it can sit on top
//! of any drawing backend. The bundled wgpu renderer is used by [`run`].
//!
//! ```ignore
//! let mut bg = WeatherBackground::mount(renderer, viewport, WeatherCondition::Clear);
//! bg.set_condition("thunderstorm");
//! while bg.frame() != FrameOutcome::Cancelled && bg.schedule_next() {
//!     // wait for the next display refresh
//! }
//! bg.unmount();
//! ```
//!
//! ## Conditions
//!
//! | Condition | Particles | Colour | Size | Speed | Spread |
//! |-----------|-----------|--------|------|-------|--------|
//! | rain | 3000 | `#4a9eff` | 0.15 | 0.15 | 40 |
//! | drizzle | 2000 | `#6eb5ff` | 0.10 | 0.08 | 40 |
//! | snow | 1500 | `#ffffff` | 0.25 | 0.03 | 40 |
//! | thunderstorm | 3500 | `#1e3a5f` | 0.20 | 0.20 | 40 |
//! | clouds | 500 | `#cccccc` | 0.30 | 0.01 | 50 |
//! | mist | 800 | `#aaaaaa` | 0.40 | 0.02 | 35 |
//! | fog | 800 | `#999999` | 0.50 | 0.015 | 35 |
//! | clear | 200 | `#ffeb99` | 0.20 | 0.005 | 60 |
//! | anything else | 300 | `#ffffff` | 0.20 | 0.02 | 40 |

pub mod backdrop;
pub mod background;
pub mod camera;
pub mod condition;
pub mod config;
pub mod error;
pub mod field;
pub mod frame_loop;
mod gpu;
pub mod profile;
pub mod renderer;
pub mod visuals;
pub mod weather;
mod window;

pub use backdrop::{Fog, SceneBackdrop};
pub use background::{FrameOutcome, WeatherBackground};
pub use camera::{PerspectiveCamera, Viewport};
pub use condition::WeatherCondition;
pub use config::BackdropConfig;
pub use error::{BackgroundError, ConfigError, GpuError, RenderError};
pub use field::ParticleField;
pub use frame_loop::{CancelToken, FrameLoop};
pub use glam::{Mat4, Vec3};
pub use gpu::{GpuField, GpuState};
pub use profile::ParticleFieldConfig;
pub use renderer::{Frame, FrameField, Renderer};
pub use visuals::{BlendMode, Material, Rgb};
pub use weather::{CurrentWeather, WeatherSummary};
pub use window::run;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use weather_backdrop::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backdrop::SceneBackdrop;
    pub use crate::background::{FrameOutcome, WeatherBackground};
    pub use crate::camera::Viewport;
    pub use crate::condition::WeatherCondition;
    pub use crate::config::BackdropConfig;
    pub use crate::error::BackgroundError;
    pub use crate::field::ParticleField;
    pub use crate::profile::ParticleFieldConfig;
    pub use crate::renderer::{Frame, Renderer};
    pub use crate::weather::CurrentWeather;
}
