//! Configuration for the background window.
//!
//! Settings come from, in increasing priority: built-in defaults, an optional
//! JSON file, the `WEATHER_CONDITION` environment variable, then command-line
//! arguments.
//!
//! ```text
//! weather-backdrop [CONDITION] [--config PATH] [--weather PATH] [--seed N]
//! ```
//!
//! `--weather` takes a saved OpenWeather current-weather response and uses
//! its condition.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::condition::WeatherCondition;
use crate::error::ConfigError;
use crate::weather::CurrentWeather;

/// Environment variable overriding the configured condition.
pub const CONDITION_ENV: &str = "WEATHER_CONDITION";

fn default_title() -> String {
    "Weather Backdrop".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_vsync() -> bool {
    true
}

/// Window and background settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackdropConfig {
    #[serde(default = "default_title")]
    pub title: String,
    /// Initial logical window width.
    #[serde(default = "default_width")]
    pub width: u32,
    /// Initial logical window height.
    #[serde(default = "default_height")]
    pub height: u32,
    /// Initial condition label. Absent means the fallback profile.
    #[serde(default)]
    pub condition: Option<String>,
    /// Fixed seed for particle placement.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Present with vsync.
    #[serde(default = "default_vsync")]
    pub vsync: bool,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            condition: None,
            seed: None,
            vsync: default_vsync(),
        }
    }
}

impl BackdropConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial window size in logical pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the initial condition label.
    pub fn with_condition(mut self, label: impl Into<String>) -> Self {
        self.condition = Some(label.into());
        self
    }

    /// Use a fixed seed for particle placement.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    /// The condition to mount with.
    pub fn initial_condition(&self) -> WeatherCondition {
        WeatherCondition::from_label(self.condition.as_deref())
    }

    /// Parse a JSON config document. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_json(&read(path)?)
    }

    /// Build the full configuration from the process environment and `args`
    /// (without the program name).
    pub fn load<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let args = Args::parse(args)?;
        let base = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        let env = std::env::var(CONDITION_ENV).ok();
        args.apply(base.apply_env(env))
    }

    /// Let a non-empty environment value override the condition.
    fn apply_env(mut self, value: Option<String>) -> Self {
        if let Some(label) = value.filter(|v| !v.trim().is_empty()) {
            self.condition = Some(label);
        }
        self
    }
}

/// Parsed command line.
#[derive(Debug, Default, PartialEq)]
struct Args {
    condition: Option<String>,
    config: Option<PathBuf>,
    weather: Option<PathBuf>,
    seed: Option<u64>,
}

impl Args {
    fn parse<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut parsed = Args::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--config"))?;
                    parsed.config = Some(PathBuf::from(value));
                }
                "--weather" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--weather"))?;
                    parsed.weather = Some(PathBuf::from(value));
                }
                "--seed" => {
                    let value = args.next().ok_or(ConfigError::MissingValue("--seed"))?;
                    let seed = value.parse().map_err(|_| ConfigError::InvalidValue {
                        flag: "--seed",
                        value: value.clone(),
                    })?;
                    parsed.seed = Some(seed);
                }
                flag if flag.starts_with("--") => {
                    return Err(ConfigError::UnknownArgument(flag.to_string()));
                }
                _ if parsed.condition.is_none() => parsed.condition = Some(arg),
                _ => return Err(ConfigError::UnknownArgument(arg)),
            }
        }

        Ok(parsed)
    }

    fn apply(self, mut config: BackdropConfig) -> Result<BackdropConfig, ConfigError> {
        if let Some(path) = &self.weather {
            let current = CurrentWeather::from_json(&read(path)?)?;
            config.condition = Some(current.condition().to_string());
        }
        if let Some(label) = self.condition {
            config.condition = Some(label);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(config)
    }
}

fn read(path: &Path) -> Result<String, ConfigError> {
    fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults() {
        let config = BackdropConfig::default();
        assert_eq!((config.width, config.height), (1280, 720));
        assert!(config.vsync);
        assert_eq!(config.initial_condition(), WeatherCondition::Default);
    }

    #[test]
    fn test_builder() {
        let config = BackdropConfig::new()
            .with_title("Storm")
            .with_size(800, 600)
            .with_condition("Thunderstorm")
            .with_seed(9)
            .with_vsync(false);
        assert_eq!(config.title, "Storm");
        assert_eq!(config.initial_condition(), WeatherCondition::Thunderstorm);
        assert_eq!(config.seed, Some(9));
        assert!(!config.vsync);
    }

    #[test]
    fn test_json_fills_defaults() {
        let config = BackdropConfig::from_json(r#"{"condition": "snow", "width": 640}"#).unwrap();
        assert_eq!(config.width, 640);
        assert_eq!(config.height, 720);
        assert_eq!(config.initial_condition(), WeatherCondition::Snow);
    }

    #[test]
    fn test_parse_args() {
        let parsed = Args::parse(args(&["rain", "--seed", "7", "--config", "bg.json"])).unwrap();
        assert_eq!(parsed.condition.as_deref(), Some("rain"));
        assert_eq!(parsed.seed, Some(7));
        assert_eq!(parsed.config, Some(PathBuf::from("bg.json")));
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(matches!(
            Args::parse(args(&["--config"])),
            Err(ConfigError::MissingValue("--config"))
        ));
        assert!(matches!(
            Args::parse(args(&["--seed", "abc"])),
            Err(ConfigError::InvalidValue { flag: "--seed", .. })
        ));
        assert!(matches!(
            Args::parse(args(&["--fullscreen"])),
            Err(ConfigError::UnknownArgument(_))
        ));
        assert!(matches!(
            Args::parse(args(&["rain", "snow"])),
            Err(ConfigError::UnknownArgument(_))
        ));
    }

    #[test]
    fn test_priority_env_then_cli() {
        let base = BackdropConfig::default().with_condition("clear");
        let with_env = base.apply_env(Some("fog".into()));
        assert_eq!(with_env.initial_condition(), WeatherCondition::Fog);

        let unchanged = with_env.clone().apply_env(Some("  ".into()));
        assert_eq!(unchanged.initial_condition(), WeatherCondition::Fog);

        let cli = Args::parse(args(&["drizzle"])).unwrap();
        let config = cli.apply(with_env).unwrap();
        assert_eq!(config.initial_condition(), WeatherCondition::Drizzle);
    }

    #[test]
    fn test_missing_weather_file() {
        let cli = Args::parse(args(&["--weather", "/definitely/not/here.json"])).unwrap();
        assert!(matches!(
            cli.apply(BackdropConfig::default()),
            Err(ConfigError::Io { .. })
        ));
    }
}
