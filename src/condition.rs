//! Weather-condition labels.
//!
//! The background is driven by a single label such as `"rain"` or `"Snow"`.
//! Lookup is case-insensitive and never fails: anything outside the table
//! resolves to [`WeatherCondition::Default`].

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// A weather condition the background knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WeatherCondition {
    /// Sparse, slow, pale gold motes.
    Clear,
    /// Dense, fast blue streaks.
    Rain,
    /// Lighter rain.
    Drizzle,
    /// Large, slow white flakes.
    Snow,
    /// Densest and fastest field, dark navy.
    Thunderstorm,
    /// Few, large, almost still grey particles.
    Clouds,
    /// Wide soft grey particles.
    Mist,
    /// Like mist, darker and larger.
    Fog,
    /// Fallback for unknown or missing labels.
    #[default]
    Default,
}

impl WeatherCondition {
    /// The named conditions, in table order. [`WeatherCondition::Default`] is not included.
    pub const ALL: [WeatherCondition; 8] = [
        WeatherCondition::Rain,
        WeatherCondition::Drizzle,
        WeatherCondition::Snow,
        WeatherCondition::Thunderstorm,
        WeatherCondition::Clouds,
        WeatherCondition::Mist,
        WeatherCondition::Fog,
        WeatherCondition::Clear,
    ];

    /// Resolve a label. Case is ignored; anything else must match a table key exactly.
    pub fn parse(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "clear" => WeatherCondition::Clear,
            "rain" => WeatherCondition::Rain,
            "drizzle" => WeatherCondition::Drizzle,
            "snow" => WeatherCondition::Snow,
            "thunderstorm" => WeatherCondition::Thunderstorm,
            "clouds" => WeatherCondition::Clouds,
            "mist" => WeatherCondition::Mist,
            "fog" => WeatherCondition::Fog,
            _ => WeatherCondition::Default,
        }
    }

    /// Resolve an optional label; `None` is the fallback.
    pub fn from_label(label: Option<&str>) -> Self {
        label.map(Self::parse).unwrap_or_default()
    }

    /// Lower-case table key.
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Clear => "clear",
            WeatherCondition::Rain => "rain",
            WeatherCondition::Drizzle => "drizzle",
            WeatherCondition::Snow => "snow",
            WeatherCondition::Thunderstorm => "thunderstorm",
            WeatherCondition::Clouds => "clouds",
            WeatherCondition::Mist => "mist",
            WeatherCondition::Fog => "fog",
            WeatherCondition::Default => "default",
        }
    }

    /// Next condition in [`Self::ALL`], wrapping. The fallback steps to the first entry.
    pub fn next(&self) -> Self {
        match self.table_index() {
            Some(i) => Self::ALL[(i + 1) % Self::ALL.len()],
            None => Self::ALL[0],
        }
    }

    /// Previous condition in [`Self::ALL`], wrapping. The fallback steps to the last entry.
    pub fn previous(&self) -> Self {
        let len = Self::ALL.len();
        match self.table_index() {
            Some(i) => Self::ALL[(i + len - 1) % len],
            None => Self::ALL[len - 1],
        }
    }

    fn table_index(&self) -> Option<usize> {
        Self::ALL.iter().position(|c| c == self)
    }
}

impl FromStr for WeatherCondition {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl From<&str> for WeatherCondition {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(WeatherCondition::parse("rain"), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::parse("thunderstorm"), WeatherCondition::Thunderstorm);
        assert_eq!(WeatherCondition::parse("fog"), WeatherCondition::Fog);
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!(WeatherCondition::parse("Snow"), WeatherCondition::Snow);
        assert_eq!(WeatherCondition::parse("CLOUDS"), WeatherCondition::Clouds);
        assert_eq!(WeatherCondition::parse("mIsT"), WeatherCondition::Mist);
    }

    #[test]
    fn test_padded_labels_fall_back() {
        assert_eq!(WeatherCondition::parse("  Mist "), WeatherCondition::Default);
        assert_eq!(WeatherCondition::parse(" mist "), WeatherCondition::Default);
        assert_eq!(WeatherCondition::parse("rain\n"), WeatherCondition::Default);
        assert_eq!(WeatherCondition::from_label(Some(" snow")), WeatherCondition::Default);
    }

    #[test]
    fn test_unknown_labels_fall_back() {
        assert_eq!(WeatherCondition::parse(""), WeatherCondition::Default);
        assert_eq!(WeatherCondition::parse("haze"), WeatherCondition::Default);
        assert_eq!(WeatherCondition::parse("tornado"), WeatherCondition::Default);
        assert_eq!(WeatherCondition::from_label(None), WeatherCondition::Default);
        assert_eq!(WeatherCondition::from_label(Some("clear")), WeatherCondition::Clear);
    }

    #[test]
    fn test_display_round_trips_table_keys() {
        for condition in WeatherCondition::ALL {
            assert_eq!(WeatherCondition::parse(&condition.to_string()), condition);
        }
        assert_eq!(WeatherCondition::Default.to_string(), "default");
    }

    #[test]
    fn test_cycling_wraps() {
        assert_eq!(WeatherCondition::Clear.next(), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::Rain.previous(), WeatherCondition::Clear);
        assert_eq!(WeatherCondition::Default.next(), WeatherCondition::Rain);
        assert_eq!(WeatherCondition::Default.previous(), WeatherCondition::Clear);

        let mut c = WeatherCondition::Snow;
        for _ in 0..WeatherCondition::ALL.len() {
            c = c.next();
        }
        assert_eq!(c, WeatherCondition::Snow);
    }
}
