use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Optional defaults read from `<config_dir>/fractart/config.toml`.
/// Command-line flags override anything set here.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub log: LogSettings,
    #[serde(default)]
    pub fern: FernSettings,
    #[serde(default)]
    pub mandelbrot: EscapeSettings,
    #[serde(default)]
    pub julia: EscapeSettings,
    #[serde(default)]
    pub lsystem: LSystemSettings,
    #[serde(default)]
    pub spirograph: SpiroSettings,
}

#[derive(Debug, Deserialize)]
pub struct LogSettings {
    #[serde(default = "default_log_level")]
    pub level: String,  // tracing filter directive, e.g. "warn" or "fractart=debug"
}

impl Default for LogSettings {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct FernSettings {
    pub preset: Option<String>,
    pub iterations: Option<usize>,
    pub slider: Option<u32>,
    pub color: Option<String>,  // #rrggbb
}

#[derive(Debug, Default, Deserialize)]
pub struct EscapeSettings {
    pub depth: Option<u32>,
    pub threshold: Option<f64>,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LSystemSettings {
    pub preset: Option<String>,
    pub generations: Option<u32>,
    pub angle: Option<f64>,     // degrees
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpiroSettings {
    pub preset: Option<String>,
    pub color: Option<String>,  // red, white or rainbow
    pub speed: Option<usize>,
}

impl Settings {
    /// Read the config file. Problems fall back to defaults and come back as
    /// a message for the caller to log once logging is up.
    pub fn load() -> (Self, Option<String>) {
        let path = Self::config_path();
        if !path.exists() {
            return (Self::default(), None);
        }

        match fs::read_to_string(&path) {
            Ok(content) => match Self::parse(&content) {
                Ok(settings) => (settings, None),
                Err(e) => (
                    Self::default(),
                    Some(format!("ignoring unparsable config {}: {}", path.display(), e)),
                ),
            },
            Err(e) => (
                Self::default(),
                Some(format!("cannot read config {}: {}", path.display(), e)),
            ),
        }
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fractart")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::parse("").unwrap();
        assert_eq!(settings.log.level, "warn");
        assert!(settings.fern.preset.is_none());
    }

    #[test]
    fn per_view_sections_are_read() {
        let settings = Settings::parse(
            r##"
            [log]
            level = "debug"

            [julia]
            depth = 250
            color = "#ffae00"

            [spirograph]
            preset = "star"
            speed = 40
            "##,
        )
        .unwrap();
        assert_eq!(settings.log.level, "debug");
        assert_eq!(settings.julia.depth, Some(250));
        assert_eq!(settings.julia.color.as_deref(), Some("#ffae00"));
        assert_eq!(settings.spirograph.preset.as_deref(), Some("star"));
        assert_eq!(settings.spirograph.speed, Some(40));
        assert!(settings.mandelbrot.depth.is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Settings::parse("[fern\npreset = ").is_err());
    }
}
