use color_tones::{QuantizeMethod, DEFAULT_K};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;
use std::time::Duration;

/// Application configuration loaded from the YAML file named by `CONFIG_FILE`
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct AppConfig {
    /// Palette derivation settings
    #[serde(default)]
    pub quantization: QuantizationConfig,

    /// Movement threshold settings
    #[serde(default)]
    pub movement: MovementConfig,

    /// Debounce settings for K / method changes
    #[serde(default)]
    pub reconfigure: ReconfigureConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct QuantizationConfig {
    /// Requested palette size; clamped to 1..=256 when applied
    #[serde(default = "default_k")]
    pub k: i64,

    /// One of `direct`, `uniform`, `kmeans`
    #[serde(
        default,
        deserialize_with = "deserialize_method",
        serialize_with = "serialize_method"
    )]
    pub method: QuantizeMethod,
}

fn default_k() -> i64 {
    DEFAULT_K as i64
}

impl Default for QuantizationConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            method: QuantizeMethod::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MovementConfig {
    /// Initial threshold slider position in [0, 1]
    #[serde(default = "default_slider")]
    pub threshold_slider: f64,
}

fn default_slider() -> f64 {
    0.5
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            threshold_slider: default_slider(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReconfigureConfig {
    /// Minimum spacing between applied rebuilds, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

impl Default for ReconfigureConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl ReconfigureConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

fn deserialize_method<'de, D>(deserializer: D) -> Result<QuantizeMethod, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}

fn serialize_method<S>(method: &QuantizeMethod, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(method.as_str())
}

impl AppConfig {
    /// Load configuration from the `CONFIG_FILE` environment variable.
    ///
    /// Falls back to defaults when the variable is unset.
    pub fn from_env() -> Self {
        match std::env::var("CONFIG_FILE") {
            Ok(path) => Self::load(Path::new(&path)),
            Err(_) => {
                tracing::debug!("CONFIG_FILE not set, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from a YAML file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_yaml(&content) {
                Ok(config) => {
                    tracing::info!(
                        path = %path.display(),
                        k = config.quantization.k,
                        method = %config.quantization.method,
                        "Loaded configuration"
                    );
                    config
                }
                Err(e) => {
                    tracing::warn!(%e, path = %path.display(), "Failed to parse config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(%e, path = %path.display(), "Failed to read config, using defaults");
                Self::default()
            }
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }
}
