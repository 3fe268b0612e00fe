pub mod config;

pub use config::{AppConfig, MovementConfig, QuantizationConfig, ReconfigureConfig};
