// Configuration loading

pub mod settings;

pub use settings::{AliasOverrides, ConfigError, Settings};
