//! Map session configuration.
//!
//! # Responsibility
//! - Describe grid layout parameters consumed by hex geometry.
//! - Parse host-provided JSON configuration and reject unusable values.
//!
//! # Invariants
//! - A validated `GridConfig` has a finite, positive hex size and a finite origin.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_HEX_SIZE: f32 = 40.0;

/// Configuration errors raised before a map session starts.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    InvalidHexSize(f32),
    InvalidOrigin { x: f32, y: f32 },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid map config: {err}"),
            Self::InvalidHexSize(size) => {
                write!(f, "hex_size must be a finite positive number, got {size}")
            }
            Self::InvalidOrigin { x, y } => {
                write!(f, "grid origin must be finite, got ({x}, {y})")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::InvalidHexSize(_) => None,
            Self::InvalidOrigin { .. } => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Hex orientation of the drawn grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridOrientation {
    /// Pointy top; rows of cells are horizontal.
    #[default]
    Pointy,
    /// Flat top; columns of cells are vertical.
    Flat,
}

/// Pixel layout of the hex grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Center-to-corner distance in pixels.
    pub hex_size: f32,
    pub orientation: GridOrientation,
    /// Pixel position of cell `(0, 0)`.
    pub origin_x: f32,
    pub origin_y: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            hex_size: DEFAULT_HEX_SIZE,
            orientation: GridOrientation::Pointy,
            origin_x: 0.0,
            origin_y: 0.0,
        }
    }
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.hex_size.is_finite() || self.hex_size <= 0.0 {
            return Err(ConfigError::InvalidHexSize(self.hex_size));
        }
        if !self.origin_x.is_finite() || !self.origin_y.is_finite() {
            return Err(ConfigError::InvalidOrigin {
                x: self.origin_x,
                y: self.origin_y,
            });
        }
        Ok(())
    }
}

/// Top-level configuration for one map session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub grid: GridConfig,
}

impl MapConfig {
    /// Parses and validates a JSON config. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: MapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GridOrientation, MapConfig, DEFAULT_HEX_SIZE};

    #[test]
    fn empty_json_uses_defaults() {
        let config = MapConfig::from_json_str("{}").unwrap();
        assert_eq!(config, MapConfig::default());
        assert_eq!(config.grid.hex_size, DEFAULT_HEX_SIZE);
    }

    #[test]
    fn partial_grid_overrides_only_given_fields() {
        let config =
            MapConfig::from_json_str(r#"{"grid":{"orientation":"flat","hex_size":32}}"#).unwrap();
        assert_eq!(config.grid.orientation, GridOrientation::Flat);
        assert_eq!(config.grid.hex_size, 32.0);
        assert_eq!(config.grid.origin_x, 0.0);
    }

    #[test]
    fn rejects_non_positive_hex_size() {
        let err = MapConfig::from_json_str(r#"{"grid":{"hex_size":0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidHexSize(size) if size == 0.0));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = MapConfig::from_json_str("{grid").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
