//! Runtime configuration.
//!
//! - [`ServerConfig`]: HTTP service settings, read from the environment
//!   (`.env` is honoured through dotenvy)
//! - [`LayoutOptions`]: cosmetic layout constants of generated sheets

use serde::{Deserialize, Serialize};
use std::env;

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default upload limit in megabytes.
pub const DEFAULT_MAX_UPLOAD_MB: usize = 50;

/// HTTP service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Maximum request body size, in megabytes.
    pub max_upload_mb: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl ServerConfig {
    /// Read `SALESBOOK_PORT` and `SALESBOOK_MAX_UPLOAD_MB`.
    ///
    /// Unset or unparseable variables fall back to the defaults.
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            port: lookup("SALESBOOK_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            max_upload_mb: lookup("SALESBOOK_MAX_UPLOAD_MB")
                .and_then(|v| v.trim().parse().ok())
                .filter(|mb| *mb > 0)
                .unwrap_or(defaults.max_upload_mb),
        }
    }

    /// Override the port (CLI flag).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

/// Layout constants for generated sheets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutOptions {
    /// Width applied to every formatted column.
    pub column_width: f64,
    /// Extra columns formatted past the used range.
    pub headroom_columns: u32,
    /// Row where EOD blocks start.
    pub secondary_start_row: u32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            column_width: 15.0,
            headroom_columns: 30,
            secondary_start_row: 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(ServerConfig::from_lookup(lookup(&[])), ServerConfig::default());
    }

    #[test]
    fn test_reads_variables() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SALESBOOK_PORT", "8080"),
            ("SALESBOOK_MAX_UPLOAD_MB", " 10 "),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_upload_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("SALESBOOK_PORT", "not-a-port"),
            ("SALESBOOK_MAX_UPLOAD_MB", "0"),
        ]));
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn test_port_override() {
        assert_eq!(ServerConfig::default().with_port(9000).port, 9000);
    }

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutOptions::default();
        assert_eq!(layout.column_width, 15.0);
        assert_eq!(layout.headroom_columns, 30);
        assert_eq!(layout.secondary_start_row, 3);
    }
}
