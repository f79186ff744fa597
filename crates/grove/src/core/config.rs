//! Toolkit-wide settings shared by every window.
use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Toolkit configuration. Missing fields take their default values, so a
/// partial JSON document is a valid configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Width of drag handles such as splitter bars, in pixels.
    pub handle_width: u32,
    /// Pixels scrolled per wheel notch.
    pub scroll_velocity: u32,
    /// Require Alt for Tab focus traversal, leaving plain Tab to widgets.
    pub focus_key_alt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            handle_width: 6,
            scroll_velocity: 16,
            focus_key_alt: false,
        }
    }
}

impl Config {
    /// Parse a configuration from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        Self::from_json(&s)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn partial_documents_use_defaults() -> Result<()> {
        let c = Config::from_json(r#"{"scroll_velocity": 3}"#)?;
        assert_eq!(c.scroll_velocity, 3);
        assert_eq!(c.handle_width, Config::default().handle_width);
        assert!(!c.focus_key_alt);
        assert_eq!(Config::from_json(&c.to_json()?)?, c);
        Ok(())
    }

    #[test]
    fn bad_documents_are_config_errors() {
        assert!(matches!(
            Config::from_json("{\"handle_width\": -1}"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::load(Path::new("/nonexistent/grove.json")),
            Err(Error::Io(_))
        ));
    }
}
