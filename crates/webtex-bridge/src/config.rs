//! Session configuration, loadable from `webtex.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Construction parameters for a browser session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Host-assigned session id (the original host used the texture id).
    pub id: i32,
    /// Viewport width in pixels.
    pub width: i32,
    /// Viewport height in pixels.
    pub height: i32,
    /// Whether the alpha channel is meaningful; when false converted
    /// pixels are forced opaque.
    pub transparency: bool,
    /// Initial URL.
    pub url: String,
    /// Navigation hook substring; `None` disables hooking.
    pub nav_hook: Option<String>,
    /// Engine profile/cache directory for the dynamic runtime.
    pub cache_dir: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            id: 1,
            width: 512,
            height: 512,
            transparency: false,
            url: "about:blank".to_string(),
            nav_hook: None,
            cache_dir: PathBuf::from("/tmp/webtex/webcache"),
        }
    }
}

impl SessionConfig {
    /// Load from a TOML file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load from a TOML file, falling back to defaults when the file is
    /// missing or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                log::debug!("no usable config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let config = SessionConfig::default();
        assert!(config.width > 0 && config.height > 0);
        assert!(config.nav_hook.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: SessionConfig =
            toml::from_str("width = 800\nheight = 600\nnav_hook = \"logout\"").unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 600);
        assert_eq!(config.nav_hook.as_deref(), Some("logout"));
        assert_eq!(config.url, "about:blank");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = SessionConfig::load_or_default(Path::new("/nonexistent/webtex.toml"));
        assert_eq!(config.width, SessionConfig::default().width);
    }
}
