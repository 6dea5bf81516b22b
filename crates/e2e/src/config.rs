//! Harness configuration: YAML file plus environment overrides
//!
//! Live tests gate themselves on `STRATUS_BASE_URL`; when it is unset (and
//! no config file names a console) they skip instead of failing.

use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::HarnessResult;

const DEFAULT_USERNAME: &str = "admin";
const DEFAULT_PASSWORD: &str = "smartvm";

/// Where and how to reach the console under test.
#[derive(Debug, Clone, Deserialize)]
pub struct HarnessConfig {
    /// Console base URL; tests skip when absent.
    pub base_url: Option<String>,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default = "default_password")]
    pub password: String,

    /// Browser to drive (chromium, firefox, webkit)
    #[serde(default = "default_browser")]
    pub browser: String,

    #[serde(default = "default_headless")]
    pub headless: bool,
}

fn default_username() -> String {
    DEFAULT_USERNAME.to_string()
}

fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}

fn default_browser() -> String {
    "chromium".to_string()
}

fn default_headless() -> bool {
    true
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            username: default_username(),
            password: default_password(),
            browser: default_browser(),
            headless: default_headless(),
        }
    }
}

impl HarnessConfig {
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// File config (when `STRATUS_E2E_CONFIG` points at one) with individual
    /// `STRATUS_*` variables layered on top.
    pub fn from_env() -> HarnessResult<Self> {
        let mut config = match std::env::var("STRATUS_E2E_CONFIG") {
            Ok(path) => {
                debug!(%path, "loading harness config file");
                Self::from_file(Path::new(&path))?
            }
            Err(_) => Self::default(),
        };

        if let Ok(base_url) = std::env::var("STRATUS_BASE_URL") {
            config.base_url = Some(base_url);
        }
        if let Ok(username) = std::env::var("STRATUS_USERNAME") {
            config.username = username;
        }
        if let Ok(password) = std::env::var("STRATUS_PASSWORD") {
            config.password = password;
        }
        if let Ok(browser) = std::env::var("STRATUS_BROWSER") {
            config.browser = browser;
        }
        if let Ok(headless) = std::env::var("STRATUS_HEADLESS") {
            config.headless = headless != "0" && !headless.eq_ignore_ascii_case("false");
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_fills_defaults() {
        let config = HarnessConfig::from_yaml("base_url: http://10.0.0.5:3000\n").unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://10.0.0.5:3000"));
        assert_eq!(config.username, "admin");
        assert_eq!(config.browser, "chromium");
        assert!(config.headless);
    }

    #[test]
    fn yaml_overrides_everything() {
        let yaml = r#"
base_url: http://console.example:8443
username: qa
password: secret
browser: firefox
headless: false
"#;
        let config = HarnessConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.username, "qa");
        assert_eq!(config.browser, "firefox");
        assert!(!config.headless);
    }
}
