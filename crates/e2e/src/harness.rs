//! Wires a configured console into a ready-to-use [`Appliance`]

use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use stratus_model::{default_registry, Appliance};
use stratus_rest::RestClient;
use stratus_ui::{Browser, BrowserConfig, PlaywrightSession};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};

/// A logged-in appliance plus the config that produced it.
pub struct Harness {
    pub config: HarnessConfig,
    pub appliance: Arc<Appliance>,
}

impl Harness {
    /// Build a harness from the environment, or `None` when no console is
    /// configured. Live tests call this and return early on `None`.
    pub fn from_env() -> HarnessResult<Option<Self>> {
        let config = HarnessConfig::from_env()?;
        if config.base_url.is_none() {
            warn!("STRATUS_BASE_URL not set; skipping live test");
            return Ok(None);
        }
        Ok(Some(Self::connect(config)?))
    }

    /// Connect to the configured console and log in.
    pub fn connect(config: HarnessConfig) -> HarnessResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .ok_or_else(|| HarnessError::Config("base_url is required".to_string()))?;

        info!(%base_url, browser = %config.browser, "connecting to console");

        let ui = PlaywrightSession::new(BrowserConfig {
            base_url: base_url.clone(),
            browser: Browser::parse(&config.browser),
            headless: config.headless,
            ..Default::default()
        })?;

        let rest = RestClient::new(&base_url, &config.username, &config.password)
            .map_err(stratus_model::ModelError::from)?;

        let appliance = Appliance::new(&base_url, Arc::new(ui), rest, default_registry());
        appliance.login(&config.username, &config.password)?;

        Ok(Self { config, appliance })
    }

    pub fn appliance(&self) -> &Arc<Appliance> {
        &self.appliance
    }
}

/// Poll `probe` until it returns true or `timeout` elapses.
pub fn wait_for<F>(what: &str, timeout: Duration, mut probe: F) -> HarnessResult<()>
where
    F: FnMut() -> HarnessResult<bool>,
{
    let start = Instant::now();
    while start.elapsed() < timeout {
        if probe()? {
            return Ok(());
        }
        sleep(Duration::from_millis(500));
    }
    Err(HarnessError::Timeout(what.to_string()))
}
