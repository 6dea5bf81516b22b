//! Server management - spawning and health checking the console under test

use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::sleep;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

/// Handle to a running console server process
pub struct ServerHandle {
    child: Child,
    pub base_url: String,
    pub port: u16,
}

impl ServerHandle {
    /// Spawn the console server binary and block until it answers health
    /// checks.
    pub fn spawn(config: ServerConfig) -> HarnessResult<Self> {
        let port = config.port.unwrap_or_else(find_free_port);
        let base_url = format!("http://127.0.0.1:{}", port);

        info!("Spawning console server on port {}", port);

        let mut cmd = Command::new(&config.binary_path);
        cmd.env("STRATUS_CONSOLE_PORT", port.to_string())
            .env("STRATUS_CONSOLE_HOST", "127.0.0.1")
            .env("STRATUS_DATABASE_URL", &config.database_url);

        // Seeded fixtures and shortened poll intervals for tests
        if config.test_mode {
            cmd.env("STRATUS_E2E_TEST_MODE", "1");
        }

        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| {
            HarnessError::ServerStartup(format!(
                "Failed to spawn {}: {}",
                config.binary_path.display(),
                e
            ))
        })?;

        let handle = ServerHandle {
            child,
            base_url: base_url.clone(),
            port,
        };

        handle.wait_for_healthy(config.startup_timeout)?;

        info!("Server is healthy at {}", base_url);
        Ok(handle)
    }

    fn wait_for_healthy(&self, timeout: Duration) -> HarnessResult<()> {
        let health_url = format!("{}/health", self.base_url);
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout {
            attempts += 1;

            match client.get(&health_url).send() {
                Ok(resp) if resp.status().is_success() => {
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Health check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for server to start...");
                    }
                    // Refused connections just mean the listener isn't up
                    // yet; anything else is worth surfacing.
                    if !e.is_connect() {
                        warn!("Health check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100));
        }

        Err(HarnessError::ServerHealthCheck(attempts))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Stop the server: SIGTERM with a grace period, then kill.
    pub fn stop(&mut self) -> HarnessResult<()> {
        info!("Stopping server (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for ServerHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Configuration for spawning a server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the console server binary
    pub binary_path: PathBuf,

    /// Database the server should run against
    pub database_url: String,

    /// Port to listen on (None = find free port)
    pub port: Option<u16>,

    /// Timeout for server startup
    pub startup_timeout: Duration,

    /// Enable test mode (seeded fixtures, faster timeouts)
    pub test_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            binary_path: PathBuf::from("target/debug/stratus-console"),
            database_url: "postgres://localhost/stratus_test".to_string(),
            port: None,
            startup_timeout: Duration::from_secs(30),
            test_mode: true,
        }
    }
}

/// Ask the OS for an ephemeral port and release it for the server to claim.
fn find_free_port() -> u16 {
    use std::net::TcpListener;

    TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind to find free port")
        .local_addr()
        .expect("Failed to get local addr")
        .port()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    #[test]
    fn free_port_is_actually_bindable() {
        let port = find_free_port();

        // The probe listener was dropped, so the spawned server must be able
        // to take the port itself.
        TcpListener::bind(("127.0.0.1", port)).unwrap();
    }
}
