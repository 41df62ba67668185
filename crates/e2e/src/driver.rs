//! Driver management - spawning and health checking a local WebDriver server

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use serde::Deserialize;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::DriverConfig;
use crate::error::{E2eError, E2eResult};

/// Handle to a running chromedriver/geckodriver process
pub struct DriverHandle {
    child: Child,
    pub url: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    value: StatusValue,
}

#[derive(Debug, Deserialize)]
struct StatusValue {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    message: String,
}

impl DriverHandle {
    /// Spawn the driver binary and wait until it reports ready
    pub async fn spawn(config: &DriverConfig) -> E2eResult<Self> {
        let port = match config.port {
            Some(port) => port,
            None => find_free_port()?,
        };
        let url = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", config.binary_path.display(), port);

        let child = Command::new(&config.binary_path)
            .arg(format!("--port={}", port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                E2eError::DriverStartup(format!(
                    "Failed to spawn {}: {}",
                    config.binary_path.display(),
                    e
                ))
            })?;

        let handle = DriverHandle { child, url, port };
        handle.wait_for_ready(config.startup_timeout()).await?;

        info!("WebDriver is ready at {}", handle.url);
        Ok(handle)
    }

    /// Poll `/status` until the driver accepts sessions
    async fn wait_for_ready(&self, timeout_duration: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.url);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let start = std::time::Instant::now();
        let mut attempts = 0;

        while start.elapsed() < timeout_duration {
            attempts += 1;

            match client.get(&status_url).send().await {
                Ok(resp) if resp.status().is_success() => match resp.json::<StatusResponse>().await {
                    Ok(status) if status.value.ready => return Ok(()),
                    Ok(status) => info!("WebDriver not ready yet: {}", status.value.message),
                    Err(e) => warn!("Unreadable status response: {}", e),
                },
                Ok(resp) => {
                    warn!("Status check returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for WebDriver to start...");
                    }
                    // Connection refused is expected while the driver boots
                    if !e.is_connect() {
                        warn!("Status check error: {}", e);
                    }
                }
            }

            sleep(Duration::from_millis(100)).await;
        }

        Err(E2eError::DriverHealthCheck(attempts))
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Stop the driver
    pub fn stop(&mut self) -> E2eResult<()> {
        info!("Stopping WebDriver (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverHandle {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Find a free port to use
fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_find_free_port() {
        let port = find_free_port().unwrap();
        assert!(port > 1024);
    }

    #[test]
    fn test_status_response_parsing() {
        let body = r#"{"value":{"ready":true,"message":"ChromeDriver ready for new sessions."}}"#;
        let status: StatusResponse = serde_json::from_str(body).unwrap();
        assert!(status.value.ready);
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_start() {
        let config = DriverConfig {
            binary_path: PathBuf::from("/nonexistent/chromedriver"),
            port: Some(1),
            startup_timeout_secs: 1,
        };
        let result = DriverHandle::spawn(&config).await;
        assert!(matches!(result, Err(E2eError::DriverStartup(_))));
    }
}
