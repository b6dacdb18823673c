//! WebDriver service management - spawning and readiness polling

use std::process::{Child, Command, Stdio};
use std::time::Duration;
use serde_json::Value;
use tracing::{debug, info};

use crate::config::{BrowserConfig, BrowserKind};
use crate::error::{E2eError, E2eResult};
use crate::wait::{await_condition, Poll, WaitConfig};

/// Handle to a running WebDriver service process
pub struct DriverService {
    child: Child,
    pub endpoint: String,
    pub port: u16,
    stopped: bool,
}

impl DriverService {
    /// Spawn the WebDriver binary for `config.kind` and wait until it is ready.
    pub async fn spawn(config: &BrowserConfig) -> E2eResult<Self> {
        let port = find_free_port()?;
        let binary = config.driver_binary();
        let endpoint = format!("http://127.0.0.1:{}", port);

        info!("Spawning {} on port {}", binary.display(), port);

        let mut cmd = Command::new(&binary);
        cmd.args(port_args(config.kind, port))
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().map_err(|e| {
            E2eError::DriverStartup(format!("failed to spawn {}: {}", binary.display(), e))
        })?;

        let service = DriverService {
            child,
            endpoint: endpoint.clone(),
            port,
            stopped: false,
        };

        service.wait_until_ready(config.startup_timeout()).await?;

        info!("WebDriver service ready at {}", endpoint);
        Ok(service)
    }

    /// Poll `GET /status` until the service reports `ready`.
    async fn wait_until_ready(&self, timeout: Duration) -> E2eResult<()> {
        let status_url = format!("{}/status", self.endpoint);
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(2))
            .build()?;

        let config = WaitConfig::new(timeout, Duration::from_millis(100));
        let ready = await_condition(&client, config, "webdriver service ready", |client: reqwest::Client| {
            let status_url = status_url.clone();
            async move {
                match client.get(&status_url).send().await {
                    Ok(resp) => {
                        let body: Value = resp.json().await.unwrap_or(Value::Null);
                        Ok(if status_is_ready(&body) {
                            Poll::Ready(())
                        } else {
                            Poll::Pending(format!("status: {}", body))
                        })
                    }
                    // Connection refused is expected while the service starts
                    Err(e) => Ok(Poll::Pending(format!("status request failed: {}", e))),
                }
            }
        })
        .await;

        ready.map_err(|e| match e {
            E2eError::Timeout { polls, last_state, .. } => E2eError::DriverStartup(format!(
                "not ready after {} polls ({})",
                polls, last_state
            )),
            other => other,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Stop the service; later calls are no-ops.
    pub fn stop(&mut self) -> E2eResult<()> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        debug!("Stopping WebDriver service (pid: {})", self.child.id());

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            let pid = Pid::from_raw(self.child.id() as i32);
            if kill(pid, Signal::SIGTERM).is_ok() {
                std::thread::sleep(Duration::from_millis(200));
            }
        }

        let _ = self.child.kill();
        let _ = self.child.wait();

        Ok(())
    }
}

impl Drop for DriverService {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Command line selecting the listen port for each service flavour.
pub fn port_args(kind: BrowserKind, port: u16) -> Vec<String> {
    match kind {
        BrowserKind::Firefox => vec!["--port".to_string(), port.to_string()],
        BrowserKind::Edge | BrowserKind::Chrome => vec![format!("--port={}", port)],
    }
}

/// `/status` body reports readiness under `value.ready`.
pub fn status_is_ready(body: &Value) -> bool {
    body.pointer("/value/ready").and_then(Value::as_bool).unwrap_or(false)
}

/// Ask the OS for an unused port.
fn find_free_port() -> E2eResult<u16> {
    use std::net::TcpListener;

    let listener = TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}
