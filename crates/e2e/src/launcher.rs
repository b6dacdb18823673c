//! Browser session acquisition

use std::sync::Arc;
use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::BrowserConfig;
use crate::driver::Browser;
use crate::error::E2eResult;
use crate::fake::FakeBrowser;
use crate::service::DriverService;
use crate::webdriver::WebDriverClient;

/// Source of browser sessions, one per scenario module
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> E2eResult<Browser>;

    /// Release anything held across sessions.
    async fn shutdown(&self) -> E2eResult<()> {
        Ok(())
    }
}

/// Opens WebDriver sessions, spawning the service on first use unless an
/// endpoint is configured.
pub struct WebDriverLauncher {
    config: BrowserConfig,
    service: Mutex<Option<DriverService>>,
}

impl WebDriverLauncher {
    pub fn new(config: BrowserConfig) -> Self {
        Self {
            config,
            service: Mutex::new(None),
        }
    }

    async fn endpoint(&self) -> E2eResult<String> {
        if let Some(url) = &self.config.webdriver_url {
            return Ok(url.clone());
        }

        let mut guard = self.service.lock().await;
        let service = match guard.take() {
            Some(service) => service,
            None => DriverService::spawn(&self.config).await?,
        };
        let endpoint = service.endpoint().to_string();
        *guard = Some(service);
        Ok(endpoint)
    }
}

#[async_trait]
impl Launcher for WebDriverLauncher {
    async fn launch(&self) -> E2eResult<Browser> {
        let endpoint = self.endpoint().await?;
        let client = WebDriverClient::connect(&endpoint, self.config.kind, self.config.headless).await?;
        Ok(Browser::new(Arc::new(client)))
    }

    /// Stop the spawned service, if any.
    async fn shutdown(&self) -> E2eResult<()> {
        if let Some(mut service) = self.service.lock().await.take() {
            service.stop()?;
        }
        Ok(())
    }
}

#[async_trait]
impl Launcher for FakeBrowser {
    async fn launch(&self) -> E2eResult<Browser> {
        Ok(self.browser())
    }
}
