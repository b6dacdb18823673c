//! Suite configuration
//!
//! Loaded from an optional TOML file, then overridden by `PARKCHECK_*`
//! environment variables. Every field has a default so an empty file is a
//! valid configuration.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::wait::WaitConfig;

/// Root configuration for a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiteConfig {
    /// Site root; paths such as `signup` are appended to it
    pub base_url: String,

    pub browser: BrowserConfig,

    pub wait: WaitSettings,

    pub credentials: Credentials,

    pub report: ReportConfig,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:4200/".to_string(),
            browser: BrowserConfig::default(),
            wait: WaitSettings::default(),
            credentials: Credentials::default(),
            report: ReportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    #[default]
    Firefox,
    Edge,
    Chrome,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "MicrosoftEdge",
            BrowserKind::Chrome => "chrome",
        }
    }

    /// WebDriver service binary for this browser
    pub fn driver_binary(&self) -> &'static str {
        match self {
            BrowserKind::Firefox => "geckodriver",
            BrowserKind::Edge => "msedgedriver",
            BrowserKind::Chrome => "chromedriver",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> E2eResult<Self> {
        match s.to_lowercase().as_str() {
            "firefox" => Ok(BrowserKind::Firefox),
            "edge" | "msedge" | "microsoftedge" => Ok(BrowserKind::Edge),
            "chrome" | "chromium" => Ok(BrowserKind::Chrome),
            other => Err(E2eError::InvalidConfig(format!("unsupported browser: {}", other))),
        }
    }
}

/// Browser and WebDriver service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,

    pub headless: bool,

    /// Existing WebDriver endpoint; when unset a service is spawned
    pub webdriver_url: Option<String>,

    /// Override for the WebDriver service binary
    pub driver_binary: Option<PathBuf>,

    pub startup_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Firefox,
            headless: false,
            webdriver_url: None,
            driver_binary: None,
            startup_timeout_ms: 30_000,
        }
    }
}

impl BrowserConfig {
    pub fn startup_timeout(&self) -> Duration {
        Duration::from_millis(self.startup_timeout_ms)
    }

    pub fn driver_binary(&self) -> PathBuf {
        self.driver_binary
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.kind.driver_binary()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSettings {
    pub timeout_ms: u64,

    /// Budget for slow transitions (overlays, list reloads)
    pub long_timeout_ms: u64,

    pub poll_interval_ms: u64,
}

impl Default for WaitSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            long_timeout_ms: 10_000,
            poll_interval_ms: 500,
        }
    }
}

impl WaitSettings {
    pub fn short(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }

    pub fn long(&self) -> WaitConfig {
        WaitConfig::new(
            Duration::from_millis(self.long_timeout_ms),
            Duration::from_millis(self.poll_interval_ms),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub user_email: String,
    pub user_password: String,
    pub admin_email: String,
    pub admin_password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user_email: "kaushik@a.com".to_string(),
            user_password: "123".to_string(),
            admin_email: "admin@a.com".to_string(),
            admin_password: "123".to_string(),
        }
    }
}

/// When the report sink asks the session for a screenshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotPolicy {
    #[default]
    OnFailure,
    Always,
    Never,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_dir: PathBuf,
    pub screenshots: ScreenshotPolicy,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("test-results"),
            screenshots: ScreenshotPolicy::OnFailure,
        }
    }
}

impl SuiteConfig {
    pub fn from_toml(content: &str) -> E2eResult<Self> {
        toml::from_str(content).map_err(E2eError::from)
    }

    /// Load from `path` (when given), apply environment overrides, validate.
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => {
                debug!("Loading suite config from {}", path.display());
                Self::from_toml(&std::fs::read_to_string(path)?)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PARKCHECK_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("PARKCHECK_BASE_URL") {
            self.base_url = url;
        }
        if let Some(kind) = lookup("PARKCHECK_BROWSER") {
            self.browser.kind = kind.parse()?;
        }
        if let Some(headless) = lookup("PARKCHECK_HEADLESS") {
            self.browser.headless = matches!(headless.to_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(url) = lookup("PARKCHECK_WEBDRIVER_URL") {
            self.browser.webdriver_url = Some(url);
        }
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !self.base_url.ends_with('/') {
            return Err(E2eError::InvalidConfig(format!(
                "base_url must end with '/': {}",
                self.base_url
            )));
        }
        if self.wait.timeout_ms == 0 || self.wait.long_timeout_ms == 0 {
            return Err(E2eError::InvalidConfig("wait timeouts must be positive".to_string()));
        }
        if self.wait.poll_interval_ms == 0 {
            return Err(E2eError::InvalidConfig("poll_interval_ms must be positive".to_string()));
        }
        Ok(())
    }

    /// `base_url` joined with a site path such as `user/vehicles`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn empty_file_is_default() {
        let config = SuiteConfig::from_toml("").unwrap();
        assert_eq!(config.base_url, "http://localhost:4200/");
        assert_eq!(config.wait.short().timeout, Duration::from_secs(5));
        assert_eq!(config.wait.long().timeout, Duration::from_secs(10));
        assert_eq!(config.report.screenshots, ScreenshotPolicy::OnFailure);
    }

    #[test]
    fn parse_partial_file() {
        let toml = r#"
base_url = "https://parking.example.com/"

[browser]
kind = "edge"
headless = true

[wait]
poll_interval_ms = 100

[report]
screenshots = "always"
"#;
        let config = SuiteConfig::from_toml(toml).unwrap();
        assert_eq!(config.browser.kind, BrowserKind::Edge);
        assert!(config.browser.headless);
        assert_eq!(config.wait.timeout_ms, 5_000);
        assert_eq!(config.wait.short().poll_interval, Duration::from_millis(100));
        assert_eq!(config.report.screenshots, ScreenshotPolicy::Always);
        assert_eq!(config.browser.driver_binary(), PathBuf::from("msedgedriver"));
    }

    #[test]
    fn env_overrides_file() {
        let mut config = SuiteConfig::default();
        config
            .apply_env(|key| match key {
                "PARKCHECK_BASE_URL" => Some("http://staging:8080/".to_string()),
                "PARKCHECK_HEADLESS" => Some("true".to_string()),
                "PARKCHECK_BROWSER" => Some("Chromium".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.base_url, "http://staging:8080/");
        assert!(config.browser.headless);
        assert_eq!(config.browser.kind, BrowserKind::Chrome);
    }

    #[test_case("http://localhost:4200" ; "missing trailing slash")]
    fn validate_rejects_base_url(url: &str) {
        let config = SuiteConfig {
            base_url: url.to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(E2eError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = SuiteConfig::default();
        config.wait.poll_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn url_joins_paths() {
        let config = SuiteConfig::default();
        assert_eq!(config.url("signup"), "http://localhost:4200/signup");
        assert_eq!(config.url("/user/vehicles"), "http://localhost:4200/user/vehicles");
    }
}
