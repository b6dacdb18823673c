//! CLI Commands

pub mod demo;
pub mod list;
pub mod run;

use std::path::PathBuf;
use anyhow::Context;
use clap::Args;
use parkcheck_e2e::SuiteConfig;

/// Suite configuration sources shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// TOML configuration file
    #[arg(long, env = "PARKCHECK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Site under test; must end with '/'
    #[arg(long)]
    pub base_url: Option<String>,

    /// Browser to drive (firefox, edge, chrome)
    #[arg(long)]
    pub browser: Option<String>,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Existing WebDriver endpoint; skips spawning a driver service
    #[arg(long)]
    pub webdriver_url: Option<String>,
}

impl ConfigArgs {
    /// File, then `PARKCHECK_*` environment, then flags.
    pub fn load(&self) -> anyhow::Result<SuiteConfig> {
        let mut config = SuiteConfig::load(self.config.as_deref()).with_context(|| match &self.config {
            Some(path) => format!("failed to load {}", path.display()),
            None => "invalid configuration".to_string(),
        })?;
        self.apply_to(&mut config)?;
        Ok(config)
    }

    /// Layer the command-line flags over `config` and validate the result.
    pub fn apply_to(&self, config: &mut SuiteConfig) -> anyhow::Result<()> {
        if let Some(url) = &self.base_url {
            config.base_url = url.clone();
        }
        if let Some(browser) = &self.browser {
            config.browser.kind = browser.parse()?;
        }
        if self.headless {
            config.browser.headless = true;
        }
        if let Some(url) = &self.webdriver_url {
            config.browser.webdriver_url = Some(url.clone());
        }

        config.validate()?;
        Ok(())
    }
}
