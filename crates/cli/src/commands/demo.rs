//! Interactive browser smoke check

use clap::Args;
use tokio::io::BufReader;
use tracing::warn;

use parkcheck_e2e::demo::{run_demo, DemoOptions};
use parkcheck_e2e::{Launcher, WebDriverLauncher};

use super::ConfigArgs;

#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Page with the search box
    #[arg(long, default_value = "https://www.google.com")]
    pub url: String,

    /// Text typed into the search box
    #[arg(long, default_value = "hello world")]
    pub query: String,
}

pub async fn execute(args: DemoArgs) -> anyhow::Result<()> {
    let config = args.config.load()?;
    let launcher = WebDriverLauncher::new(config.browser.clone());

    let options = DemoOptions {
        url: args.url,
        query: args.query,
        wait: config.wait.long(),
        ..Default::default()
    };

    let outcome = match launcher.launch().await {
        Ok(browser) => run_demo(browser, &options, BufReader::new(tokio::io::stdin())).await,
        Err(e) => Err(e),
    };

    if let Err(e) = launcher.shutdown().await {
        warn!("Failed to stop browser service: {}", e);
    }
    outcome?;
    Ok(())
}
