//! Live suite entry point
//!
//! Runs the scenario suite against a real browser and the deployed app.
//! Skipped unless `PARKCHECK_LIVE=1`; the usual `PARKCHECK_*` variables
//! select the site, browser, and WebDriver endpoint.
//! Run with: PARKCHECK_LIVE=1 cargo test --package parkcheck-e2e --test live

use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use parkcheck_e2e::{CaseFilter, E2eResult, SuiteConfig, TestRunner, WebDriverLauncher};

fn main() {
    if std::env::var("PARKCHECK_LIVE").as_deref() != Ok("1") {
        println!("live suite skipped (set PARKCHECK_LIVE=1 to run)");
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    match rt.block_on(async_main()) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main() -> E2eResult<bool> {
    let config_path = std::env::var_os("PARKCHECK_CONFIG").map(PathBuf::from);
    let config = SuiteConfig::load(config_path.as_deref())?;

    let filter = CaseFilter {
        tag: std::env::var("PARKCHECK_TAG").ok(),
        name: std::env::var("PARKCHECK_CASE").ok(),
    };

    let launcher = WebDriverLauncher::new(config.browser.clone());
    let runner = TestRunner::new(config, Box::new(launcher));

    let mut suite = runner.run(&filter).await;
    runner.write_results(&mut suite)?;

    Ok(suite.success())
}
