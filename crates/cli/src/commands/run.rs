//! Run the scenario suite

use std::path::PathBuf;
use clap::Args;
use tracing::info;

use parkcheck_e2e::{CaseFilter, TestRunner, WebDriverLauncher};

use super::ConfigArgs;
use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Run only cases with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Run only this case (`name`, `module::name`, or a module name)
    #[arg(short, long)]
    pub name: Option<String>,

    /// Output directory for results
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Returns whether every selected case passed.
pub async fn execute(args: RunArgs, format: OutputFormat) -> anyhow::Result<bool> {
    let mut config = args.config.load()?;
    if let Some(output) = args.output {
        config.report.output_dir = output;
    }

    info!(
        "Running suite against {} with {}",
        config.base_url,
        config.browser.kind.as_str()
    );

    let filter = CaseFilter {
        tag: args.tag,
        name: args.name,
    };
    let launcher = WebDriverLauncher::new(config.browser.clone());
    let runner = TestRunner::new(config, Box::new(launcher));

    if runner.list(&filter).is_empty() {
        anyhow::bail!("no cases match the given filter");
    }

    let mut suite = runner.run(&filter).await;
    let paths = runner.write_results(&mut suite)?;

    output::print_suite(&suite, format);
    if let OutputFormat::Table = format {
        output::print_info(&format!("Report: {}", paths.html.display()));
    }

    Ok(suite.success())
}
