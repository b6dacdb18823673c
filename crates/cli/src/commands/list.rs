//! List the suite's cases

use clap::Args;

use parkcheck_e2e::{CaseFilter, SuiteConfig, TestRunner, WebDriverLauncher};

use crate::output::{self, OutputFormat};

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only cases with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Only cases matching this name
    #[arg(short, long)]
    pub name: Option<String>,
}

pub fn execute(args: ListArgs, format: OutputFormat) -> anyhow::Result<()> {
    let config = SuiteConfig::default();
    let runner = TestRunner::new(config.clone(), Box::new(WebDriverLauncher::new(config.browser)));

    let filter = CaseFilter {
        tag: args.tag,
        name: args.name,
    };
    output::print_list(&runner.list(&filter), format);
    Ok(())
}
