//! Scenario suite for the parking web app
//!
//! Each [`ScenarioModule`] owns one browser session for all of its cases.
//! Before every case the module's [`Setup`] puts the page into a known
//! state; the case then drives the UI and asserts on the result.

use std::future::Future;
use std::sync::Arc;
use futures::future::BoxFuture;

use crate::config::SuiteConfig;
use crate::driver::Browser;
use crate::error::E2eResult;

pub mod login;
pub mod signup;
pub mod vehicles;
pub mod widgets;

/// How a case ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Passed,
    Skipped(String),
}

pub type CaseFuture = BoxFuture<'static, E2eResult<Outcome>>;
pub type CaseFn = Arc<dyn Fn(Browser, Arc<SuiteConfig>) -> CaseFuture + Send + Sync>;

/// One runnable test case
#[derive(Clone)]
pub struct Case {
    pub name: String,
    pub tags: Vec<String>,
    run: CaseFn,
}

impl Case {
    pub fn new<F, Fut>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Browser, Arc<SuiteConfig>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = E2eResult<Outcome>> + Send + 'static,
    {
        Self {
            name: name.into(),
            tags: Vec::new(),
            run: Arc::new(move |browser, config| Box::pin(body(browser, config))),
        }
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn run(&self, browser: Browser, config: Arc<SuiteConfig>) -> CaseFuture {
        (self.run)(browser, config)
    }
}

impl std::fmt::Debug for Case {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Case")
            .field("name", &self.name)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}

/// Per-case fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setup {
    /// Clear local storage and open a site path
    Fresh { path: String },
    /// `Fresh` at the site root, then sign in as the configured user and
    /// wait for the vehicles page to settle
    UserVehicles,
}

impl Setup {
    pub fn fresh(path: impl Into<String>) -> Self {
        Setup::Fresh { path: path.into() }
    }

    pub async fn apply(&self, browser: &Browser, config: &SuiteConfig) -> E2eResult<()> {
        match self {
            Setup::Fresh { path } => open_fresh(browser, config, path).await,
            Setup::UserVehicles => {
                open_fresh(browser, config, "").await?;
                vehicles::login_user(browser, config).await
            }
        }
    }
}

async fn open_fresh(browser: &Browser, config: &SuiteConfig, path: &str) -> E2eResult<()> {
    browser.clear_local_storage().await?;
    browser.goto(&config.url(path)).await
}

/// Cases sharing one browser session
#[derive(Debug, Clone)]
pub struct ScenarioModule {
    pub name: String,
    /// Path opened when the session starts
    pub start_path: String,
    pub setup: Setup,
    pub cases: Vec<Case>,
}

impl ScenarioModule {
    pub fn new(name: impl Into<String>, start_path: impl Into<String>, setup: Setup, cases: Vec<Case>) -> Self {
        Self {
            name: name.into(),
            start_path: start_path.into(),
            setup,
            cases,
        }
    }
}

/// The full suite, in execution order.
pub fn suite() -> Vec<ScenarioModule> {
    vec![login::module(), signup::module(), vehicles::module()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suite_lists_every_case_in_order() {
        let names: Vec<String> = suite()
            .iter()
            .flat_map(|m| m.cases.iter().map(move |c| format!("{}::{}", m.name, c.name)))
            .collect();

        assert_eq!(
            names,
            vec![
                "login::login[valid email]",
                "login::login[invalid email]",
                "login::admin_login",
                "signup::signup[valid signup]",
                "signup::signup[invalid email]",
                "signup::signup[missing office]",
                "vehicles::numberplate_length_validation",
                "vehicles::add_and_delete_vehicle",
                "vehicles::park_and_unpark_vehicle",
            ]
        );
    }
}
