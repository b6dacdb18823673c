//! Main test runner that orchestrates sessions, scenarios, and reporting

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::config::{ScreenshotPolicy, SuiteConfig};
use crate::driver::Browser;
use crate::error::E2eResult;
use crate::launcher::Launcher;
use crate::report::{Attachment, ReportPaths, ReportWriter, Status, SuiteResult, TestResult};
use crate::scenarios::{self, Case, Outcome, ScenarioModule};

/// Case selection
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    pub tag: Option<String>,
    /// Case name, `module::case`, or a parametrised case's base name
    pub name: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, module: &str, case: &Case) -> bool {
        if let Some(tag) = &self.tag {
            if !case.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(name) = &self.name {
            let qualified = format!("{}::{}", module, case.name);
            let base = case.name.split('[').next().unwrap_or(&case.name);
            if name != &qualified && name != &case.name && name != base && name != module {
                return false;
            }
        }
        true
    }
}

/// Listing entry
#[derive(Debug, Clone, Serialize)]
pub struct CaseInfo {
    pub module: String,
    pub name: String,
    pub tags: Vec<String>,
}

/// Main E2E test runner
pub struct TestRunner {
    config: Arc<SuiteConfig>,
    launcher: Box<dyn Launcher>,
    modules: Vec<ScenarioModule>,
}

impl TestRunner {
    /// Runner over the full scenario suite
    pub fn new(config: SuiteConfig, launcher: Box<dyn Launcher>) -> Self {
        Self::with_modules(config, launcher, scenarios::suite())
    }

    pub fn with_modules(config: SuiteConfig, launcher: Box<dyn Launcher>, modules: Vec<ScenarioModule>) -> Self {
        Self {
            config: Arc::new(config),
            launcher,
            modules,
        }
    }

    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    pub fn list(&self, filter: &CaseFilter) -> Vec<CaseInfo> {
        self.modules
            .iter()
            .flat_map(|module| {
                module
                    .cases
                    .iter()
                    .filter(move |case| filter.matches(&module.name, case))
                    .map(move |case| CaseInfo {
                        module: module.name.clone(),
                        name: case.name.clone(),
                        tags: case.tags.clone(),
                    })
            })
            .collect()
    }

    /// Run every selected case, module by module.
    pub async fn run(&self, filter: &CaseFilter) -> SuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();

        for module in &self.modules {
            let selected: Vec<&Case> = module
                .cases
                .iter()
                .filter(|case| filter.matches(&module.name, case))
                .collect();
            if selected.is_empty() {
                continue;
            }

            info!("Running {} case(s) from {}", selected.len(), module.name);
            self.run_module(module, &selected, &mut results).await;
        }

        if let Err(e) = self.launcher.shutdown().await {
            warn!("Failed to stop browser service: {}", e);
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let suite = SuiteResult::from_results(started_at, duration_ms, results);

        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            suite.passed, suite.failed, suite.skipped, suite.duration_ms
        );
        suite
    }

    /// One session for the whole module, released on every exit path.
    async fn run_module(&self, module: &ScenarioModule, cases: &[&Case], results: &mut Vec<TestResult>) {
        let browser = match self.launcher.launch().await {
            Ok(browser) => browser,
            Err(e) => {
                error!("✗ {} - session setup failed: {}", module.name, e);
                for case in cases {
                    results.push(failed_without_session(module, case, &e.to_string()));
                }
                return;
            }
        };

        if let Err(e) = browser.goto(&self.config.url(&module.start_path)).await {
            warn!("Could not open start page for {}: {}", module.name, e);
        }

        for case in cases {
            let result = self.run_case(&browser, module, case).await;
            match result.status {
                Status::Passed => info!("✓ {} ({} ms)", result.qualified_name(), result.duration_ms),
                Status::Skipped => info!(
                    "- {} skipped: {}",
                    result.qualified_name(),
                    result.error.as_deref().unwrap_or("")
                ),
                Status::Failed => error!(
                    "✗ {} - {}",
                    result.qualified_name(),
                    result.error.as_deref().unwrap_or("unknown error")
                ),
            }
            results.push(result);
        }

        if let Err(e) = browser.quit().await {
            warn!("Failed to close session for {}: {}", module.name, e);
        }
    }

    async fn run_case(&self, browser: &Browser, module: &ScenarioModule, case: &Case) -> TestResult {
        let start = Instant::now();
        debug!("Running test: {}::{}", module.name, case.name);

        let body = async {
            module.setup.apply(browser, &self.config).await?;
            case.run(browser.clone(), Arc::clone(&self.config)).await
        };

        let (status, error) = match AssertUnwindSafe(body).catch_unwind().await {
            Ok(Ok(Outcome::Passed)) => (Status::Passed, None),
            Ok(Ok(Outcome::Skipped(reason))) => (Status::Skipped, Some(reason)),
            Ok(Err(e)) => (Status::Failed, Some(e.to_string())),
            Err(panic) => (Status::Failed, Some(format!("panicked: {}", panic_message(&panic)))),
        };

        let mut result = TestResult {
            module: module.name.clone(),
            name: case.name.clone(),
            status,
            duration_ms: start.elapsed().as_millis() as u64,
            error,
            location: None,
            screenshot: None,
        };

        self.attach_diagnostics(browser, &mut result).await;
        result
    }

    /// Ask the live session for its location and a screenshot.
    async fn attach_diagnostics(&self, browser: &Browser, result: &mut TestResult) {
        let failed = result.status == Status::Failed;
        let capture = match self.config.report.screenshots {
            ScreenshotPolicy::Always => true,
            ScreenshotPolicy::OnFailure => failed,
            ScreenshotPolicy::Never => false,
        };

        if failed {
            match browser.location().await {
                Ok(location) => result.location = Some(location),
                Err(e) => warn!("Could not read location after failure: {}", e),
            }
        }

        if capture {
            match browser.screenshot_base64().await.and_then(Attachment::png) {
                Ok(attachment) => result.screenshot = Some(attachment),
                Err(e) => warn!("Could not capture screenshot for {}: {}", result.qualified_name(), e),
            }
        }
    }

    /// Write test results to the configured output directory
    pub fn write_results(&self, suite: &mut SuiteResult) -> E2eResult<ReportPaths> {
        ReportWriter::new(&self.config.report.output_dir).write(suite)
    }
}

fn failed_without_session(module: &ScenarioModule, case: &Case, reason: &str) -> TestResult {
    TestResult {
        module: module.name.clone(),
        name: case.name.clone(),
        status: Status::Failed,
        duration_ms: 0,
        error: Some(format!("session setup failed: {}", reason)),
        location: None,
        screenshot: None,
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(name: &str, tags: &[&str]) -> Case {
        tags.iter().fold(
            Case::new(name, |_, _| async { Ok(Outcome::Passed) }),
            |case, tag| case.tag(*tag),
        )
    }

    #[test]
    fn filter_by_tag() {
        let filter = CaseFilter {
            tag: Some("auth".into()),
            name: None,
        };
        assert!(filter.matches("login", &case("admin_login", &["auth", "admin"])));
        assert!(!filter.matches("signup", &case("signup[valid signup]", &["signup"])));
    }

    #[test]
    fn filter_by_name_forms() {
        let c = case("login[valid email]", &[]);
        for name in ["login[valid email]", "login::login[valid email]", "login"] {
            let filter = CaseFilter {
                tag: None,
                name: Some(name.into()),
            };
            assert!(filter.matches("login", &c), "{} should match", name);
        }
        let filter = CaseFilter {
            tag: None,
            name: Some("admin_login".into()),
        };
        assert!(!filter.matches("login", &c));
    }
}
