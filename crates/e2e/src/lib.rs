//! Parkcheck E2E Test Framework
//!
//! This crate drives the parking web app through a real browser and keeps
//! every UI interaction synchronised with the page:
//! - Talks W3C WebDriver to geckodriver, msedgedriver, or chromedriver
//! - Spawns the driver service as a subprocess when no endpoint is given
//! - Polls UI conditions (locations, elements, enabled state) with bounded waits
//! - Runs the login, signup, and vehicle scenarios, one session per module
//! - Writes JSON and HTML reports with screenshots of failed cases
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── Launcher::launch() -> Browser                        │
//! │    ├── Setup::apply() (fresh storage, optional sign-in)     │
//! │    ├── Case::run(browser, config) -> Outcome                │
//! │    └── ReportWriter::write(suite) -> json + html            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Synchronizer                                               │
//! │    ├── await_condition(snapshot, config, predicate)         │
//! │    └── conditions: element, location, enabled, count, ...   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Driver (trait)                                             │
//! │    ├── WebDriverClient  (HTTP, one session)                 │
//! │    └── FakeBrowser      (scripted, in memory)               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod conditions;
pub mod config;
pub mod demo;
pub mod driver;
pub mod error;
pub mod fake;
pub mod launcher;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod service;
pub mod wait;
pub mod webdriver;

pub use config::SuiteConfig;
pub use driver::{Browser, By, Element};
pub use error::{E2eError, E2eResult};
pub use launcher::{Launcher, WebDriverLauncher};
pub use runner::{CaseFilter, TestRunner};
pub use wait::{await_condition, Poll, WaitConfig};
