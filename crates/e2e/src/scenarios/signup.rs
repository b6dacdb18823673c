//! Signup form scenarios

use tracing::info;

use super::widgets::{select_dropdown_option, ClickMode};
use super::{Case, Outcome, ScenarioModule, Setup};
use crate::conditions::Match;
use crate::config::SuiteConfig;
use crate::driver::{Browser, By};
use crate::ensure;
use crate::error::E2eResult;
use crate::wait::{await_condition, Poll};

pub const SIGNUP_PATH: &str = "signup";
pub const TOAST_MESSAGE: &str = "p-toast-message";

pub fn submit_button() -> By {
    By::xpath("//button[normalize-space()='Submit']")
}

/// Email typed into the form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupEmail {
    /// Timestamped address that has never been registered
    Unique,
    Fixed(&'static str),
}

impl SignupEmail {
    pub fn resolve(&self) -> String {
        match self {
            SignupEmail::Unique => format!("testemail{}@example.com", chrono::Utc::now().timestamp()),
            SignupEmail::Fixed(email) => email.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SignupCase {
    pub label: &'static str,
    pub email: SignupEmail,
    pub user_name: &'static str,
    pub password: &'static str,
    pub office: Option<&'static str>,
    pub expect_submit_enabled: bool,
}

pub const SIGNUP_CASES: [SignupCase; 3] = [
    SignupCase {
        label: "valid signup",
        email: SignupEmail::Unique,
        user_name: "user1",
        password: "Password123!",
        office: Some("Samsung"),
        expect_submit_enabled: true,
    },
    SignupCase {
        label: "invalid email",
        email: SignupEmail::Fixed("userexample.com"),
        user_name: "user1",
        password: "Password123!",
        office: Some("Samsung"),
        expect_submit_enabled: false,
    },
    SignupCase {
        label: "missing office",
        email: SignupEmail::Fixed("user@example.com"),
        user_name: "user1",
        password: "Password123!",
        office: None,
        expect_submit_enabled: false,
    },
];

/// Pick an office by its exact label.
pub async fn select_office(browser: &Browser, config: &SuiteConfig, office: &str) -> E2eResult<()> {
    select_dropdown_option(
        browser,
        &Match::any().text(office),
        ClickMode::Native,
        config.wait.short(),
    )
    .await
}

pub async fn signup(browser: &Browser, config: &SuiteConfig, case: &SignupCase) -> E2eResult<Outcome> {
    let email = case.email.resolve();

    browser.find_element(&By::id("email")).await?.send_keys(&email).await?;
    browser.find_element(&By::id("userName")).await?.send_keys(case.user_name).await?;
    browser.find_element(&By::id("password")).await?.send_keys(case.password).await?;

    if let Some(office) = case.office {
        select_office(browser, config, office).await?;
    }

    let submit = browser.find_element(&submit_button()).await?;
    let enabled = submit.is_enabled().await?;
    ensure!(
        enabled == case.expect_submit_enabled,
        "submit enabled={} for '{}', expected {}",
        enabled,
        case.label,
        case.expect_submit_enabled
    );

    if case.expect_submit_enabled {
        submit.click().await?;

        let signup_url = config.url(SIGNUP_PATH);
        let signup_url = signup_url.as_str();
        await_condition(
            browser,
            config.wait.short(),
            "signup to leave the form or show a toast",
            move |browser: Browser| async move {
                let location = browser.location().await?;
                if location != signup_url {
                    return Ok(Poll::Ready(()));
                }
                let toasts = browser.find_elements(&By::class_name(TOAST_MESSAGE)).await?;
                Ok(if toasts.is_empty() {
                    Poll::Pending(format!("still at {} without a toast", location))
                } else {
                    Poll::Ready(())
                })
            },
        )
        .await?;
        info!("Signed up {}", email);
    }

    Ok(Outcome::Passed)
}

pub fn module() -> ScenarioModule {
    let cases = SIGNUP_CASES
        .into_iter()
        .map(|case| {
            Case::new(format!("signup[{}]", case.label), move |browser, config| async move {
                signup(&browser, &config, &case).await
            })
            .tag("signup")
        })
        .collect();

    ScenarioModule::new("signup", SIGNUP_PATH, Setup::fresh(SIGNUP_PATH), cases)
}
