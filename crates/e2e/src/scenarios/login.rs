//! Login page scenarios

use tracing::info;

use super::{Case, Outcome, ScenarioModule, Setup};
use crate::conditions::wait_for_location;
use crate::config::SuiteConfig;
use crate::driver::{Browser, By, Element};
use crate::ensure;
use crate::error::E2eResult;

pub const LOGIN_BUTTON: &str =
    "/html[1]/body[1]/app-root[1]/main[1]/app-login[1]/div[1]/div[2]/div[1]/form[1]/p-button[1]/button[1]";

pub fn login_button() -> By {
    By::xpath(LOGIN_BUTTON)
}

/// (label, email override, button expected enabled); `None` uses the
/// configured user.
const LOGIN_CASES: [(&str, Option<&str>, bool); 2] = [
    ("valid email", None, true),
    ("invalid email", Some("kaushikacom"), false),
];

/// Type credentials into the login form and return its submit button.
pub async fn fill_login_form(browser: &Browser, email: &str, password: &str) -> E2eResult<Element> {
    browser.find_element(&By::id("email")).await?.send_keys(email).await?;
    browser.find_element(&By::id("password")).await?.send_keys(password).await?;
    browser.find_element(&login_button()).await
}

pub async fn login(
    browser: &Browser,
    config: &SuiteConfig,
    email: &str,
    password: &str,
    expect_enabled: bool,
) -> E2eResult<Outcome> {
    let button = fill_login_form(browser, email, password).await?;

    let enabled = button.is_enabled().await?;
    ensure!(
        enabled == expect_enabled,
        "login button enabled={} for '{}', expected {}",
        enabled,
        email,
        expect_enabled
    );

    if expect_enabled {
        button.click().await?;
        let location = wait_for_location(browser, &config.url("user"), config.wait.short()).await?;
        info!("Logged in, now at {}", location);
    }

    Ok(Outcome::Passed)
}

pub async fn admin_login(browser: &Browser, config: &SuiteConfig) -> E2eResult<Outcome> {
    let credentials = &config.credentials;
    let button = fill_login_form(browser, &credentials.admin_email, &credentials.admin_password).await?;

    ensure!(button.is_enabled().await?, "admin login button is disabled");

    button.click().await?;
    wait_for_location(browser, &config.url("admin"), config.wait.short()).await?;
    Ok(Outcome::Passed)
}

pub fn module() -> ScenarioModule {
    let mut cases: Vec<Case> = LOGIN_CASES
        .into_iter()
        .map(|(label, email, expect_enabled)| {
            Case::new(format!("login[{}]", label), move |browser, config| async move {
                let email = email
                    .map(str::to_string)
                    .unwrap_or_else(|| config.credentials.user_email.clone());
                let password = config.credentials.user_password.clone();
                login(&browser, &config, &email, &password, expect_enabled).await
            })
            .tag("auth")
        })
        .collect();

    cases.push(
        Case::new("admin_login", |browser, config| async move {
            admin_login(&browser, &config).await
        })
        .tag("auth")
        .tag("admin"),
    );

    ScenarioModule::new("login", "", Setup::fresh(""), cases)
}
