//! Vehicle registration and parking scenarios

use std::time::Duration;
use tracing::{debug, info};

use super::login::fill_login_form;
use super::widgets::{select_dropdown_option, wait_for_loading_overlay, ClickMode};
use super::{Case, Outcome, ScenarioModule, Setup};
use crate::conditions::{
    find_first_matching, wait_for_absence, wait_for_count, wait_for_element, wait_for_location,
    wait_until_enabled, Match,
};
use crate::config::SuiteConfig;
use crate::driver::{Browser, By, Element};
use crate::ensure;
use crate::error::E2eResult;
use crate::wait::await_condition;

pub const VEHICLES_PATH: &str = "user/vehicles";

/// Register stays disabled this long for an invalid plate.
const INVALID_PLATE_WINDOW: Duration = Duration::from_secs(5);

pub fn numberplate_input() -> By {
    By::id("numberplate")
}

pub fn register_button() -> By {
    By::xpath("//button[normalize-space()='Register Vehicle']")
}

pub fn card_heading(plate: &str) -> By {
    By::xpath(format!("//h3[normalize-space()='{}']", plate))
}

fn card_button(plate: &str, button: &str) -> By {
    By::xpath(format!(
        "//h3[normalize-space()='{}']/ancestor::div[contains(@class,'card')]//button[normalize-space()='{}']",
        plate, button
    ))
}

pub fn park_button(plate: &str) -> By {
    card_button(plate, "Park")
}

pub fn unpark_button(plate: &str) -> By {
    card_button(plate, "Unpark")
}

pub fn delete_button(plate: &str) -> By {
    By::xpath(format!(
        "//h3[normalize-space()='{}']/ancestor::div[contains(@class,'card')]//button[contains(@class,'p-button-danger')]",
        plate
    ))
}

pub fn confirm_delete_button() -> By {
    By::xpath("//button[normalize-space()='Delete']")
}

/// Headings of existing vehicle cards
pub fn vehicle_headings() -> By {
    By::xpath("//h3[not(normalize-space()='Register Vehicle')]")
}

/// Plate unlikely to collide with earlier runs.
pub fn unique_plate(prefix: &str, digits: u32) -> String {
    let modulus = 10i64.pow(digits);
    let stamp = chrono::Utc::now().timestamp().rem_euclid(modulus);
    format!("{}{:0width$}", prefix, stamp, width = digits as usize)
}

/// Fixture: sign in as the configured user and wait for the vehicles page.
pub async fn login_user(browser: &Browser, config: &SuiteConfig) -> E2eResult<()> {
    let credentials = &config.credentials;
    let button = fill_login_form(browser, &credentials.user_email, &credentials.user_password).await?;
    button.click().await?;

    wait_for_location(browser, &config.url(VEHICLES_PATH), config.wait.short()).await?;
    wait_for_loading_overlay(browser, config.wait.long()).await?;
    wait_for_element(browser, &numberplate_input(), config.wait.long()).await?;
    Ok(())
}

pub async fn select_vehicle_type(browser: &Browser, config: &SuiteConfig, vehicle_type: &str) -> E2eResult<()> {
    wait_for_loading_overlay(browser, config.wait.long()).await?;
    select_dropdown_option(
        browser,
        &Match::any().displayed().text(vehicle_type),
        ClickMode::Script,
        config.wait.long(),
    )
    .await
}

/// Whether Register becomes enabled within `timeout`.
///
/// A timeout or a missing button reads as `false`; any other failure is
/// propagated.
pub async fn wait_register_enabled(browser: &Browser, config: &SuiteConfig, timeout: Duration) -> E2eResult<bool> {
    let attempt = async {
        wait_for_loading_overlay(browser, config.wait.long()).await?;
        await_condition(
            browser,
            config.wait.long().timeout(timeout),
            "register button to be enabled",
            |browser: Browser| async move {
                browser.find_element(&register_button()).await?.is_enabled().await
            },
        )
        .await
    };

    match attempt.await {
        Ok(_) => Ok(true),
        Err(err) if err.is_timeout_or_missing() => {
            debug!("register button not enabled: {}", err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

async fn type_plate(plate_input: &Element, plate: &str) -> E2eResult<()> {
    plate_input.clear().await?;
    plate_input.send_keys(plate).await
}

pub async fn wait_for_vehicle_card(browser: &Browser, config: &SuiteConfig, plate: &str) -> E2eResult<Element> {
    wait_for_element(browser, &card_heading(plate), config.wait.long()).await
}

/// Fill the form, register `plate`, and wait for its card.
pub async fn register_vehicle(
    browser: &Browser,
    config: &SuiteConfig,
    plate: &str,
    vehicle_type: &str,
) -> E2eResult<()> {
    let plate_input = browser.find_element(&numberplate_input()).await?;
    type_plate(&plate_input, plate).await?;
    select_vehicle_type(browser, config, vehicle_type).await?;

    let register = browser.find_element(&register_button()).await?;
    wait_until_enabled(&register, config.wait.long()).await?;
    register.click().await?;

    wait_for_vehicle_card(browser, config, plate).await?;
    info!("Registered vehicle {}", plate);
    Ok(())
}

pub async fn delete_vehicle(browser: &Browser, config: &SuiteConfig, plate: &str) -> E2eResult<()> {
    let delete = wait_for_element(browser, &delete_button(plate), config.wait.short()).await?;
    delete.click().await?;

    let confirm = find_first_matching(
        browser,
        &confirm_delete_button(),
        &Match::any().displayed(),
        config.wait.short(),
    )
    .await?;
    confirm.js_click().await?;

    wait_for_absence(browser, &card_heading(plate), config.wait.long()).await?;
    info!("Deleted vehicle {}", plate);
    Ok(())
}

pub async fn numberplate_length_validation(browser: &Browser, config: &SuiteConfig) -> E2eResult<Outcome> {
    let plate_input = browser.find_element(&numberplate_input()).await?;

    type_plate(&plate_input, "SHORT123").await?;
    select_vehicle_type(browser, config, "TwoWheeler").await?;
    ensure!(
        !wait_register_enabled(browser, config, INVALID_PLATE_WINDOW).await?,
        "register enabled for a plate that is too short"
    );

    type_plate(&plate_input, "KA01AB1234").await?;
    select_vehicle_type(browser, config, "TwoWheeler").await?;
    ensure!(
        wait_register_enabled(browser, config, config.wait.long().timeout).await?,
        "register stayed disabled for a valid plate"
    );

    Ok(Outcome::Passed)
}

pub async fn add_and_delete_vehicle(browser: &Browser, config: &SuiteConfig) -> E2eResult<Outcome> {
    let plate = unique_plate("KA", 8);
    register_vehicle(browser, config, &plate, "FourWheeler").await?;
    delete_vehicle(browser, config, &plate).await?;
    Ok(Outcome::Passed)
}

/// First existing card's plate, if any.
async fn existing_plate(browser: &Browser) -> E2eResult<Option<String>> {
    for heading in browser.find_elements(&vehicle_headings()).await? {
        let text = heading.text().await?;
        let text = text.trim();
        if !text.is_empty() {
            return Ok(Some(text.to_string()));
        }
    }
    Ok(None)
}

pub async fn park_and_unpark_vehicle(browser: &Browser, config: &SuiteConfig) -> E2eResult<Outcome> {
    let plate = match existing_plate(browser).await? {
        Some(plate) => plate,
        None => {
            let plate = unique_plate("AUTO", 6);
            register_vehicle(browser, config, &plate, "FourWheeler").await?;
            plate
        }
    };

    let park = browser.find_elements(&park_button(&plate)).await?;
    let unpark = browser.find_elements(&unpark_button(&plate)).await?;

    if park.is_empty() && unpark.is_empty() {
        return Ok(Outcome::Skipped(
            "No Park/Unpark button available for the vehicle card".to_string(),
        ));
    }

    if let Some(park) = park.first() {
        park.js_click().await?;
    }
    let unpark = wait_for_count(browser, &unpark_button(&plate), config.wait.long(), "presence of", |n| n > 0).await?;
    info!("Parked {}", plate);

    unpark[0].js_click().await?;
    wait_for_count(browser, &park_button(&plate), config.wait.long(), "presence of", |n| n > 0).await?;
    info!("Unparked {}", plate);

    Ok(Outcome::Passed)
}

pub fn module() -> ScenarioModule {
    let cases = vec![
        Case::new("numberplate_length_validation", |browser, config| async move {
            numberplate_length_validation(&browser, &config).await
        }),
        Case::new("add_and_delete_vehicle", |browser, config| async move {
            add_and_delete_vehicle(&browser, &config).await
        }),
        Case::new("park_and_unpark_vehicle", |browser, config| async move {
            park_and_unpark_vehicle(&browser, &config).await
        }),
    ]
    .into_iter()
    .map(|case| case.tag("vehicles"))
    .collect();

    ScenarioModule::new("vehicles", "", Setup::UserVehicles, cases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_plate_is_zero_padded() {
        let plate = unique_plate("AUTO", 6);
        assert!(plate.starts_with("AUTO"));
        assert_eq!(plate.len(), 10);
        assert!(plate[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn card_buttons_are_scoped_to_the_plate() {
        let By::XPath(expr) = park_button("KA01") else {
            panic!("expected xpath");
        };
        assert!(expr.starts_with("//h3[normalize-space()='KA01']"));
        assert!(expr.ends_with("//button[normalize-space()='Park']"));
    }
}
