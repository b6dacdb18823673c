//! Scenario suite against the scripted parking app

mod common;

use std::time::Duration;
use tokio::time::Instant;

use parkcheck_e2e::report::Status;
use parkcheck_e2e::scenarios::{self, login, signup, vehicles, Outcome, Setup};
use parkcheck_e2e::{CaseFilter, E2eError, TestRunner};

use common::{config, parking_app, BASE_URL};

async fn run_module(module: scenarios::ScenarioModule) -> Vec<(String, Status, Option<String>)> {
    let fake = parking_app();
    let runner = TestRunner::with_modules(config(), Box::new(fake), vec![module]);
    let suite = runner.run(&CaseFilter::default()).await;
    suite
        .results
        .into_iter()
        .map(|r| (r.name, r.status, r.error))
        .collect()
}

fn assert_all_passed(results: &[(String, Status, Option<String>)]) {
    for (name, status, error) in results {
        assert_eq!(*status, Status::Passed, "{} failed: {:?}", name, error);
    }
}

#[tokio::test(start_paused = true)]
async fn login_module_passes() {
    let results = run_module(login::module()).await;
    assert_eq!(results.len(), 3);
    assert_all_passed(&results);
}

#[tokio::test(start_paused = true)]
async fn signup_module_passes() {
    let results = run_module(signup::module()).await;
    assert_eq!(results.len(), 3);
    assert_all_passed(&results);
}

#[tokio::test(start_paused = true)]
async fn vehicles_module_passes() {
    let results = run_module(vehicles::module()).await;
    assert_eq!(results.len(), 3);
    assert_all_passed(&results);
}

#[tokio::test(start_paused = true)]
async fn valid_login_lands_on_user_area() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::fresh("").apply(&browser, &config).await.unwrap();

    let outcome = login::login(&browser, &config, "kaushik@a.com", "123", true).await.unwrap();

    assert_eq!(outcome, Outcome::Passed);
    assert!(browser.location().await.unwrap().starts_with(&format!("{}user", BASE_URL)));
    assert_eq!(fake.with_page(|page| page.local_storage_clears), 1);
}

#[tokio::test(start_paused = true)]
async fn login_expectation_mismatch_is_an_assertion_failure() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::fresh("").apply(&browser, &config).await.unwrap();

    let err = login::login(&browser, &config, "kaushikacom", "123", true).await.unwrap_err();
    assert!(matches!(err, E2eError::AssertionFailed(_)), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn login_that_never_redirects_times_out() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::fresh("").apply(&browser, &config).await.unwrap();

    let start = Instant::now();
    let err = login::login(&browser, &config, "nobody@a.com", "123", true).await.unwrap_err();

    assert!(matches!(err, E2eError::Timeout { .. }), "{:?}", err);
    assert!(start.elapsed() >= config.wait.short().timeout);
}

#[tokio::test(start_paused = true)]
async fn signup_office_is_chosen_from_a_late_dropdown() {
    let fake = parking_app();
    fake.with_page(|page| page.remove("option-Samsung"));
    fake.schedule(Duration::from_millis(500), |page| {
        page.add(
            parkcheck_e2e::fake::FakeElement::new("option-Samsung")
                .locator(parkcheck_e2e::scenarios::widgets::dropdown_options())
                .text("Samsung")
                .on_click(|page| {
                    if let Some(dropdown) = page.get_mut("dropdown") {
                        dropdown.value = "Samsung".to_string();
                    }
                    for option in ["Samsung", "Google", "TwoWheeler", "FourWheeler"] {
                        page.set_displayed(&format!("option-{}", option), false);
                    }
                }),
        );
    });

    let browser = fake.browser();
    let config = config();
    signup::select_office(&browser, &config, "Samsung").await.unwrap();
    assert_eq!(fake.with_page(|page| page.value_of("dropdown")), "Samsung");
}

#[tokio::test(start_paused = true)]
async fn short_plate_keeps_register_disabled_for_the_whole_window() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::UserVehicles.apply(&browser, &config).await.unwrap();

    let input = browser.find_element(&vehicles::numberplate_input()).await.unwrap();
    input.send_keys("SHORT123").await.unwrap();
    vehicles::select_vehicle_type(&browser, &config, "TwoWheeler").await.unwrap();

    let start = Instant::now();
    let enabled = vehicles::wait_register_enabled(&browser, &config, Duration::from_secs(5))
        .await
        .unwrap();

    assert!(!enabled);
    assert!(start.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn register_wait_propagates_session_faults() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::UserVehicles.apply(&browser, &config).await.unwrap();

    fake.fault("browser crashed");
    let err = vehicles::wait_register_enabled(&browser, &config, Duration::from_secs(5))
        .await
        .unwrap_err();
    assert!(matches!(err, E2eError::Faulted { .. }), "{:?}", err);
}

#[tokio::test(start_paused = true)]
async fn park_without_buttons_is_skipped() {
    let fake = parking_app();
    let browser = fake.browser();
    let config = config();
    Setup::UserVehicles.apply(&browser, &config).await.unwrap();

    fake.with_page(|page| {
        page.add(
            parkcheck_e2e::fake::FakeElement::new("legacy-card")
                .locator(vehicles::vehicle_headings())
                .text("OLD0000001"),
        );
    });

    let outcome = vehicles::park_and_unpark_vehicle(&browser, &config).await.unwrap();
    assert!(matches!(outcome, Outcome::Skipped(_)));
}

#[tokio::test(start_paused = true)]
async fn tag_filter_selects_admin_only() {
    let fake = parking_app();
    let runner = TestRunner::new(config(), Box::new(fake.clone()));
    let filter = CaseFilter {
        tag: Some("admin".to_string()),
        name: None,
    };

    let listed = runner.list(&filter);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "admin_login");

    let suite = runner.run(&filter).await;
    assert_eq!(suite.total, 1);
    assert!(suite.success());
    assert!(fake.with_page(|page| page.location.ends_with("admin")));
}
