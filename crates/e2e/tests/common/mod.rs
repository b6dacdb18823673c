//! Scripted model of the parking web app for scenario and runner tests
//!
//! Every page's widgets live on one fake page; the form rules mirror the
//! app's client-side validation closely enough for the scenarios to pass
//! or fail for the same reasons.

#![allow(dead_code)]

use parkcheck_e2e::driver::By;
use parkcheck_e2e::fake::{FakeBrowser, FakeElement, FakePage};
use parkcheck_e2e::scenarios::login::login_button;
use parkcheck_e2e::scenarios::signup::{submit_button, TOAST_MESSAGE};
use parkcheck_e2e::scenarios::vehicles::{
    card_heading, confirm_delete_button, delete_button, numberplate_input, park_button, register_button,
    unpark_button, vehicle_headings,
};
use parkcheck_e2e::scenarios::widgets::{dropdown, dropdown_options};
use parkcheck_e2e::SuiteConfig;

pub const BASE_URL: &str = "http://localhost:4200/";

const OPTIONS: [&str; 4] = ["Samsung", "Google", "TwoWheeler", "FourWheeler"];

pub fn config() -> SuiteConfig {
    SuiteConfig::default()
}

fn email_is_valid(email: &str) -> bool {
    match email.split_once('@') {
        Some((user, domain)) => !user.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn plate_is_valid(plate: &str) -> bool {
    plate.len() == 10
}

pub fn parking_app() -> FakeBrowser {
    let fake = FakeBrowser::new(BASE_URL);
    let config = config();
    let user_email = config.credentials.user_email.clone();
    let admin_email = config.credentials.admin_email.clone();

    fake.add(FakeElement::new("email").locator(By::id("email")));
    fake.add(FakeElement::new("password").locator(By::id("password")));
    fake.add(FakeElement::new("userName").locator(By::id("userName")));

    fake.add(
        FakeElement::new("login")
            .locator(login_button())
            .enabled_when(|page| email_is_valid(&page.value_of("email")) && !page.value_of("password").is_empty())
            .on_click(move |page| {
                let email = page.value_of("email");
                if email == admin_email {
                    page.location = format!("{}admin", BASE_URL);
                } else if email == user_email {
                    page.location = format!("{}user/vehicles", BASE_URL);
                }
            }),
    );

    fake.add(FakeElement::new("dropdown").locator(dropdown()).on_click(|page| {
        for option in OPTIONS {
            page.set_displayed(&option_id(option), true);
        }
    }));
    for option in OPTIONS {
        fake.add(
            FakeElement::new(option_id(option))
                .locator(dropdown_options())
                .text(option)
                .hidden()
                .on_click(move |page| {
                    if let Some(dropdown) = page.get_mut("dropdown") {
                        dropdown.value = option.to_string();
                    }
                    for other in OPTIONS {
                        page.set_displayed(&option_id(other), false);
                    }
                }),
        );
    }

    fake.add(
        FakeElement::new("submit")
            .locator(submit_button())
            .enabled_when(|page| {
                email_is_valid(&page.value_of("email"))
                    && !page.value_of("userName").is_empty()
                    && !page.value_of("password").is_empty()
                    && !page.value_of("dropdown").is_empty()
            })
            .on_click(|page| {
                page.add(FakeElement::new("toast").locator(By::class_name(TOAST_MESSAGE)).text("Signed up"));
            }),
    );

    fake.add(FakeElement::new("numberplate").locator(numberplate_input()));
    fake.add(
        FakeElement::new("register")
            .locator(register_button())
            .enabled_when(|page| plate_is_valid(&page.value_of("numberplate")) && !page.value_of("dropdown").is_empty())
            .on_click(|page| {
                let plate = page.value_of("numberplate");
                add_vehicle_card(page, &plate);
            }),
    );

    fake.add(
        FakeElement::new("confirm-delete")
            .locator(confirm_delete_button())
            .hidden()
            .on_click(|page| {
                let plate = page.value_of("confirm-delete");
                let prefix = card_prefix(&plate);
                page.retain(|e| !e.id.starts_with(&prefix));
                page.set_displayed("confirm-delete", false);
            }),
    );

    fake
}

fn option_id(option: &str) -> String {
    format!("option-{}", option)
}

fn card_prefix(plate: &str) -> String {
    format!("card-{}-", plate)
}

/// Card as the app renders it right after registration.
pub fn add_vehicle_card(page: &mut FakePage, plate: &str) {
    let prefix = card_prefix(plate);
    page.add(
        FakeElement::new(format!("{}heading", prefix))
            .locator(card_heading(plate))
            .locator(vehicle_headings())
            .text(plate),
    );

    let owner = plate.to_string();
    page.add(
        FakeElement::new(format!("{}delete", prefix))
            .locator(delete_button(plate))
            .on_click(move |page| {
                if let Some(confirm) = page.get_mut("confirm-delete") {
                    confirm.value = owner.clone();
                    confirm.displayed = true;
                }
            }),
    );
    page.add(park_element(plate));
}

fn park_element(plate: &str) -> FakeElement {
    let owner = plate.to_string();
    FakeElement::new(format!("{}park", card_prefix(plate)))
        .locator(park_button(plate))
        .on_click(move |page| {
            page.remove(&format!("{}park", card_prefix(&owner)));
            page.add(unpark_element(&owner));
        })
}

fn unpark_element(plate: &str) -> FakeElement {
    let owner = plate.to_string();
    FakeElement::new(format!("{}unpark", card_prefix(plate)))
        .locator(unpark_button(plate))
        .on_click(move |page| {
            page.remove(&format!("{}unpark", card_prefix(&owner)));
            page.add(park_element(&owner));
        })
}
