//! Page objects driven against in-memory pages

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{key, FakeElement, FakePage, Reveal};
use nepthic_e2e::browser::Target;
use nepthic_e2e::data::{messages, passwords, Credentials};
use nepthic_e2e::pages::{BasePage, HomePage, SignInPage, SignUpPage};
use nepthic_e2e::VerificationCode;

const BASE_URL: &str = "https://shop.test/";

fn base(page: &FakePage) -> BasePage {
    BasePage::new(Arc::new(page.clone()), BASE_URL)
}

#[tokio::test]
async fn test_sign_up_form_round_trips_values() {
    let page = FakePage::new();
    let sign_up = SignUpPage::new(base(&page));
    page.edit(|state| {
        for field in [
            &sign_up.full_name_input,
            &sign_up.username_input,
            &sign_up.email_input,
            &sign_up.phone_input,
            &sign_up.password_input,
            &sign_up.confirm_password_input,
            &sign_up.verification_code_input,
        ] {
            state.insert(field, FakeElement::visible());
        }
    });
    let credentials = Credentials::unique("signup");

    sign_up.navigate().await.unwrap();
    sign_up.fill_sign_up_form(&credentials).await.unwrap();
    sign_up
        .fill_verification_code(&VerificationCode::parse("042913").unwrap())
        .await
        .unwrap();

    assert_eq!(page.actions()[0], "goto:https://shop.test/sign-up");
    assert_eq!(sign_up.email_value().await.unwrap(), credentials.email);
    assert_eq!(sign_up.phone_value().await.unwrap(), credentials.phone);
    assert!(sign_up.verify_all_form_fields_visible().await.unwrap());
    assert_eq!(
        sign_up.base().value_of(&sign_up.verification_code_input).await.unwrap(),
        "042913"
    );
}

#[tokio::test]
async fn test_remember_me_check_is_idempotent() {
    let page = FakePage::new();
    let sign_in = SignInPage::new(base(&page));
    page.edit(|state| state.insert(&sign_in.remember_me_checkbox, FakeElement::visible()));

    sign_in.check_remember_me().await.unwrap();
    sign_in.check_remember_me().await.unwrap();
    assert!(sign_in.is_remember_me_checked().await.unwrap());

    sign_in.uncheck_remember_me().await.unwrap();
    assert!(!sign_in.is_remember_me_checked().await.unwrap());
    assert_eq!(
        page.state.lock().unwrap().clicks_on(&sign_in.remember_me_checkbox),
        2
    );
}

#[tokio::test]
async fn test_wait_for_url_times_out_with_last_url() {
    let mut page = FakePage::new();
    page.timeout = Duration::from_millis(50);
    let base = base(&page);
    base.goto("/sign-up").await.unwrap();

    let err = base.wait_for_url("sign-in").await.unwrap_err();

    assert!(err.is_timeout());
    assert!(err.to_string().contains("https://shop.test/sign-up"));
}

#[tokio::test]
async fn test_missing_section_is_reported_as_false() {
    let mut page = FakePage::new();
    page.timeout = Duration::from_millis(50);
    let home = HomePage::new(base(&page));
    page.edit(|state| state.insert(&home.hero_heading, FakeElement::visible()));

    assert!(home.verify_home_page_loaded().await.unwrap());
    assert!(home.welcome_message().await.unwrap().is_none());
    assert!(!home.base().appears(&home.logout_button, Duration::from_millis(50)).await.unwrap());
}

fn sign_up_form(page: &FakePage, sign_up: &SignUpPage) {
    page.edit(|state| {
        for field in [
            &sign_up.full_name_input,
            &sign_up.username_input,
            &sign_up.email_input,
            &sign_up.phone_input,
            &sign_up.password_input,
            &sign_up.confirm_password_input,
            &sign_up.submit_button,
        ] {
            state.insert(field, FakeElement::visible());
        }
    });
}

#[tokio::test]
async fn test_mismatched_passwords_show_validation_message() {
    let page = FakePage::new();
    let sign_up = SignUpPage::new(base(&page));
    sign_up_form(&page, &sign_up);
    page.edit(|state| {
        state.on_click(
            &sign_up.submit_button,
            Reveal {
                after_clicks: 1,
                elements: vec![(
                    key(&Target::text(messages::PASSWORD_MISMATCH)),
                    FakeElement::visible(),
                )],
                url: None,
            },
        )
    });
    let credentials = Credentials::unique("mismatch").with_mismatched_passwords();

    sign_up.fill_sign_up_form(&credentials).await.unwrap();
    sign_up.submit_sign_up().await.unwrap();

    assert_eq!(sign_up.confirm_password_value().await.unwrap(), passwords::MISMATCH);
    assert!(sign_up
        .verify_validation_message(messages::PASSWORD_MISMATCH)
        .await
        .unwrap());
    assert!(!sign_up
        .verify_validation_message(messages::PASSWORD_TOO_WEAK)
        .await
        .unwrap());
}

#[tokio::test]
async fn test_weak_password_fills_both_fields() {
    let page = FakePage::new();
    let sign_up = SignUpPage::new(base(&page));
    sign_up_form(&page, &sign_up);

    sign_up
        .fill_sign_up_form(&Credentials::unique("weak").with_weak_password())
        .await
        .unwrap();

    assert_eq!(
        sign_up.base().value_of(&sign_up.password_input).await.unwrap(),
        passwords::WEAK
    );
    assert_eq!(sign_up.confirm_password_value().await.unwrap(), passwords::WEAK);
}

#[tokio::test]
async fn test_toggle_theme_applies_theme_class() {
    let page = FakePage::new();
    let sign_in = SignInPage::new(base(&page));
    page.edit(|state| {
        state.insert(&sign_in.header.theme_toggle, FakeElement::visible());
        state.on_click(
            &sign_in.header.theme_toggle,
            Reveal {
                after_clicks: 1,
                elements: vec![(key(&sign_in.header.themed_root), FakeElement::attached())],
                url: None,
            },
        );
    });

    assert!(!sign_in.verify_theme_applied().await.unwrap());
    sign_in.toggle_theme().await.unwrap();

    assert!(sign_in.verify_theme_applied().await.unwrap());
    assert_eq!(page.actions(), [format!("click:{}", sign_in.header.theme_toggle)]);
}
