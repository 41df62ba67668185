use crate::browser::Target;
use crate::code::VerificationCode;
use crate::data::Credentials;
use crate::error::E2eResult;
use crate::routes;

use super::{BasePage, Footer, Header};

/// Registration page, including the verification-code step shown after submit
pub struct SignUpPage {
    base: BasePage,
    pub header: Header,
    pub footer: Footer,

    pub heading: Target,
    pub sub_heading: Target,
    pub google_sign_up_button: Target,
    pub full_name_input: Target,
    pub username_input: Target,
    pub email_input: Target,
    pub email_hint: Target,
    pub phone_input: Target,
    pub password_input: Target,
    pub confirm_password_input: Target,
    pub submit_button: Target,
    pub sign_in_link: Target,

    pub verification_code_input: Target,
    pub verification_submit_button: Target,
}

impl SignUpPage {
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            header: Header::default(),
            footer: Footer::default(),
            heading: Target::role("heading").named("Join NEPTHIC"),
            sub_heading: Target::text("Create your account to get started"),
            google_sign_up_button: Target::role("button").named("Sign up with Google"),
            full_name_input: Target::css("input[name=\"fullName\"]"),
            username_input: Target::css("input[name=\"username\"]"),
            email_input: Target::css("input[name=\"email\"]"),
            email_hint: Target::text("Verification code will be sent"),
            phone_input: Target::css("input[name=\"phone\"]"),
            password_input: Target::css("input[name=\"password\"]"),
            confirm_password_input: Target::css("input[name=\"confirmPassword\"]"),
            submit_button: Target::xpath("//button[normalize-space(.)='Sign Up']"),
            sign_in_link: Target::role("link").named("Sign in"),
            verification_code_input: Target::role("textbox"),
            verification_submit_button: Target::role("button").named("Verify"),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.base.goto(routes::SIGN_UP).await
    }

    pub async fn fill_sign_up_form(&self, credentials: &Credentials) -> E2eResult<()> {
        self.base.fill(&self.full_name_input, &credentials.full_name).await?;
        self.base.fill(&self.username_input, &credentials.username).await?;
        self.base.fill(&self.email_input, &credentials.email).await?;
        self.base.fill(&self.phone_input, &credentials.phone).await?;
        self.base.fill(&self.password_input, &credentials.password).await?;
        self.base
            .fill(&self.confirm_password_input, &credentials.confirm_password)
            .await
    }

    pub async fn submit_sign_up(&self) -> E2eResult<()> {
        self.base.click(&self.submit_button).await
    }

    pub async fn fill_verification_code(&self, code: &VerificationCode) -> E2eResult<()> {
        self.base
            .fill(&self.verification_code_input, code.as_str())
            .await
    }

    pub async fn submit_verification_code(&self) -> E2eResult<()> {
        self.base.click(&self.verification_submit_button).await
    }

    pub async fn sign_up_with_google(&self) -> E2eResult<()> {
        self.base.click(&self.google_sign_up_button).await
    }

    pub async fn toggle_theme(&self) -> E2eResult<()> {
        self.base.click(&self.header.theme_toggle).await
    }

    pub async fn verify_theme_applied(&self) -> E2eResult<bool> {
        Ok(self.base.page().probe(&self.header.themed_root).await?.attached)
    }

    pub async fn click_sign_in_link(&self) -> E2eResult<()> {
        self.base.click(&self.sign_in_link).await
    }

    pub async fn verify_page_loaded(&self) -> E2eResult<bool> {
        self.base.is_visible(&self.heading).await
    }

    pub async fn verify_all_form_fields_visible(&self) -> E2eResult<bool> {
        self.base
            .all_visible(&[
                &self.full_name_input,
                &self.username_input,
                &self.email_input,
                &self.phone_input,
                &self.password_input,
                &self.confirm_password_input,
            ])
            .await
    }

    pub async fn verify_sign_up_button_enabled(&self) -> E2eResult<bool> {
        self.base.page().is_enabled(&self.submit_button).await
    }

    pub async fn verify_email_hint_displayed(&self) -> E2eResult<bool> {
        self.base.is_visible(&self.email_hint).await
    }

    pub async fn verify_footer_links_present(&self) -> E2eResult<bool> {
        self.base.all_visible(&self.footer.social_links()).await
    }

    /// Whether the form currently shows `message`, e.g. one of
    /// [`crate::data::messages`]
    pub async fn verify_validation_message(&self, message: &str) -> E2eResult<bool> {
        self.base.is_visible(&Target::text(message)).await
    }

    pub async fn confirm_password_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.confirm_password_input).await
    }

    pub async fn heading_text(&self) -> E2eResult<String> {
        self.base.text_of(&self.heading).await
    }

    pub async fn full_name_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.full_name_input).await
    }

    pub async fn username_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.username_input).await
    }

    pub async fn email_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.email_input).await
    }

    pub async fn phone_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.phone_input).await
    }
}
