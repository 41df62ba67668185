use crate::browser::Target;
use crate::error::E2eResult;
use crate::routes;

use super::{BasePage, Footer, Header};

pub struct SignInPage {
    base: BasePage,
    pub header: Header,
    pub footer: Footer,

    pub heading: Target,
    pub google_sign_in_button: Target,
    pub email_input: Target,
    pub password_input: Target,
    pub remember_me_checkbox: Target,
    pub forgot_password_link: Target,
    pub submit_button: Target,
    pub sign_up_link: Target,
}

impl SignInPage {
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            header: Header::default(),
            footer: Footer::default(),
            heading: Target::xpath(
                "//*[self::h1 or self::h2 or self::h3][contains(normalize-space(.), 'Sign In') or contains(normalize-space(.), 'Login')]",
            ),
            google_sign_in_button: Target::role("button").named("Sign in with Google"),
            email_input: Target::css("input[placeholder=\"Enter your email or username\"]"),
            password_input: Target::css("input[type=\"password\"]"),
            remember_me_checkbox: Target::css("input[type=\"checkbox\"]"),
            forgot_password_link: Target::css("a[href*=\"forgot-password\"]"),
            submit_button: Target::css("button[type=\"submit\"]").last(),
            sign_up_link: Target::role("link").named("Sign up"),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.base.goto(routes::SIGN_IN).await
    }

    pub async fn fill_sign_in_form(&self, email: &str, password: &str) -> E2eResult<()> {
        self.base.fill(&self.email_input, email).await?;
        self.base.fill(&self.password_input, password).await
    }

    pub async fn submit_sign_in(&self) -> E2eResult<()> {
        self.base.click(&self.submit_button).await
    }

    /// Fill the form, optionally tick "Remember me", and submit
    pub async fn sign_in(&self, email: &str, password: &str, remember_me: bool) -> E2eResult<()> {
        self.fill_sign_in_form(email, password).await?;
        if remember_me {
            self.check_remember_me().await?;
        }
        self.submit_sign_in().await
    }

    pub async fn is_remember_me_checked(&self) -> E2eResult<bool> {
        self.base.page().is_checked(&self.remember_me_checkbox).await
    }

    pub async fn check_remember_me(&self) -> E2eResult<()> {
        if !self.is_remember_me_checked().await? {
            self.base.click(&self.remember_me_checkbox).await?;
        }
        Ok(())
    }

    pub async fn uncheck_remember_me(&self) -> E2eResult<()> {
        if self.is_remember_me_checked().await? {
            self.base.click(&self.remember_me_checkbox).await?;
        }
        Ok(())
    }

    pub async fn click_forgot_password(&self) -> E2eResult<()> {
        self.base.click(&self.forgot_password_link).await
    }

    pub async fn toggle_theme(&self) -> E2eResult<()> {
        self.base.click(&self.header.theme_toggle).await
    }

    pub async fn verify_theme_applied(&self) -> E2eResult<bool> {
        Ok(self.base.page().probe(&self.header.themed_root).await?.attached)
    }

    pub async fn click_sign_up_link(&self) -> E2eResult<()> {
        self.base.click(&self.sign_up_link).await
    }

    pub async fn verify_page_loaded(&self) -> E2eResult<bool> {
        self.base.is_visible(&self.heading).await
    }

    pub async fn verify_all_form_fields_visible(&self) -> E2eResult<bool> {
        self.base
            .all_visible(&[&self.email_input, &self.password_input, &self.submit_button])
            .await
    }

    pub async fn verify_sign_in_button_enabled(&self) -> E2eResult<bool> {
        self.base.page().is_enabled(&self.submit_button).await
    }

    pub async fn verify_footer_links_present(&self) -> E2eResult<bool> {
        self.base.all_visible(&self.footer.social_links()).await
    }

    pub async fn email_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.email_input).await
    }

    pub async fn password_value(&self) -> E2eResult<String> {
        self.base.value_of(&self.password_input).await
    }
}
