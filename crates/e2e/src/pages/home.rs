use std::time::Duration;

use crate::browser::Target;
use crate::error::E2eResult;
use crate::routes;

use super::{BasePage, Footer, Header};

const SECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Landing page
pub struct HomePage {
    base: BasePage,
    pub header: Header,
    pub footer: Footer,

    pub profile_button: Target,
    pub logout_button: Target,
    pub welcome_text: Target,

    pub hero_heading: Target,
    pub hero_canvas: Target,
    pub shop_latest_drop_button: Target,

    pub latest_drops_heading: Target,
    pub no_products_message: Target,

    pub newsletter_heading: Target,
    pub newsletter_email_input: Target,
    pub subscribe_button: Target,
}

impl HomePage {
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            header: Header::default(),
            footer: Footer::default(),
            profile_button: Target::css("a[href=\"/profile\"] button"),
            logout_button: Target::role("button").named("Logout"),
            welcome_text: Target::text("Welcome,"),
            hero_heading: Target::xpath("//h1[normalize-space(.)='NEPTHIC']"),
            hero_canvas: Target::css("section canvas"),
            shop_latest_drop_button: Target::xpath("//a[contains(normalize-space(.), 'Shop Latest Drop')]//button"),
            latest_drops_heading: Target::role("heading").named("Latest Drops"),
            no_products_message: Target::text("No products available at the moment"),
            newsletter_heading: Target::role("heading").named("Stay Updated"),
            newsletter_email_input: Target::xpath(
                "//section[.//*[contains(normalize-space(.), 'Stay Updated')]]//input[@type='email']",
            ),
            subscribe_button: Target::role("button").named("Subscribe"),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.base.goto(routes::HOME).await
    }

    pub async fn verify_home_page_loaded(&self) -> E2eResult<bool> {
        self.base.appears(&self.hero_heading, SECTION_TIMEOUT).await
    }

    pub async fn verify_all_sections_visible(&self) -> E2eResult<bool> {
        for section in [
            &self.hero_heading,
            &self.latest_drops_heading,
            &self.newsletter_heading,
            &self.footer.footer,
        ] {
            if !self.base.appears(section, SECTION_TIMEOUT).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn verify_logout_button_visible(&self) -> E2eResult<bool> {
        self.base.appears(&self.logout_button, SECTION_TIMEOUT).await
    }

    pub async fn is_user_logged_in(&self) -> E2eResult<bool> {
        self.base.appears(&self.welcome_text, Duration::from_secs(3)).await
    }

    pub async fn welcome_message(&self) -> E2eResult<Option<String>> {
        if self.base.is_visible(&self.welcome_text).await? {
            Ok(Some(self.base.text_of(&self.welcome_text).await?))
        } else {
            Ok(None)
        }
    }

    pub async fn is_no_products_message_displayed(&self) -> E2eResult<bool> {
        self.base.appears(&self.no_products_message, Duration::from_secs(3)).await
    }

    pub async fn subscribe_newsletter(&self, email: &str) -> E2eResult<()> {
        self.base.fill(&self.newsletter_email_input, email).await?;
        self.base.click(&self.subscribe_button).await
    }

    pub async fn click_profile_button(&self) -> E2eResult<()> {
        self.base.click(&self.profile_button).await
    }

    pub async fn click_logout(&self) -> E2eResult<()> {
        self.base.click(&self.logout_button).await
    }

    pub async fn click_shop_latest_drop(&self) -> E2eResult<()> {
        self.base.click(&self.shop_latest_drop_button).await
    }

    pub async fn click_drops_link(&self) -> E2eResult<()> {
        self.base.click(&self.header.drops_link).await
    }

    pub async fn click_collections_link(&self) -> E2eResult<()> {
        self.base.click(&self.header.collections_link).await
    }

    pub async fn click_about_link(&self) -> E2eResult<()> {
        self.base.click(&self.header.about_link).await
    }

    pub async fn toggle_theme(&self) -> E2eResult<()> {
        self.base.click(&self.header.theme_toggle).await
    }
}
