use std::time::Duration;

use crate::browser::Target;
use crate::error::E2eResult;
use crate::routes;

use super::BasePage;

pub struct ProfilePage {
    base: BasePage,
    pub heading: Target,
    pub sub_heading: Target,
    pub full_name_input: Target,
    pub username_input: Target,
    pub phone_input: Target,
    pub email_input: Target,
    pub role_input: Target,
    pub update_profile_button: Target,
    pub profile_button: Target,
    pub orders_tab: Target,
    pub favorites_tab: Target,
}

impl ProfilePage {
    pub fn new(base: BasePage) -> Self {
        Self {
            base,
            heading: Target::role("heading").named("Personal Information"),
            sub_heading: Target::text("Update your personal details and account information"),
            full_name_input: Target::css("input#name"),
            username_input: Target::css("input#username"),
            phone_input: Target::css("input#phone"),
            email_input: Target::css("input#email"),
            role_input: Target::css("input#role"),
            update_profile_button: Target::role("button").named("Update Profile"),
            profile_button: Target::css("a[href=\"/profile\"] button"),
            orders_tab: Target::role("button").named("Orders"),
            favorites_tab: Target::role("button").named("Favorites"),
        }
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub async fn navigate(&self) -> E2eResult<()> {
        self.base.goto(routes::PROFILE).await
    }

    /// Reach the profile through the header button rather than the URL
    pub async fn go_to_profile_page(&self) -> E2eResult<()> {
        self.base.click(&self.profile_button).await
    }

    pub async fn verify_profile_page_loaded(&self) -> E2eResult<bool> {
        let timeout = Duration::from_secs(5);
        Ok(self.base.appears(&self.heading, timeout).await?
            && self.base.appears(&self.sub_heading, timeout).await?)
    }

    pub async fn verify_all_form_fields_visible(&self) -> E2eResult<bool> {
        let timeout = self.base.page().default_timeout();
        for field in [
            &self.full_name_input,
            &self.username_input,
            &self.phone_input,
            &self.email_input,
            &self.role_input,
            &self.update_profile_button,
        ] {
            if !self.base.appears(field, timeout).await? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    pub async fn full_name(&self) -> E2eResult<String> {
        self.base.value_of(&self.full_name_input).await
    }

    pub async fn username(&self) -> E2eResult<String> {
        self.base.value_of(&self.username_input).await
    }

    pub async fn email(&self) -> E2eResult<String> {
        self.base.value_of(&self.email_input).await
    }

    pub async fn update_profile(&self, full_name: &str, username: &str, phone: &str) -> E2eResult<()> {
        self.base.fill(&self.full_name_input, full_name).await?;
        self.base.fill(&self.phone_input, phone).await?;
        self.base.fill(&self.username_input, username).await?;
        self.base.click(&self.update_profile_button).await
    }

    pub async fn open_orders(&self) -> E2eResult<()> {
        self.base.click(&self.orders_tab).await
    }

    pub async fn open_favorites(&self) -> E2eResult<()> {
        self.base.click(&self.favorites_tab).await
    }
}
