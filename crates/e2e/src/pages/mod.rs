//! Page objects for the storefront
//!
//! Each page object owns its locators as [`Target`](crate::browser::Target)s
//! and exposes the actions and checks the flows need.

mod base;
mod home;
mod profile;
mod sign_in;
mod sign_up;

pub use base::BasePage;
pub use home::HomePage;
pub use profile::ProfilePage;
pub use sign_in::SignInPage;
pub use sign_up::SignUpPage;

use crate::browser::Target;

/// Header navigation present on every storefront page
#[derive(Debug, Clone)]
pub struct Header {
    pub logo: Target,
    pub drops_link: Target,
    pub collections_link: Target,
    pub about_link: Target,
    pub theme_toggle: Target,
    /// Document root once a light or dark theme class is applied
    pub themed_root: Target,
    pub cart_button: Target,
    pub login_button: Target,
    pub mobile_menu_button: Target,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            logo: Target::xpath("//a[contains(normalize-space(.), 'NEPTHIC')]"),
            drops_link: Target::role("link").named("Drops"),
            collections_link: Target::role("link").named("Collections"),
            about_link: Target::role("link").named("About"),
            theme_toggle: Target::css("button[title*=\"Switch to\"]"),
            themed_root: Target::xpath("/html[contains(@class, 'light') or contains(@class, 'dark')]"),
            cart_button: Target::css("a[href=\"/cart\"] button"),
            login_button: Target::role("button").named("Login"),
            mobile_menu_button: Target::css("button[aria-haspopup=\"dialog\"]").last(),
        }
    }
}

/// Footer present on every storefront page
#[derive(Debug, Clone)]
pub struct Footer {
    pub footer: Target,
    pub description: Target,
    pub instagram_link: Target,
    pub twitter_link: Target,
    pub tiktok_link: Target,
}

impl Default for Footer {
    fn default() -> Self {
        Self {
            footer: Target::css("footer"),
            description: Target::text("Premium streetwear for the next generation."),
            instagram_link: Target::role("link").named("Instagram"),
            twitter_link: Target::role("link").named("X (Twitter)"),
            tiktok_link: Target::role("link").named("TikTok"),
        }
    }
}

impl Footer {
    pub fn social_links(&self) -> [&Target; 3] {
        [&self.instagram_link, &self.twitter_link, &self.tiktok_link]
    }
}
