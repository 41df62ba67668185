//! Application routes, relative to the configured base URL

pub const HOME: &str = "/";
pub const SIGN_UP: &str = "/sign-up";
pub const SIGN_IN: &str = "/sign-in";
pub const DASHBOARD: &str = "/dashboard";
pub const DROPS: &str = "/drops";
pub const COLLECTIONS: &str = "/collections";
pub const ABOUT: &str = "/about";
pub const CART: &str = "/cart";
pub const PROFILE: &str = "/profile";
pub const FORGOT_PASSWORD: &str = "/forgot-password";
