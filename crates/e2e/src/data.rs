//! Auth test data
//!
//! Registration against a shared public inbox races with anyone else using
//! the same address, so flows that need a fresh account should prefer
//! [`unique_mailbox`] over the fixed addresses.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Domain of the disposable-inbox provider
pub const MAILBOX_DOMAIN: &str = "yopmail.com";

/// Fixed registration address used by the create-user script
pub const REGISTERED_EMAIL: &str = "testuser@yopmail.com";

pub mod messages {
    pub const INVALID_EMAIL: &str = "Please enter a valid email address";
    pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
    pub const PASSWORD_TOO_WEAK: &str = "Password must be at least 8 characters";
    pub const USERNAME_TAKEN: &str = "Username is already taken";
    pub const EMAIL_TAKEN: &str = "Email is already registered";
    pub const MISSING_FIELD: &str = "This field is required";
    pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

    pub const SIGN_UP_SUCCESS: &str = "Account created successfully";
    pub const SIGN_IN_SUCCESS: &str = "Signed in successfully";
    pub const VERIFICATION_SENT: &str = "Verification code sent to your email";
}

pub mod passwords {
    pub const WEAK: &str = "123456";
    pub const VALID: &str = "StrongPass123!";
    pub const MISMATCH: &str = "DifferentPass123!";
}

/// Everything the sign-up form asks for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

impl Credentials {
    /// A registration that should succeed, using the shared disposable inbox
    pub fn valid() -> Self {
        Self {
            full_name: "test".to_string(),
            username: "test".to_string(),
            email: REGISTERED_EMAIL.to_string(),
            phone: random_phone(),
            password: "test@123".to_string(),
            confirm_password: "test@123".to_string(),
        }
    }

    /// The account the create-user script registers and the profile flows sign in with
    pub fn already_registered() -> Self {
        Self {
            password: "test-123".to_string(),
            confirm_password: "test-123".to_string(),
            ..Self::valid()
        }
    }

    /// A fresh identity with its own mailbox
    pub fn unique(prefix: &str) -> Self {
        let email = unique_mailbox(prefix);
        let username = email
            .split('@')
            .next()
            .unwrap_or(prefix)
            .replace('-', "_");
        Self {
            full_name: "Test User".to_string(),
            username,
            email,
            phone: random_phone(),
            password: passwords::VALID.to_string(),
            confirm_password: passwords::VALID.to_string(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_mismatched_passwords(mut self) -> Self {
        self.confirm_password = passwords::MISMATCH.to_string();
        self
    }

    pub fn with_weak_password(mut self) -> Self {
        self.password = passwords::WEAK.to_string();
        self.confirm_password = passwords::WEAK.to_string();
        self
    }

    pub fn passwords_match(&self) -> bool {
        self.password == self.confirm_password
    }
}

/// A North American test number in international format, `+1 555 XXX XXXX`
pub fn random_phone() -> String {
    let mut rng = rand::thread_rng();
    format!(
        "+1 555 {:03} {:04}",
        rng.gen_range(100..1000),
        rng.gen_range(0..10000)
    )
}

/// `<prefix>-<8 hex>@yopmail.com`
pub fn unique_mailbox(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}@{}", prefix, &id[..8], MAILBOX_DOMAIN)
}
