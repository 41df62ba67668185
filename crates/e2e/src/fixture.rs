//! Per-test browser fixture
//!
//! A [`Fixture`] owns one browser session, its main page, and a retriever
//! that opens viewer pages in the same session. Page objects are built on
//! demand against the main page.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::browser::{BrowserSession, Page};
use crate::code::CodeResult;
use crate::config::E2eConfig;
use crate::error::E2eResult;
use crate::mailbox::MailboxLocks;
use crate::pages::{BasePage, HomePage, ProfilePage, SignInPage, SignUpPage};
use crate::retriever::VerificationCodeRetriever;
use crate::webdriver::WebDriverSession;

pub struct Fixture {
    config: E2eConfig,
    session: Arc<dyn BrowserSession>,
    base: BasePage,
    retriever: VerificationCodeRetriever,
    webdriver: Option<WebDriverSession>,
}

impl Fixture {
    /// Connect a WebDriver session and wrap its starting window
    pub async fn setup(config: &E2eConfig) -> E2eResult<Self> {
        let session = WebDriverSession::connect(&config.browser).await?;
        let page = match session.main_page().await {
            Ok(page) => page,
            Err(e) => {
                if let Err(quit) = session.quit().await {
                    warn!("Failed to end session after setup error: {}", quit);
                }
                return Err(e);
            }
        };

        let mut fixture = Self::from_parts(config.clone(), Arc::new(session.clone()), Arc::new(page));
        fixture.webdriver = Some(session);
        Ok(fixture)
    }

    /// Build a fixture over an existing session and page
    pub fn from_parts(config: E2eConfig, session: Arc<dyn BrowserSession>, page: Arc<dyn Page>) -> Self {
        let base = BasePage::new(page, config.app.base_url.clone());
        let retriever = VerificationCodeRetriever::new(config.inbox.clone());
        Self {
            config,
            session,
            base,
            retriever,
            webdriver: None,
        }
    }

    pub fn with_locks(mut self, locks: MailboxLocks) -> Self {
        self.retriever = self.retriever.with_locks(locks);
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.retriever = self.retriever.with_cancellation(cancel);
        self
    }

    pub fn with_retriever(mut self, retriever: VerificationCodeRetriever) -> Self {
        self.retriever = retriever;
        self
    }

    pub fn config(&self) -> &E2eConfig {
        &self.config
    }

    pub fn page(&self) -> &dyn Page {
        self.base.page()
    }

    pub fn base(&self) -> &BasePage {
        &self.base
    }

    pub fn session(&self) -> &dyn BrowserSession {
        self.session.as_ref()
    }

    pub fn retriever(&self) -> &VerificationCodeRetriever {
        &self.retriever
    }

    pub fn sign_up_page(&self) -> SignUpPage {
        SignUpPage::new(self.base.clone())
    }

    pub fn sign_in_page(&self) -> SignInPage {
        SignInPage::new(self.base.clone())
    }

    pub fn home_page(&self) -> HomePage {
        HomePage::new(self.base.clone())
    }

    pub fn profile_page(&self) -> ProfilePage {
        ProfilePage::new(self.base.clone())
    }

    /// Look up the code emailed to `email` in a page of this fixture's session
    pub async fn verification_code(&self, email: &str) -> E2eResult<CodeResult> {
        self.retriever
            .retrieve_with_session(self.session.as_ref(), email)
            .await
    }

    /// End the browser session, or close the main page when the fixture
    /// was built from parts
    pub async fn teardown(self) -> E2eResult<()> {
        match self.webdriver {
            Some(session) => session.quit().await,
            None => {
                info!("Closing fixture page");
                self.base.page().close().await
            }
        }
    }
}
