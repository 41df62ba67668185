//! Registers a storefront account end to end and signs in with it
//!
//! Run with: cargo run --package nepthic-e2e --bin create-user -- --headed

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use nepthic_e2e::data::Credentials;
use nepthic_e2e::driver::DriverHandle;
use nepthic_e2e::{CodeResult, E2eConfig, E2eError, E2eResult, Fixture, NOT_FOUND_SENTINEL};

#[derive(Parser, Debug)]
#[command(name = "create-user")]
#[command(about = "Register a NEPTHIC account through the sign-up and verification flow")]
struct Args {
    /// Path to the harness configuration file
    #[arg(short, long, default_value = "e2e.toml")]
    config: PathBuf,

    /// Storefront base URL
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Register this address instead of the shared test account
    #[arg(long, conflicts_with = "unique")]
    email: Option<String>,

    /// Register a fresh account with its own mailbox, using this prefix
    #[arg(long)]
    unique: Option<String>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!("Error creating user: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> E2eResult<()> {
    let mut config = E2eConfig::load(&args.config)?;
    if let Some(url) = args.base_url {
        config.app.base_url = url;
    }
    if args.headed {
        config.browser.headless = false;
    }

    let credentials = match (args.email, args.unique) {
        (_, Some(prefix)) => Credentials::unique(&prefix),
        (Some(email), None) => Credentials::already_registered().with_email(email),
        (None, None) => Credentials::already_registered(),
    };

    // Keep the driver alive until the session is gone
    let _driver = match &config.driver {
        Some(driver_config) => {
            let driver = DriverHandle::spawn(driver_config).await?;
            config.browser.webdriver_url = driver.url.clone();
            Some(driver)
        }
        None => None,
    };

    let fixture = Fixture::setup(&config).await?;
    let result = create_user(&fixture, &credentials).await;
    if let Err(e) = fixture.teardown().await {
        warn!("Failed to close browser session: {}", e);
    }
    result?;

    info!("User created successfully! ({})", credentials.email);
    Ok(())
}

async fn create_user(fixture: &Fixture, credentials: &Credentials) -> E2eResult<()> {
    let sign_up = fixture.sign_up_page();
    let sign_in = fixture.sign_in_page();

    sign_up.navigate().await?;
    sign_up.fill_sign_up_form(credentials).await?;
    sign_up.submit_sign_up().await?;

    let code = match fixture.verification_code(&credentials.email).await? {
        CodeResult::Found(code) => code,
        CodeResult::NotFound => {
            return Err(E2eError::StepFailed {
                step: "verification code".to_string(),
                reason: NOT_FOUND_SENTINEL.to_string(),
            })
        }
    };

    sign_up.fill_verification_code(&code).await?;
    sign_up.submit_verification_code().await?;
    sign_up.base().wait_for_url("sign-in").await?;

    sign_in.fill_sign_in_form(&credentials.email, &credentials.password).await?;
    sign_in.submit_sign_in().await?;

    if !fixture.home_page().verify_home_page_loaded().await? {
        warn!("Signed in, but the home page did not finish loading");
    }
    Ok(())
}
