//! E2E test harness entry point
//!
//! Runs the YAML specs against a live storefront deployment.
//! Run with: cargo run --package nepthic-e2e --bin nepthic-e2e -- --tag smoke

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nepthic_e2e::config::{BrowserKind, DriverConfig};
use nepthic_e2e::{E2eConfig, E2eResult, TestRunner, TestSuiteResult};

#[derive(Parser, Debug)]
#[command(name = "nepthic-e2e")]
#[command(about = "E2E test runner for the NEPTHIC storefront")]
struct Args {
    /// Path to the harness configuration file
    #[arg(short, long, default_value = "e2e.toml")]
    config: PathBuf,

    /// Path to test specs directory
    #[arg(short, long)]
    specs: Option<PathBuf>,

    /// Run only tests matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific test by name
    #[arg(short, long)]
    name: Option<String>,

    /// Storefront base URL
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// URL of an already running WebDriver server
    #[arg(long, env = "WEBDRIVER_URL")]
    webdriver_url: Option<String>,

    /// Spawn this chromedriver/geckodriver binary instead of connecting to a running one
    #[arg(long)]
    driver_binary: Option<PathBuf>,

    /// Browser to use (chrome, firefox)
    #[arg(long)]
    browser: Option<BrowserKind>,

    /// Show the browser window
    #[arg(long)]
    headed: bool,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn build_config(args: &Args) -> E2eResult<E2eConfig> {
    let mut config = E2eConfig::load(&args.config)?;

    if let Some(specs) = &args.specs {
        config.specs_dir = specs.clone();
    }
    if let Some(url) = &args.base_url {
        config.app.base_url = url.clone();
    }
    if let Some(url) = &args.webdriver_url {
        config.browser.webdriver_url = url.clone();
    }
    if let Some(binary) = &args.driver_binary {
        config.driver = Some(DriverConfig {
            binary_path: binary.clone(),
            ..config.driver.unwrap_or_default()
        });
    }
    if let Some(browser) = args.browser {
        config.browser.browser = browser;
    }
    if args.headed {
        config.browser.headless = false;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }

    config.validate()?;
    Ok(config)
}

async fn async_main(args: Args) -> E2eResult<bool> {
    let config = build_config(&args)?;
    let mut runner = TestRunner::new(config);

    runner.start_driver().await?;

    let results = if let Some(name) = &args.name {
        let result = runner.run_test(name).await?;
        let duration_ms = result.duration_ms;
        TestSuiteResult::from_results(vec![result], duration_ms)
    } else if let Some(tag) = &args.tag {
        runner.run_tagged(tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.all_passed())
}
