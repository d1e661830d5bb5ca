// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use house_price_estimator::{Config, PropertyAttributes, Session};
use std::env;
use std::fs::File;
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    let args: Vec<String> = env::args().collect();

    if args.len() > 1 && args[1] == "estimate" {
        // Headless mode: one estimate of the default property
        init_tracing(None)?;
        run_estimate(&config)?;
    } else {
        // UI mode (default); logs go to a file so the screen stays clean
        init_tracing(Some(&config))?;
        run_ui_mode(&config)?;
    }

    Ok(())
}

fn init_tracing(log_to_file: Option<&Config>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "house_price_estimator=info".into());

    match log_to_file {
        Some(config) => {
            let file = File::create(&config.log_file)
                .with_context(|| format!("cannot create log file {:?}", config.log_file))?;
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}

fn run_estimate(config: &Config) -> Result<()> {
    let rt = runtime()?;
    let mut session = Session::new(config);

    let mode = rt.block_on(session.detect_mode());
    println!("Pricing service: {} ({})", config.api_url, mode.label());

    rt.block_on(session.submit());
    let state = session.state();

    if let Some(error) = &state.error {
        anyhow::bail!("{}", error);
    }
    let result = state.result.as_ref().context("no estimate produced")?;

    let attrs: &PropertyAttributes = &state.attributes;
    println!(
        "{} bd / {} ba / {} sq ft -> ${:.0} ({}, R² {:.4})",
        attrs.bedrooms,
        attrs.bathrooms,
        attrs.living_area,
        result.predicted_price,
        result.model_info.model_type,
        result.metrics.r2_score
    );

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &Config) -> Result<()> {
    let rt = runtime()?;
    let session = Session::new(config);

    let mut app = ui::App::new(session);
    ui::run_ui(&mut app, &rt)?;

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or run a single estimate: house-price estimate");
    std::process::exit(1);
}
