//! Live smoke runner
//!
//! Runs a login-and-navigate smoke pass against a real console. Run with:
//! cargo test --package stratus-e2e --test e2e -- --base-url http://host:3000

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use stratus_e2e::{Harness, HarnessConfig, HarnessResult, ServerConfig, ServerHandle};
use stratus_model::access_control::{Credential, User};
use stratus_model::Navigatable;

#[derive(Parser, Debug)]
#[command(name = "stratus-e2e")]
#[command(about = "Live smoke runner for the Stratus console")]
struct Args {
    /// Console to target; spawns a local server when omitted
    #[arg(long)]
    base_url: Option<String>,

    /// Path to the console server binary (local spawn only)
    #[arg(long, default_value = "target/debug/stratus-console")]
    server_binary: PathBuf,

    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, default_value = "smartvm")]
    password: String,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    #[arg(long, default_value = "true")]
    headless: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> HarnessResult<()> {
    // Keep any spawned server alive for the whole run.
    let mut _server = None;

    let base_url = match args.base_url {
        Some(url) => url,
        None => {
            let handle = ServerHandle::spawn(ServerConfig {
                binary_path: args.server_binary,
                startup_timeout: Duration::from_secs(30),
                ..Default::default()
            })?;
            let url = handle.base_url().to_string();
            _server = Some(handle);
            url
        }
    };

    let harness = Harness::connect(HarnessConfig {
        base_url: Some(base_url),
        username: args.username,
        password: args.password,
        browser: args.browser,
        headless: args.headless,
    })?;

    smoke(&harness)
}

/// Login already happened in `connect`; walk the main screens and one
/// prerequisite chain end to end.
fn smoke(harness: &Harness) -> HarnessResult<()> {
    let appliance = harness.appliance();

    let server = appliance.server();
    server.navigate_to("Dashboard")?;
    server.navigate_to("Configuration")?;

    // Three-hop chain: Configuration -> Users -> user details
    let admin = User::new(
        appliance,
        "Administrator",
        Credential::new("admin", "smartvm"),
    );
    admin.navigate_to("Details")?;

    // Second pass should succeed purely from the satisfied prefix.
    admin.navigate_to("Details")?;

    println!("smoke passed against {}", appliance.base_url());
    Ok(())
}
