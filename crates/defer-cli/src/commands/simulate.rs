use std::path::Path;

use clap::Args;
use defer_core::Page;

use super::{load_config, print_events};

#[derive(Args)]
pub struct SimulateArgs {
    /// Timeout in milliseconds (0 disables it); overrides the config file
    #[arg(long)]
    timeout: Option<u64>,
    /// Attach a router so navigations reset the state
    #[arg(long)]
    router: bool,
    /// Leave the provider mounted at the end instead of unmounting it
    #[arg(long)]
    keep_mounted: bool,
    /// Steps: click, touch, scroll, wait:MS, navigate, paint, render
    #[arg(required = true)]
    steps: Vec<String>,
}

pub fn run(args: SimulateArgs, config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(config_path)?;
    if let Some(timeout) = args.timeout {
        config.timeout_ms = timeout;
    }

    let mut page = Page::from_config(&config, args.router);
    page.run_script(&args.steps.join(" "))?;
    if !args.keep_mounted {
        page.unmount();
    }

    print_events(&page.drain_events())?;
    Ok(())
}
