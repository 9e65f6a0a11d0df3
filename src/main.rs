use clap::Parser;
use kubectl_artillery::{cli::Cli, config, run_command};
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> kubectl_artillery::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    let working_dir = std::env::current_dir()?;

    // Load configuration
    let mut config = config::load_config(cli.config.as_deref(), &working_dir)?;
    cli.apply_overrides(&mut config);

    run_command(cli.command, &config, &working_dir).await
}
