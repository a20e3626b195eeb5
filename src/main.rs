use anyhow::Context;
use clap::Parser;

use quotegate::adapter::inbound::cli::{self, command::Cli, output};
use quotegate::infrastructure::config::Config;
use quotegate::infrastructure::factory::build_gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();
    output::configure(args.json);

    let config = Config::load_or_default(&args.config)
        .with_context(|| format!("failed to load config from {}", args.config.display()))?;
    config.logging.init();

    let gateway = build_gateway(&config).context("failed to initialize gateway")?;
    cli::dispatch(&gateway, args.command).await?;
    Ok(())
}
