use clap::Parser;
use intraday_sync::cli::{Cli, Commands};
use intraday_sync::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        toml::from_str(include_str!("../config.toml.example")).expect("Invalid default config")
    });

    intraday_sync::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            args.execute(config).await?;
        }
        Commands::Fetch(args) => {
            args.execute(config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Feed: {} ({} mode)", config.feed.symbol, config.feed.mode);
            println!("  Live enabled: {}", config.feed.live_enabled);
            println!(
                "  History: {} interval={}",
                config.history.base_url, config.history.interval
            );
            println!(
                "  Session: UTC{:+}min open {:02}:{:02}, refresh {}s",
                config.session.utc_offset_mins,
                config.session.open_hour,
                config.session.open_min,
                config.session.refresh_secs
            );
            println!("  Refetch cooldown: {}s", config.sync.cooldown_secs);
        }
    }

    Ok(())
}
