use clap::Parser;
use orderflow::cli::{print_config, Cli, Commands};
use orderflow::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
            eprintln!("Using default configuration");
            let mut config: Config = toml::from_str(include_str!("../config.toml.example"))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
    };

    // Initialize telemetry
    orderflow::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting API server");
            args.execute(&config).await?;
        }
        Commands::Watch(args) => {
            tracing::info!(security_id = %args.security_id, "Starting continuous monitoring");
            args.execute(&config).await?;
        }
        Commands::Config => print_config(&config),
    }

    Ok(())
}
