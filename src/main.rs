use clap::Parser;
use tikid::cli::handle_config;
use tikid::cli::handle_lookup;
use tikid::cli::handle_resolve;
use tikid::cli::handle_serve_api;
use tikid::cli::Cli;
use tikid::cli::Commands;
use tikid::AppConfig;
use tikid::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };
    config.validate()?;
    if config.logging.backtrace {
        std::env::set_var("RUST_BACKTRACE", "1");
    }

    // Initialize logging
    if cli.verbose {
        tikid::logging::init_logging_with_level("debug")?;
    } else {
        tikid::logging::init_logging_with_config(Some(&config))?;
    }
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Resolve { input, trace } => handle_resolve(&config, &input, trace).await,
        Commands::Lookup { input, backend } => handle_lookup(&config, &input, backend).await,
        Commands::Serve { host, port, cors } => handle_serve_api(&config, host, port, cors).await,
        Commands::Config => handle_config(&config),
    }
}
