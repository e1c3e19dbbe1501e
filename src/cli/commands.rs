//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "tikid")]
#[command(about = "Resolve TikTok usernames into userId and secUid")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to a TOML config file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a username, @handle or profile URL in-process
    Resolve {
        /// Username, @handle or profile URL
        input: String,
        /// Show every endpoint attempt
        #[arg(long)]
        trace: bool,
    },
    /// Ask a running backend, falling back to the degraded path if it fails
    Lookup {
        /// Username, @handle or profile URL
        input: String,
        /// Backend base URL (overrides client.backend_url)
        #[arg(long)]
        backend: Option<String>,
    },
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (overrides server.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS headers even if disabled in config
        #[arg(long)]
        cors: bool,
    },
    /// Show current configuration
    Config,
}
