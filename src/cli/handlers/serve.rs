//! API server handlers

use crate::AppConfig;
use crate::Result;

pub async fn handle_serve_api(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    use crate::api::serve_api;

    // CLI arguments take priority over config
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.cors_enabled();

    println!("🚀 Starting tikid API Server");
    println!("============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!("⏱️  Upstream timeout: {}s", config.fetch.timeout_secs);
    println!();

    serve_api(config, host, port, cors).await?;

    Ok(())
}
