//! Information display handlers

use crate::AppConfig;
use crate::Result;
use crate::TikidError;

pub fn handle_config(config: &AppConfig) -> Result<()> {
    let rendered =
        toml::to_string_pretty(config).map_err(|e| TikidError::ConfigError(e.to_string()))?;
    println!("📋 Current configuration:\n");
    println!("{rendered}");
    Ok(())
}
