use std::path::Path;

use serde::Deserialize;
use serde::Serialize;

use crate::models::render_template;
use crate::TikidError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            backtrace: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            enable_cors: true,
        }
    }
}

/// Request profile shared by every outbound fetch
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub html_accept: String,
    pub json_accept: String,
    pub accept_language: String,
    /// Origin used for the `Referer` header
    pub platform_origin: String,
    /// Name of the cookie that receives a random value on every request
    pub tracking_cookie: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            html_accept: "text/html,application/xhtml+xml,application/xml;q=0.9,\
                          image/avif,image/webp,*/*;q=0.8"
                .to_string(),
            json_accept: "application/json, text/plain, */*".to_string(),
            accept_language: "en-US,en;q=0.9,es-ES;q=0.8,es;q=0.7".to_string(),
            platform_origin: "https://www.tiktok.com".to_string(),
            tracking_cookie: "tt_webid_v2".to_string(),
        }
    }
}

/// Ordered URL templates per strategy; `{username}` is substituted percent-encoded
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointsConfig {
    pub structured_api: Vec<String>,
    pub share: Vec<String>,
    pub raw_html: Vec<String>,
    pub degraded: Vec<String>,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            structured_api: vec![
                "https://www.tiktok.com/api/user/detail/?aid=1988&uniqueId={username}".to_string(),
                "https://m.tiktok.com/api/user/detail/?aid=1988&uniqueId={username}".to_string(),
                "https://r.jina.ai/http://www.tiktok.com/api/user/detail/?aid=1988&uniqueId={username}"
                    .to_string(),
            ],
            share: vec![
                "https://www.tiktok.com/node/share/user/@{username}".to_string(),
                "https://m.tiktok.com/node/share/user/@{username}".to_string(),
                "https://r.jina.ai/http://www.tiktok.com/node/share/user/@{username}".to_string(),
            ],
            raw_html: vec![
                "https://www.tiktok.com/@{username}?is_copy_url=1&is_from_webapp=v1".to_string(),
                "https://www.tiktok.com/@{username}".to_string(),
                "https://m.tiktok.com/@{username}".to_string(),
                "https://r.jina.ai/http://www.tiktok.com/@{username}".to_string(),
            ],
            degraded: vec![
                "https://r.jina.ai/http://www.tiktok.com/@{username}".to_string(),
                "https://cors-anywhere.herokuapp.com/https://www.tiktok.com/@{username}?lang=en"
                    .to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a running `tikid serve` instance
    pub backend_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub client: ClientConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default config file path
    ///
    /// Falls back to built-in defaults when neither `config.toml` nor
    /// `config.example.toml` exists.
    pub fn load() -> crate::Result<Self> {
        if Path::new("config.toml").exists() {
            Self::from_file("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::from_file("config.example.toml")
        } else {
            tracing::warn!("No config file found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Check values the resolver relies on
    pub fn validate(&self) -> crate::Result<()> {
        if self.fetch.timeout_secs == 0 {
            return Err(TikidError::ConfigError(
                "fetch.timeout_secs must be greater than zero".to_string(),
            ));
        }

        let groups = [
            ("structured_api", &self.endpoints.structured_api),
            ("share", &self.endpoints.share),
            ("raw_html", &self.endpoints.raw_html),
            ("degraded", &self.endpoints.degraded),
        ];
        for (name, templates) in groups {
            for template in templates {
                let rendered = render_template(template, "probe.user");
                url::Url::parse(&rendered).map_err(|e| {
                    TikidError::ConfigError(format!(
                        "endpoints.{name}: '{template}' is not a valid URL template: {e}"
                    ))
                })?;
            }
        }

        url::Url::parse(&self.client.backend_url).map_err(|e| {
            TikidError::ConfigError(format!(
                "client.backend_url '{}' is invalid: {e}",
                self.client.backend_url
            ))
        })?;

        Ok(())
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check if CORS headers are enabled
    pub fn cors_enabled(&self) -> bool {
        self.server.enable_cors
    }

    /// Get backend base URL used by `lookup`
    pub fn backend_url(&self) -> &str {
        &self.client.backend_url
    }
}
