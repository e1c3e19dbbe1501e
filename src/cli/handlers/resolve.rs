//! Resolution handlers: in-process `resolve` and client-side `lookup`

use crate::cli::output::*;
use crate::client::BackendClient;
use crate::resolver::HttpFetcher;
use crate::resolver::Resolver;
use crate::AppConfig;
use crate::Result;

pub async fn handle_resolve(config: &AppConfig, input: &str, trace: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(config.fetch.clone())?;
    let resolver = Resolver::new(config, fetcher);

    let resolution = resolver.resolve(input).await?;
    print_resolution(&resolution);
    if trace {
        print_attempts(&resolution.attempts);
    }

    resolution.into_identity().map(|_| ())
}

pub async fn handle_lookup(config: &AppConfig, input: &str, backend: Option<String>) -> Result<()> {
    let fetcher = HttpFetcher::new(config.fetch.clone())?;
    let mut client = BackendClient::new(config, fetcher)?;
    if let Some(url) = backend {
        client = client.with_backend_url(url);
    }

    let lookup = client.lookup(input).await?;
    print_lookup(&lookup);

    Ok(())
}
