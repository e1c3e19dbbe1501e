pub mod api;
pub mod cli;
pub mod client;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod resolver;


pub use config::AppConfig;
pub use errors::*;
pub use models::IdentityResult;
pub use models::Username;
pub use resolver::Resolver;
