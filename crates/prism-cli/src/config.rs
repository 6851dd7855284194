//! CLI configuration loading.
//!
//! Layered sources, later wins: built-in defaults, an optional `prism.toml`
//! in the working directory (or an explicit `--config` path), then `PRISM_*`
//! environment variables. `PRISM_USERNAME`, `PRISM_PASSWORD`, and
//! `PRISM_SESSION` are the usual way to keep credentials out of files.

use config::{Config, Environment, File};
use serde::Deserialize;

use prism_client::ClientOptions;

/// Everything the CLI needs to construct and authenticate a client.
#[derive(Debug, Deserialize)]
pub struct CliConfig {
    /// Service domain, e.g. `oose.io`.
    pub domain: String,

    /// Login username.
    pub username: Option<String>,

    /// Login password.
    pub password: Option<String>,

    /// Explicit Prism host, overriding the domain fallback.
    pub host: Option<String>,

    /// Explicit Prism port.
    pub port: Option<u16>,

    /// Previously obtained session token, reused instead of logging in.
    pub session: Option<String>,
}

impl CliConfig {
    /// Loads configuration from the given file (required when explicit) or
    /// from `./prism.toml` if present, with environment overrides on top.
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder().set_default("domain", "oose.io")?;

        builder = match path {
            Some(path) => builder.add_source(File::with_name(path)),
            None => builder.add_source(File::with_name("prism").required(false)),
        };

        builder
            .add_source(Environment::with_prefix("PRISM"))
            .build()?
            .try_deserialize()
    }

    /// Connection options for [`prism_client::PrismClient`].
    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            domain: self.domain.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            host: self.host.clone(),
            port: self.port,
        }
    }
}
