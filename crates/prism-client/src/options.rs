//! Client construction options.

use serde::Deserialize;

use prism_core::PrismError;

/// Port the Prism service listens on when none is configured.
pub const DEFAULT_PRISM_PORT: u16 = 5971;

/// Connection and credential options for a [`crate::PrismClient`].
///
/// `domain` doubles as the fallback connect host and the base of the CDN
/// domain used by the URL builders (`cdn.<domain>`). An explicit `host`/`port`
/// pair, when set, wins over the domain fallback; a `host` argument passed to
/// `connect` wins over both.
#[derive(Clone, Deserialize)]
pub struct ClientOptions {
    /// Service domain, e.g. `oose.io`.
    pub domain: String,

    /// Login username. Required for `login()`, not for `set_session()`.
    pub username: Option<String>,

    /// Login password. Required for `login()`, not for `set_session()`.
    pub password: Option<String>,

    /// Explicit Prism host, overriding the domain fallback.
    pub host: Option<String>,

    /// Explicit Prism port. Falls back to [`DEFAULT_PRISM_PORT`].
    pub port: Option<u16>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            domain: "oose.io".to_string(),
            username: None,
            password: None,
            host: None,
            port: None,
        }
    }
}

impl ClientOptions {
    /// Options for the given service domain, with everything else defaulted.
    pub fn for_domain(domain: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            ..Self::default()
        }
    }

    /// Sets the login credentials.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets an explicit Prism host and port.
    pub fn with_host(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = Some(host.into());
        self.port = Some(port);
        self
    }

    /// Checks the options are usable before any request is attempted.
    pub fn validate(&self) -> Result<(), PrismError> {
        if self.domain.is_empty() {
            return Err(PrismError::Config {
                message: "domain cannot be empty".to_string(),
            });
        }
        if let Some(port) = self.port {
            if port == 0 {
                return Err(PrismError::Config {
                    message: "port cannot be 0".to_string(),
                });
            }
        }
        Ok(())
    }

    /// The CDN domain serving purchased and static content.
    pub fn cdn_domain(&self) -> String {
        format!("cdn.{}", self.domain)
    }
}

// Credentials stay out of Debug output.
impl std::fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientOptions")
            .field("domain", &self.domain)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}
