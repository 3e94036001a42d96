//! Configuration types for payload-migrate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, Result};

/// Which side of the migration a backend plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Backend content is read from.
    Source,
    /// Backend content is written to.
    Sink,
}

impl Role {
    /// Lowercase name, used as the session-cache key.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Source => "source",
            Role::Sink => "sink",
        }
    }

    /// Prefix of the environment variables carrying this role's credentials.
    #[must_use]
    pub fn env_prefix(self) -> &'static str {
        match self {
            Role::Source => "SOURCE",
            Role::Sink => "SINK",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Connection details for one backend.
///
/// Immutable once constructed; owned by a single
/// [`Authenticator`](crate::session::Authenticator).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// API base URL (e.g. `https://cms.example.org/api`).
    pub api_url: String,
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl EndpointConfig {
    /// Resolve a role's endpoint from `{PREFIX}_API_URL`, `{PREFIX}_USERNAME`
    /// and `{PREFIX}_PASSWORD` environment variables.
    ///
    /// A `.env` file in the working directory is honored if present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a variable is missing or the URL is
    /// invalid.
    pub fn from_env(role: Role) -> Result<Self> {
        dotenvy::dotenv().ok();

        let var = |suffix: &str| {
            let name = format!("{}_{}", role.env_prefix(), suffix);
            std::env::var(&name)
                .map_err(|_| Error::Config(format!("missing environment variable {name}")))
        };

        let config = Self {
            api_url: var("API_URL")?,
            email: var("USERNAME")?,
            password: var("PASSWORD")?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the endpoint configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] on an invalid URL or empty credentials.
    pub fn validate(&self) -> Result<()> {
        crate::api::common::validate_url(&self.api_url)?;
        if self.email.is_empty() {
            return Err(Error::Config("login email cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Runtime options for a migration run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationOptions {
    /// Restrict the run to these collection names (empty = all listed in
    /// the manifest).
    #[serde(default)]
    pub collections: Vec<String>,
    /// Fetch and count documents without writing anything to the sink.
    #[serde(default)]
    pub dry_run: bool,
}

impl MigrationOptions {
    /// Whether a collection passes the configured filter.
    #[must_use]
    pub fn includes(&self, name: &str) -> bool {
        self.collections.is_empty() || self.collections.iter().any(|c| c == name)
    }
}
