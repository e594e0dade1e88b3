//! Azure credential resolution from the environment.
//!
//! Two sources are supported: a pre-acquired bearer token
//! (`AZURE_ACCESS_TOKEN`), or the client-credentials OAuth flow driven by
//! `AZURE_TENANT_ID` / `AZURE_CLIENT_ID` / `AZURE_CLIENT_SECRET`.

use crate::error::{AzureError, CloudgateError, Result};

/// Environment variable holding a pre-acquired management token.
const ENV_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";

/// Environment variables for the client-credentials flow.
const ENV_TENANT_ID: &str = "AZURE_TENANT_ID";
const ENV_CLIENT_ID: &str = "AZURE_CLIENT_ID";
const ENV_CLIENT_SECRET: &str = "AZURE_CLIENT_SECRET";

/// Where the management API bearer token comes from.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// A token acquired out of band (e.g. `az account get-access-token`).
    StaticToken(String),
    /// Service principal client-credentials flow.
    ClientSecret {
        /// Entra tenant id.
        tenant_id: String,
        /// Application (client) id.
        client_id: String,
        /// Client secret.
        client_secret: String,
    },
}

impl CredentialSource {
    /// Resolves a credential source from the environment.
    ///
    /// A static token takes precedence over the client-credentials triple.
    ///
    /// # Errors
    ///
    /// Returns [`AzureError::MissingCredential`] naming the first missing
    /// variable when neither source is fully configured.
    pub fn from_env() -> Result<Self> {
        if let Ok(token) = std::env::var(ENV_ACCESS_TOKEN) {
            return Ok(Self::StaticToken(token));
        }

        let require = |name: &str| -> Result<String> {
            std::env::var(name).map_err(|_| {
                CloudgateError::Azure(AzureError::MissingCredential {
                    name: name.to_string(),
                })
            })
        };

        Ok(Self::ClientSecret {
            tenant_id: require(ENV_TENANT_ID)?,
            client_id: require(ENV_CLIENT_ID)?,
            client_secret: require(ENV_CLIENT_SECRET)?,
        })
    }
}
