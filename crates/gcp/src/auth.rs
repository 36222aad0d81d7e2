use google_cloud_auth::credentials::{Credentials, anonymous, service_account};
use tracing::info;

use crate::config::GcsConfig;
use crate::error::GcpError;

/// Where the Cloud Storage clients take their credentials from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource<'a> {
    /// Service account key file given as `keyFilename`.
    KeyFile(&'a str),
    /// No credentials at all; only used against a local emulator.
    Anonymous,
    /// Application Default Credentials, resolved by the client itself.
    ApplicationDefault,
}

impl<'a> CredentialSource<'a> {
    /// A key file wins; otherwise an endpoint override means an emulator.
    pub fn for_config(config: &'a GcsConfig) -> Self {
        match (config.credentials_path.as_deref(), &config.endpoint_url) {
            (Some(path), _) => Self::KeyFile(path),
            (None, Some(_)) => Self::Anonymous,
            (None, None) => Self::ApplicationDefault,
        }
    }
}

/// Resolve credentials for the clients.
///
/// `None` leaves the choice to the client builder (ADC).
///
/// # Errors
///
/// Returns [`GcpError::CredentialError`] if the key file cannot be read or
/// does not hold a service account key.
pub async fn load_credentials(
    source: CredentialSource<'_>,
) -> Result<Option<Credentials>, GcpError> {
    match source {
        CredentialSource::KeyFile(path) => {
            info!(path, "loading service account key file");
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                GcpError::CredentialError(format!("failed to read key file '{path}': {e}"))
            })?;
            let key = parse_key(&content)?;
            service_account::Builder::new(key)
                .build()
                .map(Some)
                .map_err(|e| {
                    GcpError::CredentialError(format!("invalid service account key: {e}"))
                })
        }
        CredentialSource::Anonymous => {
            info!("using anonymous credentials for emulator endpoint");
            Ok(Some(anonymous::Builder::new().build()))
        }
        CredentialSource::ApplicationDefault => {
            info!("using Application Default Credentials");
            Ok(None)
        }
    }
}

fn parse_key(content: &str) -> Result<serde_json::Value, GcpError> {
    serde_json::from_str(content)
        .map_err(|e| GcpError::CredentialError(format!("key file is not JSON: {e}")))
}
