use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;

use crate::config::AuthConfig;
use crate::error::{AppError, Result};

/// The metadata endpoint is local, so failures should surface fast.
const TOKEN_TIMEOUT: Duration = Duration::from_secs(10);

const IDENTITY_API_VERSION: &str = "2018-02-01";
const MANAGEMENT_RESOURCE: &str = "https://management.azure.com/";
const MANAGEMENT_SCOPE: &str = "https://management.azure.com/.default";

enum CredentialMode {
    /// Local instance-metadata endpoint.
    ManagedIdentity { endpoint: String },
    /// Client-credential exchange against the tenant's token endpoint.
    ClientSecret {
        tenant_id: String,
        client_id: String,
        client_secret: String,
    },
}

/// Source of bearer tokens for the management API.
pub struct CredentialProvider {
    http: Client,
    mode: CredentialMode,
}

impl CredentialProvider {
    pub fn from_config(auth: &AuthConfig) -> Result<Self> {
        let http = Client::builder().timeout(TOKEN_TIMEOUT).build()?;

        let mode = match (&auth.tenant_id, &auth.client_id, &auth.client_secret) {
            (Some(tenant_id), Some(client_id), Some(client_secret)) => {
                CredentialMode::ClientSecret {
                    tenant_id: tenant_id.clone(),
                    client_id: client_id.clone(),
                    client_secret: client_secret.clone(),
                }
            }
            _ => CredentialMode::ManagedIdentity {
                endpoint: auth.identity_endpoint.clone(),
            },
        };

        Ok(Self { http, mode })
    }

    /// Obtain a bearer token scoped to the management API. The token is
    /// opaque to callers; no lifetime is assumed beyond the current run.
    pub async fn acquire_token(&self) -> Result<String> {
        let response = match &self.mode {
            CredentialMode::ManagedIdentity { endpoint } => self
                .http
                .get(endpoint)
                .header("Metadata", "true")
                .query(&[
                    ("api-version", IDENTITY_API_VERSION),
                    ("resource", MANAGEMENT_RESOURCE),
                ])
                .send()
                .await
                .map_err(|e| AppError::Auth(format!("identity endpoint unreachable: {e}")))?,
            CredentialMode::ClientSecret {
                tenant_id,
                client_id,
                client_secret,
            } => {
                let url = format!("https://login.microsoftonline.com/{tenant_id}/oauth2/v2.0/token");
                self.http
                    .post(&url)
                    .form(&[
                        ("grant_type", "client_credentials"),
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                        ("scope", MANAGEMENT_SCOPE),
                    ])
                    .send()
                    .await
                    .map_err(|e| AppError::Auth(format!("token endpoint unreachable: {e}")))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("malformed token response: {e}")))?;

        Ok(body.access_token)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}
