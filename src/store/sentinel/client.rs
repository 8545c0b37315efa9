use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::Deserialize;
use uuid::Uuid;

use crate::config::{AuthConfig, SentinelConfig};
use crate::error::{AppError, Result};
use crate::store::types::{Incident, IncidentPatch};
use crate::store::IncidentStore;

use super::auth::CredentialProvider;
use super::mapper;

const API_VERSION: &str = "2023-02-01";
const STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// The listing never asks for more than one page of this size; anything
/// beyond it is out of a single run's scope.
const MAX_PAGE_SIZE: u32 = 200;

pub struct SentinelStore {
    http: Client,
    credentials: CredentialProvider,
    /// Base path of the workspace's incidents collection.
    incidents_url: String,
    page_size: u32,
}

impl SentinelStore {
    pub fn new(auth: &AuthConfig, sentinel: &SentinelConfig) -> Result<Self> {
        let http = Client::builder().timeout(STORE_TIMEOUT).build()?;
        let credentials = CredentialProvider::from_config(auth)?;

        let incidents_url = format!(
            "{}/subscriptions/{}/resourceGroups/{}/providers/Microsoft.OperationalInsights/workspaces/{}/providers/Microsoft.SecurityInsights/incidents",
            sentinel.management_endpoint.trim_end_matches('/'),
            sentinel.subscription_id,
            sentinel.resource_group,
            sentinel.workspace,
        );

        Ok(Self {
            http,
            credentials,
            incidents_url,
            page_size: sentinel.page_size.clamp(1, MAX_PAGE_SIZE),
        })
    }

    async fn store_error(response: reqwest::Response) -> AppError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        AppError::Store {
            status,
            message: decode_error_body(&body),
        }
    }
}

/// Best-effort decode of the store's error envelope; degrades to the raw
/// response text when the body is not the expected JSON.
fn decode_error_body(body: &str) -> String {
    #[derive(Deserialize)]
    struct Envelope {
        error: Detail,
    }
    #[derive(Deserialize)]
    struct Detail {
        code: String,
        message: String,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => format!("{}: {}", envelope.error.code, envelope.error.message),
        Err(_) => body.trim().to_string(),
    }
}

#[async_trait]
impl IncidentStore for SentinelStore {
    async fn acquire_token(&self) -> Result<String> {
        self.credentials.acquire_token().await
    }

    async fn list_closed_incidents(
        &self,
        token: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Incident>> {
        let filter = format!(
            "properties/status eq 'Closed' and properties/lastModifiedTimeUtc gt {}",
            cutoff.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        let top = self.page_size.to_string();

        let response = self
            .http
            .get(&self.incidents_url)
            .bearer_auth(token)
            .query(&[
                ("api-version", API_VERSION),
                ("$filter", filter.as_str()),
                ("$orderby", "properties/lastModifiedTimeUtc desc"),
                ("$top", top.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        let page: mapper::IncidentList = response.json().await?;

        if page.value.len() as u32 >= self.page_size {
            tracing::warn!(
                page_size = self.page_size,
                "Incident listing filled the first page; matches beyond the page bound are left for the next run"
            );
        }

        Ok(page.value.into_iter().map(mapper::map_incident).collect())
    }

    async fn update_incident(
        &self,
        token: &str,
        incident_name: &str,
        patch: &IncidentPatch,
    ) -> Result<()> {
        let url = format!("{}/{incident_name}", self.incidents_url);

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .query(&[("api-version", API_VERSION)])
            .json(&serde_json::json!({ "properties": patch }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        Ok(())
    }

    async fn add_comment(&self, token: &str, incident_name: &str, message: &str) -> Result<()> {
        // Fresh id per call so repeated comments never collide or overwrite.
        let comment_id = Uuid::new_v4();
        let url = format!("{}/{incident_name}/comments/{comment_id}", self.incidents_url);

        let response = self
            .http
            .put(&url)
            .bearer_auth(token)
            .query(&[("api-version", API_VERSION)])
            .json(&serde_json::json!({ "properties": { "message": message } }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::store_error(response).await);
        }

        Ok(())
    }
}
