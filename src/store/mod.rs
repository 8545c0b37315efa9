pub mod sentinel;
pub mod types;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use types::{Incident, IncidentPatch};

/// Capability interface over the external incident store.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Obtain a bearer token for the store's management API. Fetched once
    /// per run and reused for every subsequent call in that run.
    async fn acquire_token(&self) -> Result<String>;

    /// List incidents with status Closed modified after `cutoff`, ordered
    /// newest-modified first. The ordering is a contract callers rely on.
    async fn list_closed_incidents(
        &self,
        token: &str,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Incident>>;

    /// Replace the mutable properties of one incident.
    async fn update_incident(
        &self,
        token: &str,
        incident_name: &str,
        patch: &IncidentPatch,
    ) -> Result<()>;

    /// Append an audit comment to an incident.
    async fn add_comment(&self, token: &str, incident_name: &str, message: &str) -> Result<()>;
}
