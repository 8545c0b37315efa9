use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an incident in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncidentStatus {
    New,
    Active,
    Closed,
    #[serde(other)]
    Unknown,
}

impl IncidentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IncidentStatus::New => "New",
            IncidentStatus::Active => "Active",
            IncidentStatus::Closed => "Closed",
            IncidentStatus::Unknown => "Unknown",
        }
    }
}

/// Resolution recorded when an incident is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    Undetermined,
    TruePositive,
    BenignPositive,
    FalsePositive,
    #[serde(other)]
    Unknown,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Undetermined => "Undetermined",
            Classification::TruePositive => "TruePositive",
            Classification::BenignPositive => "BenignPositive",
            Classification::FalsePositive => "FalsePositive",
            Classification::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Informational,
    Low,
    Medium,
    High,
    #[serde(other)]
    Unknown,
}

/// Assignment information; the store sends an all-null object when nobody
/// owns the incident.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl Owner {
    pub fn is_unassigned(&self) -> bool {
        self.assigned_to
            .as_deref()
            .map_or(true, |assignee| assignee.trim().is_empty())
    }
}

/// Snapshot of one incident as read from the store.
#[derive(Debug, Clone)]
pub struct Incident {
    /// Full resource identifier.
    pub id: String,
    /// Identifier segment used in update and comment paths.
    pub name: String,
    /// Human-facing sequential number.
    pub number: i64,
    pub title: String,
    pub status: IncidentStatus,
    pub severity: Severity,
    pub classification: Option<Classification>,
    pub owner: Option<Owner>,
    pub last_modified: DateTime<Utc>,
}

/// The full properties object the store's update endpoint expects.
///
/// Updates are idempotent replaces, so the patch always carries the
/// incident's current title and severity alongside the fields being changed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPatch {
    pub title: String,
    pub severity: Severity,
    pub status: IncidentStatus,
    /// Serialized as an explicit null when cleared.
    pub classification: Option<Classification>,
}

impl IncidentPatch {
    /// Transition Closed → Active and clear the classification, leaving
    /// title and severity untouched.
    pub fn reopen(incident: &Incident) -> Self {
        Self {
            title: incident.title.clone(),
            severity: incident.severity,
            status: IncidentStatus::Active,
            classification: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn incident() -> Incident {
        Incident {
            id: "/subscriptions/s/incidents/abc".to_string(),
            name: "abc".to_string(),
            number: 42,
            title: "Suspicious sign-in".to_string(),
            status: IncidentStatus::Closed,
            severity: Severity::High,
            classification: Some(Classification::Undetermined),
            owner: None,
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn reopen_patch_preserves_title_and_severity() {
        let patch = IncidentPatch::reopen(&incident());
        assert_eq!(patch.title, "Suspicious sign-in");
        assert_eq!(patch.severity, Severity::High);
        assert_eq!(patch.status, IncidentStatus::Active);
        assert_eq!(patch.classification, None);
    }

    #[test]
    fn reopen_patch_serializes_explicit_null_classification() {
        let value = serde_json::to_value(IncidentPatch::reopen(&incident())).unwrap();
        assert_eq!(value["status"], "Active");
        assert_eq!(value["severity"], "High");
        assert!(value["classification"].is_null());
    }

    #[test]
    fn owner_with_blank_assignee_is_unassigned() {
        assert!(Owner::default().is_unassigned());
        let blank = Owner {
            assigned_to: Some("   ".to_string()),
            ..Owner::default()
        };
        assert!(blank.is_unassigned());
        let assigned = Owner {
            assigned_to: Some("analyst@contoso.com".to_string()),
            ..Owner::default()
        };
        assert!(!assigned.is_unassigned());
    }
}
