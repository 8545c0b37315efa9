use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::store::types::{Classification, Incident, IncidentStatus, Owner, Severity};

/// One page of the incident listing.
#[derive(Debug, Deserialize)]
pub struct IncidentList {
    #[serde(default)]
    pub value: Vec<IncidentResource>,
}

/// Wire shape of one incident resource.
#[derive(Debug, Deserialize)]
pub struct IncidentResource {
    pub id: String,
    pub name: String,
    pub properties: IncidentProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentProperties {
    #[serde(default)]
    pub incident_number: i64,
    #[serde(default)]
    pub title: String,
    pub status: IncidentStatus,
    pub severity: Severity,
    #[serde(default)]
    pub classification: Option<Classification>,
    #[serde(default)]
    pub owner: Option<Owner>,
    pub last_modified_time_utc: DateTime<Utc>,
}

/// Map a wire resource to the domain type. Absent owner and classification
/// decode to None; unrecognized status/severity/classification strings land
/// on their catch-all variants instead of failing the whole page.
pub fn map_incident(resource: IncidentResource) -> Incident {
    Incident {
        id: resource.id,
        name: resource.name,
        number: resource.properties.incident_number,
        title: resource.properties.title,
        status: resource.properties.status,
        severity: resource.properties.severity,
        classification: resource.properties.classification,
        owner: resource.properties.owner,
        last_modified: resource.properties.last_modified_time_utc,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_minimal_incident_without_owner_or_classification() {
        let raw = r#"{
            "id": "/subscriptions/s/resourceGroups/rg/providers/Microsoft.OperationalInsights/workspaces/ws/providers/Microsoft.SecurityInsights/incidents/abc",
            "name": "abc",
            "properties": {
                "incidentNumber": 101,
                "title": "Impossible travel",
                "status": "Closed",
                "severity": "Medium",
                "lastModifiedTimeUtc": "2026-08-01T09:30:00.0000000Z"
            }
        }"#;

        let resource: IncidentResource = serde_json::from_str(raw).unwrap();
        let incident = map_incident(resource);

        assert_eq!(incident.name, "abc");
        assert_eq!(incident.number, 101);
        assert_eq!(incident.status, IncidentStatus::Closed);
        assert_eq!(incident.classification, None);
        assert!(incident.owner.is_none());
    }

    #[test]
    fn decodes_null_classification_and_all_null_owner() {
        let raw = r#"{
            "id": "/incidents/def",
            "name": "def",
            "properties": {
                "incidentNumber": 7,
                "title": "Malware alert",
                "status": "Closed",
                "severity": "Low",
                "classification": null,
                "owner": {"assignedTo": null, "email": null, "userPrincipalName": null},
                "lastModifiedTimeUtc": "2026-08-01T10:00:00Z"
            }
        }"#;

        let incident = map_incident(serde_json::from_str(raw).unwrap());

        assert_eq!(incident.classification, None);
        assert!(incident.owner.as_ref().unwrap().is_unassigned());
    }

    #[test]
    fn unknown_enum_strings_do_not_fail_the_decode() {
        let raw = r#"{
            "id": "/incidents/ghi",
            "name": "ghi",
            "properties": {
                "incidentNumber": 8,
                "title": "Odd record",
                "status": "Triaged",
                "severity": "Catastrophic",
                "classification": "SomethingNew",
                "lastModifiedTimeUtc": "2026-08-01T11:00:00Z"
            }
        }"#;

        let incident = map_incident(serde_json::from_str(raw).unwrap());

        assert_eq!(incident.status, IncidentStatus::Unknown);
        assert_eq!(incident.severity, Severity::Unknown);
        assert_eq!(incident.classification, Some(Classification::Unknown));
    }

    #[test]
    fn decodes_assigned_owner() {
        let raw = r#"{
            "id": "/incidents/jkl",
            "name": "jkl",
            "properties": {
                "incidentNumber": 9,
                "title": "Phishing report",
                "status": "Closed",
                "severity": "High",
                "classification": "TruePositive",
                "owner": {"assignedTo": "Avery Analyst", "email": "avery@contoso.com", "userPrincipalName": "avery@contoso.com"},
                "lastModifiedTimeUtc": "2026-08-01T12:00:00Z"
            }
        }"#;

        let incident = map_incident(serde_json::from_str(raw).unwrap());

        let owner = incident.owner.unwrap();
        assert!(!owner.is_unassigned());
        assert_eq!(owner.assigned_to.as_deref(), Some("Avery Analyst"));
        assert_eq!(incident.classification, Some(Classification::TruePositive));
    }

    #[test]
    fn decodes_empty_list_page() {
        let page: IncidentList = serde_json::from_str(r#"{"value": []}"#).unwrap();
        assert!(page.value.is_empty());
    }
}
