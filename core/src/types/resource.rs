use std::fmt;

use serde::{Deserialize, Serialize};

/// Health status reported by the inventory source.
///
/// The wire format is a closed set of lowercase strings. Anything else is
/// carried as `Unknown` so a single odd entry does not invalidate the whole
/// snapshot; renderers map it to a neutral style.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum ResourceStatus {
    Healthy,
    Warning,
    Critical,
    Unknown(String),
}

impl ResourceStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ResourceStatus::Healthy => "healthy",
            ResourceStatus::Warning => "warning",
            ResourceStatus::Critical => "critical",
            ResourceStatus::Unknown(raw) => raw,
        }
    }

    /// Whether this is one of the three statuses the inventory contract defines.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ResourceStatus::Unknown(_))
    }
}

impl From<String> for ResourceStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "healthy" => ResourceStatus::Healthy,
            "warning" => ResourceStatus::Warning,
            "critical" => ResourceStatus::Critical,
            _ => ResourceStatus::Unknown(raw),
        }
    }
}

impl From<&str> for ResourceStatus {
    fn from(raw: &str) -> Self {
        ResourceStatus::from(raw.to_string())
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        match status {
            ResourceStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One tracked infrastructure item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resource {
    /// Opaque identifier; doubles as the card title.
    pub id: String,
    /// Category tag such as `EC2`, `RDS` or `Lambda`. Open-ended.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: ResourceStatus,
    /// Display-only location tag.
    pub region: String,
}

impl Resource {
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        status: impl Into<ResourceStatus>,
        region: impl Into<String>,
    ) -> Self {
        Resource {
            id: id.into(),
            kind: kind.into(),
            status: status.into(),
            region: region.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_closed_set() {
        let statuses: Vec<ResourceStatus> =
            serde_json::from_str(r#"["healthy", "warning", "critical"]"#).unwrap();
        assert_eq!(
            statuses,
            vec![
                ResourceStatus::Healthy,
                ResourceStatus::Warning,
                ResourceStatus::Critical,
            ]
        );
        assert!(statuses.iter().all(ResourceStatus::is_recognized));
    }

    #[test]
    fn status_keeps_unrecognized_value() {
        let status: ResourceStatus = serde_json::from_str(r#""degraded""#).unwrap();
        assert_eq!(status, ResourceStatus::Unknown("degraded".into()));
        assert!(!status.is_recognized());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""degraded""#);
    }

    #[test]
    fn status_match_is_case_sensitive() {
        assert_eq!(
            ResourceStatus::from("Healthy"),
            ResourceStatus::Unknown("Healthy".into())
        );
    }

    #[test]
    fn resource_uses_type_field_on_the_wire() {
        let json = r#"{"id":"i-1","type":"EC2","status":"healthy","region":"us-east-1"}"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource, Resource::new("i-1", "EC2", "healthy", "us-east-1"));

        let back = serde_json::to_string(&resource).unwrap();
        assert!(back.contains("\"type\":\"EC2\""));
    }

    #[test]
    fn resource_requires_every_field() {
        let json = r#"{"id":"i-1","type":"EC2","status":"healthy"}"#;
        assert!(serde_json::from_str::<Resource>(json).is_err());
    }
}
