use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceStatus};

/// The full inventory as of one successful fetch.
///
/// Snapshots replace each other wholesale; nothing is carried over between
/// them, not even for resources that share an `id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventorySnapshot {
    pub resources: Vec<Resource>,
    /// Local time the snapshot was received. Not part of the wire format.
    #[serde(skip, default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

/// Per-status resource counts for a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub unknown: usize,
}

impl StatusSummary {
    pub fn total(&self) -> usize {
        self.healthy + self.warning + self.critical + self.unknown
    }
}

impl InventorySnapshot {
    pub fn new(resources: Vec<Resource>) -> Self {
        InventorySnapshot {
            resources,
            received_at: Utc::now(),
        }
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn summary(&self) -> StatusSummary {
        let mut summary = StatusSummary::default();
        for resource in &self.resources {
            match resource.status {
                ResourceStatus::Healthy => summary.healthy += 1,
                ResourceStatus::Warning => summary.warning += 1,
                ResourceStatus::Critical => summary.critical += 1,
                ResourceStatus::Unknown(_) => summary.unknown += 1,
            }
        }
        summary
    }

    /// Ids that occur more than once, in order of first appearance.
    ///
    /// Duplicates are still rendered; this only feeds diagnostics.
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for resource in &self.resources {
            let count = seen.entry(resource.id.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(resource.id.as_str());
            }
        }
        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> InventorySnapshot {
        InventorySnapshot::new(vec![
            Resource::new("i-1234567890abcdef0", "EC2", "healthy", "us-east-1"),
            Resource::new("db-production-primary", "RDS", "healthy", "us-east-1"),
            Resource::new("production-api-service", "Lambda", "warning", "us-east-1"),
            Resource::new("queue-processing-worker", "ECS", "critical", "us-east-1"),
            Resource::new("edge-cache", "CloudFront", "paused", "global"),
        ])
    }

    #[test]
    fn parses_inventory_body_and_stamps_receive_time() {
        let before = Utc::now();
        let json = r#"{"resources":[{"id":"i-1","type":"EC2","status":"healthy","region":"us-east-1"}]}"#;
        let snapshot: InventorySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.resources[0].id, "i-1");
        assert!(snapshot.received_at >= before);
    }

    #[test]
    fn receive_time_is_not_serialized() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(!json.contains("received_at"));
    }

    #[test]
    fn empty_resource_list_is_valid() {
        let snapshot: InventorySnapshot = serde_json::from_str(r#"{"resources":[]}"#).unwrap();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.summary(), StatusSummary::default());
    }

    #[test]
    fn missing_resources_key_is_rejected() {
        assert!(serde_json::from_str::<InventorySnapshot>(r#"{"items":[]}"#).is_err());
    }

    #[test]
    fn summary_counts_each_status() {
        let summary = sample().summary();
        assert_eq!(summary.healthy, 2);
        assert_eq!(summary.warning, 1);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.total(), 5);
    }

    #[test]
    fn duplicate_ids_are_reported_once_each() {
        let snapshot = InventorySnapshot::new(vec![
            Resource::new("a", "EC2", "healthy", "r"),
            Resource::new("b", "EC2", "healthy", "r"),
            Resource::new("a", "RDS", "warning", "r"),
            Resource::new("a", "RDS", "critical", "r"),
        ]);
        assert_eq!(snapshot.duplicate_ids(), vec!["a"]);
        assert_eq!(snapshot.len(), 4);
    }
}
