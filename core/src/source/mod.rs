//! Inventory sources.
//!
//! Provides the [`InventorySource`] trait and implementations for HTTP
//! (production) and a scripted mock (testing). The poller only ever talks to
//! the trait, so tests can drive it without a network.

pub mod http;
pub mod mock;

use async_trait::async_trait;

use crate::errors::FetchError;
use crate::types::InventorySnapshot;

pub use http::HttpInventorySource;
pub use mock::ScriptedSource;

/// Something that can produce one inventory snapshot per call.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Read the current inventory. Each call is independent.
    async fn fetch(&self) -> Result<InventorySnapshot, FetchError>;

    /// Human-readable location of the source, for logs and the footer.
    fn describe(&self) -> String;
}

/// Parse an `{ "resources": [...] }` response body.
pub fn parse_snapshot(body: &[u8]) -> Result<InventorySnapshot, FetchError> {
    serde_json::from_slice(body).map_err(|e| FetchError::Parse {
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResourceStatus;

    #[test]
    fn parses_well_formed_body() {
        let body = br#"{"resources":[
            {"id":"i-1","type":"EC2","status":"healthy","region":"us-east-1"},
            {"id":"fn-1","type":"Lambda","status":"warning","region":"eu-west-1"}
        ]}"#;
        let snapshot = parse_snapshot(body).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.resources[1].status, ResourceStatus::Warning);
    }

    #[test]
    fn non_json_body_is_parse_error() {
        let err = parse_snapshot(b"<html>502 Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn wrong_shape_is_parse_error() {
        let err = parse_snapshot(br#"{"resources":{"id":"i-1"}}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));

        let err = parse_snapshot(br#"[]"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse { .. }));
    }

    #[test]
    fn mock_is_usable_as_trait_object() {
        let source = ScriptedSource::new();
        let _: &dyn InventorySource = &source;
    }
}
