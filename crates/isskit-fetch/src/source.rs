//! Transport abstraction.

use async_trait::async_trait;
use serde_json::Value;

use crate::{FetchError, Paging};

/// A source of ISS JSON documents.
///
/// [`IssClient`](crate::IssClient) is the HTTP implementation. Everything
/// above the transport is written against this trait, so tests and host
/// applications can supply their own session.
#[async_trait]
pub trait IssSource: Send + Sync {
    /// Issues one GET for `path` (relative to the API root) with the given
    /// query parameters and returns the decoded JSON body.
    async fn get_json(&self, path: &str, query: &[(String, String)]) -> Result<Value, FetchError>;

    /// Downloads the file at `path` (relative to the API root).
    ///
    /// The default fails with [`FetchError::Unsupported`]; sources that only
    /// serve JSON documents need not implement it.
    async fn get_bytes(&self, path: &str) -> Result<Vec<u8>, FetchError> {
        Err(FetchError::Unsupported(path.to_string()))
    }

    /// Paging policy for multi-page tables.
    fn paging(&self) -> Paging {
        Paging::default()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct JsonOnly;

    #[async_trait]
    impl IssSource for JsonOnly {
        async fn get_json(&self, _path: &str, _query: &[(String, String)]) -> Result<Value, FetchError> {
            Ok(json!({}))
        }
    }

    #[tokio::test]
    async fn test_downloads_unsupported_by_default() {
        let err = JsonOnly.get_bytes("/downloads/file.zip").await.unwrap_err();
        assert!(matches!(err, FetchError::Unsupported(ref p) if p == "/downloads/file.zip"));
        assert_eq!(JsonOnly.paging(), Paging::default());
    }
}
