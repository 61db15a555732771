//! Pure functions for converting payloads to and from cached bytes.
//!
//! Cached values are stored as JSON so they are easy to inspect while
//! debugging, and so one store can hold every resource type.

use serde::{de::DeserializeOwned, Serialize};

use super::{QueryError, Result};

/// Serializes a payload to JSON bytes.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| QueryError::Decode(e.to_string()))
}

/// Deserializes JSON bytes into a payload.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| QueryError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Pagination, Page};

    #[test]
    fn test_page_survives_encoding() {
        let page = Page {
            items: vec!["a".to_string(), "b".to_string()],
            pagination: Pagination {
                page: 1,
                limit: 10,
                total: 2,
                pages: 1,
            },
        };

        let bytes = encode(&page).expect("encode should succeed");
        let decoded: Page<String> = decode(&bytes).expect("decode should succeed");

        assert_eq!(decoded, page);
    }

    #[test]
    fn test_decode_malformed_bytes() {
        let result: Result<Page<String>> = decode(b"not json");
        assert!(matches!(result, Err(QueryError::Decode(_))));
    }

    #[test]
    fn test_decode_wrong_shape() {
        let result: Result<Vec<String>> = decode(b"{\"items\": 1}");
        assert!(matches!(result, Err(QueryError::Decode(_))));
    }
}
