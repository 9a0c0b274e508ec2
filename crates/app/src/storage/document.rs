//! Versioned JSON documents.
//!
//! Documents are written as `{"version": N, "data": …}`. Documents written before versioning
//! existed are the bare value; they load as version 0 and are rewritten in the envelope on the
//! next save.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::storage::{KeyValueStore, StorageError};

/// Version stamped on every document written by this build.
pub const DOCUMENT_VERSION: u32 = 1;

#[derive(Serialize)]
struct Envelope<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Stored<T> {
    Versioned { version: u32, data: T },
    Legacy(T),
}

/// Load and decode the document under `key`.
///
/// # Errors
///
/// Returns an error if the store cannot be read, the document does not decode, or it was written
/// by a newer build.
pub fn load_document<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    let stored: Stored<T> =
        serde_json::from_str(&raw).map_err(|source| StorageError::Serialization {
            key: key.to_string(),
            source,
        })?;

    match stored {
        Stored::Versioned { version, data } if version <= DOCUMENT_VERSION => Ok(Some(data)),
        Stored::Versioned { version, .. } => Err(StorageError::UnsupportedVersion {
            key: key.to_string(),
            version,
        }),
        Stored::Legacy(data) => {
            debug!(key, "loaded unversioned document");
            Ok(Some(data))
        }
    }
}

/// Encode `value` in the current envelope and store it under `key`.
///
/// # Errors
///
/// Returns an error if encoding or the store write fails.
pub fn save_document<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(&Envelope {
        version: DOCUMENT_VERSION,
        data: value,
    })
    .map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;

    store.set(key, &raw)
}

#[cfg(test)]
mod tests {
    use apotheca::cart::Cart;
    use testresult::TestResult;

    use crate::{
        storage::{MemoryStore, keys},
        test::fixtures::line,
    };

    use super::*;

    #[test]
    fn round_trips_through_envelope() -> TestResult {
        let store = MemoryStore::new();
        let cart = Cart::from_lines([line("P1", 2, 5)]);

        save_document(&store, keys::CART, &cart)?;

        let raw = store.get(keys::CART)?.unwrap_or_default();
        assert!(raw.starts_with(r#"{"version":1,"data":["#));

        let loaded: Option<Cart> = load_document(&store, keys::CART)?;
        assert_eq!(loaded, Some(cart));

        Ok(())
    }

    #[test]
    fn loads_legacy_bare_documents() -> TestResult {
        let store = MemoryStore::new();
        store.set(
            keys::CART,
            r#"[{"productId":"P1","name":"Serum","unitPrice":1200,"quantity":2,"cachedStock":4}]"#,
        )?;

        let loaded: Option<Cart> = load_document(&store, keys::CART)?;

        assert_eq!(
            loaded.and_then(|cart| cart.line("P1").map(|line| line.quantity)),
            Some(2)
        );

        Ok(())
    }

    #[test]
    fn rejects_documents_from_newer_builds() -> TestResult {
        let store = MemoryStore::new();
        store.set(keys::CART, r#"{"version":99,"data":[]}"#)?;

        let result: Result<Option<Cart>, _> = load_document(&store, keys::CART);

        assert!(matches!(
            result,
            Err(StorageError::UnsupportedVersion { version: 99, .. })
        ));

        Ok(())
    }

    #[test]
    fn garbage_is_a_serialization_error() -> TestResult {
        let store = MemoryStore::new();
        store.set(keys::CART, "{not json")?;

        let result: Result<Option<Cart>, _> = load_document(&store, keys::CART);

        assert!(matches!(result, Err(StorageError::Serialization { .. })));

        Ok(())
    }

    #[test]
    fn absent_key_is_none() -> TestResult {
        let store = MemoryStore::new();

        let loaded: Option<Cart> = load_document(&store, keys::CART)?;

        assert_eq!(loaded, None);

        Ok(())
    }
}
