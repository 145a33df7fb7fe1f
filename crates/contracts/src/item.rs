//! Item - opaque queue payload
//!
//! The dispatcher transports items between caller, source and processor
//! without inspecting them. Encoding is the caller's business.

use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};

use crate::ContractError;

/// Opaque payload carried through the queue.
///
/// Backed by [`Bytes`], so clones are cheap and a source can hand the
/// buffer to the processor without copying.
///
/// # Examples
/// ```
/// use contracts::Item;
///
/// let item = Item::from("send-reminder:42");
/// assert_eq!(item.as_str(), Some("send-reminder:42"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Item(Bytes);

impl Item {
    /// Create an item from any byte buffer.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self(payload.into())
    }

    /// Encode a value as JSON into a new item.
    pub fn from_json<T: Serialize>(value: &T) -> Result<Self, ContractError> {
        serde_json::to_vec(value)
            .map(Self::new)
            .map_err(|e| ContractError::Payload {
                message: format!("JSON encode error: {e}"),
                source: Some(Box::new(e)),
            })
    }

    /// Decode the payload as JSON.
    pub fn to_json<T: DeserializeOwned>(&self) -> Result<T, ContractError> {
        serde_json::from_slice(&self.0).map_err(|e| ContractError::Payload {
            message: format!("JSON decode error: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Raw payload bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Payload as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the item, returning the underlying buffer.
    pub fn into_bytes(self) -> Bytes {
        self.0
    }
}

impl From<Bytes> for Item {
    fn from(value: Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Item {
    fn from(value: Vec<u8>) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<String> for Item {
    fn from(value: String) -> Self {
        Self(Bytes::from(value))
    }
}

impl From<&'static str> for Item {
    fn from(value: &'static str) -> Self {
        Self(Bytes::from_static(value.as_bytes()))
    }
}
