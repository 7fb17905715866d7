//! Type-tagged opaque payloads.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A payload tagged with the stable name of the type it encodes.
///
/// The control plane treats `value` as opaque bytes; only the decoder
/// registered under `type_name` knows its shape. Portico's own operations
/// encode their value as JSON.
///
/// ```json
/// {"type":"portico.command.RemoveUserOperation","value":[123,125]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedMessage {
    /// Stable type name used to look up the decoder.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Serialized value.
    #[serde(default)]
    pub value: Vec<u8>,
}

impl TypedMessage {
    /// Create a typed message from a type name and raw bytes.
    pub fn new(type_name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            type_name: type_name.into(),
            value: value.into(),
        }
    }

    /// Encode `value` as JSON under `type_name`.
    pub fn from_json<T: Serialize>(
        type_name: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::new(type_name, serde_json::to_vec(value)?))
    }

    /// Decode the JSON value.
    pub fn to_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.value)
    }
}
