//! Request and response pairs of the handler service.
//!
//! One pair per method. Responses that carry no data are empty
//! acknowledgements; failure is always reported through the `Result` of the
//! call, never inside a response.

use super::config::{InboundHandlerConfig, OutboundHandlerConfig};
use portico_core::{TypedMessage, TypedOperation};
use serde::{Deserialize, Serialize};

// ============================================================================
// Inbound
// ============================================================================

/// Build an inbound handler and index it under its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInboundRequest {
    /// Configuration of the new handler.
    pub inbound: InboundHandlerConfig,
}

impl AddInboundRequest {
    /// Request adding `inbound`.
    pub fn new(inbound: InboundHandlerConfig) -> Self {
        Self { inbound }
    }
}

/// Acknowledges [`AddInboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddInboundResponse {}

/// Tear down the inbound handler under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInboundRequest {
    /// Tag of the handler.
    pub tag: String,
}

impl RemoveInboundRequest {
    /// Request removing the handler under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Acknowledges [`RemoveInboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveInboundResponse {}

/// Apply an operation to the live inbound handler under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterInboundRequest {
    /// Tag of the handler.
    pub tag: String,
    /// The type-tagged operation payload.
    pub operation: TypedMessage,
}

impl AlterInboundRequest {
    /// Request applying the raw `operation` payload.
    pub fn new(tag: impl Into<String>, operation: TypedMessage) -> Self {
        Self {
            tag: tag.into(),
            operation,
        }
    }

    /// Request applying `operation`, encoded as JSON under its type name.
    pub fn operation<T>(tag: impl Into<String>, operation: &T) -> Result<Self, serde_json::Error>
    where
        T: TypedOperation + Serialize,
    {
        Ok(Self::new(tag, TypedMessage::from_json(T::TYPE_NAME, operation)?))
    }
}

/// Acknowledges [`AlterInboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterInboundResponse {}

/// Fetch the configuration indexed under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInboundConfRequest {
    /// Tag of the handler.
    pub tag: String,
}

impl GetInboundConfRequest {
    /// Request the configuration under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// The configuration answering [`GetInboundConfRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetInboundConfResponse {
    /// The stored configuration, verbatim.
    pub inbound: InboundHandlerConfig,
}

/// List indexed configurations whose tag starts with `prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInboundConfRequest {
    /// Tag prefix; empty lists everything.
    #[serde(default)]
    pub prefix: String,
}

impl ListInboundConfRequest {
    /// Request every configuration whose tag starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// The configurations answering [`ListInboundConfRequest`], unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListInboundConfResponse {
    /// Matching configurations.
    pub inbounds: Vec<InboundHandlerConfig>,
}

// ============================================================================
// Outbound
// ============================================================================

/// Build an outbound handler and index it under its tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOutboundRequest {
    /// Configuration of the new handler.
    pub outbound: OutboundHandlerConfig,
}

impl AddOutboundRequest {
    /// Request adding `outbound`.
    pub fn new(outbound: OutboundHandlerConfig) -> Self {
        Self { outbound }
    }
}

/// Acknowledges [`AddOutboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddOutboundResponse {}

/// Tear down the outbound handler under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOutboundRequest {
    /// Tag of the handler.
    pub tag: String,
}

impl RemoveOutboundRequest {
    /// Request removing the handler under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Acknowledges [`RemoveOutboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveOutboundResponse {}

/// Apply an operation to the live outbound handler under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterOutboundRequest {
    /// Tag of the handler.
    pub tag: String,
    /// The type-tagged operation payload.
    pub operation: TypedMessage,
}

impl AlterOutboundRequest {
    /// Request applying the raw `operation` payload.
    pub fn new(tag: impl Into<String>, operation: TypedMessage) -> Self {
        Self {
            tag: tag.into(),
            operation,
        }
    }

    /// Request applying `operation`, encoded as JSON under its type name.
    pub fn operation<T>(tag: impl Into<String>, operation: &T) -> Result<Self, serde_json::Error>
    where
        T: TypedOperation + Serialize,
    {
        Ok(Self::new(tag, TypedMessage::from_json(T::TYPE_NAME, operation)?))
    }
}

/// Acknowledges [`AlterOutboundRequest`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlterOutboundResponse {}

/// Fetch the configuration indexed under `tag`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOutboundConfRequest {
    /// Tag of the handler.
    pub tag: String,
}

impl GetOutboundConfRequest {
    /// Request the configuration under `tag`.
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// The configuration answering [`GetOutboundConfRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetOutboundConfResponse {
    /// The stored configuration, verbatim.
    pub outbound: OutboundHandlerConfig,
}

/// List indexed configurations whose tag starts with `prefix`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOutboundConfRequest {
    /// Tag prefix; empty lists everything.
    #[serde(default)]
    pub prefix: String,
}

impl ListOutboundConfRequest {
    /// Request every configuration whose tag starts with `prefix`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

/// The configurations answering [`ListOutboundConfRequest`], unordered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOutboundConfResponse {
    /// Matching configurations.
    pub outbounds: Vec<OutboundHandlerConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use portico_std::RemoveUser;

    #[test]
    fn test_alter_request_encodes_operation() {
        let request = AlterInboundRequest::operation(
            "web",
            &RemoveUser {
                email: "a@example.com".into(),
            },
        )
        .unwrap();
        assert_eq!(request.operation.type_name, RemoveUser::TYPE_NAME);
        let op: RemoveUser = request.operation.to_json().unwrap();
        assert_eq!(op.email, "a@example.com");
    }

    #[test]
    fn test_list_prefix_defaults_to_empty() {
        let request: ListOutboundConfRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, ListOutboundConfRequest::default());
    }
}
