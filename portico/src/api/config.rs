//! Handler configurations stored by the control plane.
//!
//! Both are opaque to the registry beyond their tag: the settings are
//! [`TypedMessage`]s the engine decodes when it instantiates the handler.

use portico_core::{HandlerConfig, TypedMessage};
use serde::{Deserialize, Serialize};

/// Configuration of an inbound listener.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundHandlerConfig {
    /// Operator-assigned tag; empty for an anonymous handler.
    #[serde(default)]
    pub tag: String,
    /// Where and how the listener accepts connections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_settings: Option<TypedMessage>,
    /// Protocol-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_settings: Option<TypedMessage>,
}

impl InboundHandlerConfig {
    /// A configuration with only a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the receiver settings.
    pub fn with_receiver_settings(mut self, settings: TypedMessage) -> Self {
        self.receiver_settings = Some(settings);
        self
    }

    /// Set the proxy settings.
    pub fn with_proxy_settings(mut self, settings: TypedMessage) -> Self {
        self.proxy_settings = Some(settings);
        self
    }
}

impl HandlerConfig for InboundHandlerConfig {
    fn tag(&self) -> &str {
        &self.tag
    }
}

/// Configuration of an outbound connector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundHandlerConfig {
    /// Operator-assigned tag; empty for an anonymous handler.
    #[serde(default)]
    pub tag: String,
    /// How the connector dials out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_settings: Option<TypedMessage>,
    /// Protocol-specific settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy_settings: Option<TypedMessage>,
}

impl OutboundHandlerConfig {
    /// A configuration with only a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Set the sender settings.
    pub fn with_sender_settings(mut self, settings: TypedMessage) -> Self {
        self.sender_settings = Some(settings);
        self
    }

    /// Set the proxy settings.
    pub fn with_proxy_settings(mut self, settings: TypedMessage) -> Self {
        self.proxy_settings = Some(settings);
        self
    }
}

impl HandlerConfig for OutboundHandlerConfig {
    fn tag(&self) -> &str {
        &self.tag
    }
}
