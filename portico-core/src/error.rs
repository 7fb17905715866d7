//! Error types for Portico.
//!
//! This module provides the control-plane error taxonomy using `thiserror`:
//!
//! - [`ControlError`] - Every failure a control request can report
//! - [`ErrorKind`] - The coarse classification of a [`ControlError`]
//! - [`CapabilityMismatch`] - An operation was handed the wrong capability
//!
//! Collaborator failures (engine, handler, decoder) travel as [`BoxError`]
//! and are kept as the `source()` of the wrapping variant, so the full cause
//! chain reaches the operator.

use crate::handler::{Capability, Direction};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The engine call that failed inside an add or remove request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineAction {
    /// Building a live handler from its configuration.
    Instantiate,
    /// Registering a freshly built handler with the handler manager.
    Register,
    /// Tearing a handler down.
    Remove,
}

impl std::fmt::Display for EngineAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EngineAction::Instantiate => "instantiate",
            EngineAction::Register => "register",
            EngineAction::Remove => "remove",
        })
    }
}

/// Coarse classification of a [`ControlError`].
///
/// Serialized in `snake_case` so transports can report it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Construction or teardown failed at the engine level.
    Engine,
    /// No handler or index entry exists for the tag.
    NotFound,
    /// The operation type name is not registered.
    UnknownOperation,
    /// The operation payload could not be decoded.
    Decode,
    /// The target cannot perform the operation.
    UnsupportedCapability,
    /// The operation ran and the handler rejected it.
    Domain,
    /// The request was cancelled by its caller.
    Cancelled,
    /// The request ran past its deadline.
    TimedOut,
}

/// Errors reported by control-plane requests.
///
/// Every variant is scoped to a single request; none of them is fatal to the
/// process or to other tags.
#[derive(Error, Debug)]
pub enum ControlError {
    /// The engine failed to build, register or remove a handler.
    #[error("failed to {action} {direction} handler `{tag}`")]
    Engine {
        /// Direction of the handler.
        direction: Direction,
        /// Tag of the handler (may be empty for anonymous handlers).
        tag: String,
        /// The engine call that failed.
        action: EngineAction,
        /// The engine's own error.
        #[source]
        source: BoxError,
    },

    /// No handler is known under the tag.
    #[error("{direction} handler not found: {tag}")]
    NotFound {
        /// Direction that was searched.
        direction: Direction,
        /// The missing tag.
        tag: String,
    },

    /// No decoder is registered for the operation type name.
    #[error("unknown operation: {type_name}{}", on_target(.target))]
    UnknownOperation {
        /// The unregistered type name.
        type_name: String,
        /// The handler the request was aimed at, once known.
        target: Option<Target>,
    },

    /// The payload does not match the registered operation's shape.
    #[error("failed to decode operation `{type_name}`{}", on_target(.target))]
    Decode {
        /// The operation type name.
        type_name: String,
        /// The handler the request was aimed at, once known.
        target: Option<Target>,
        /// The decoder's error.
        #[source]
        source: BoxError,
    },

    /// The operation does not apply to handlers of this direction.
    #[error("`{operation}` is not an {direction} operation (handler `{tag}`)")]
    OperationDirection {
        /// Operation type name.
        operation: String,
        /// Direction the request targeted.
        direction: Direction,
        /// Tag the request targeted.
        tag: String,
    },

    /// The handler found under the tag belongs to the other direction.
    #[error("handler `{tag}` is not an {direction} handler")]
    HandlerDirection {
        /// Tag of the handler.
        tag: String,
        /// Direction the request targeted.
        direction: Direction,
    },

    /// The handler does not expose the capability the operation requires.
    #[error("{direction} handler `{tag}` cannot apply `{operation}`: not a {capability}")]
    UnsupportedCapability {
        /// Direction of the handler.
        direction: Direction,
        /// Tag of the handler.
        tag: String,
        /// Operation type name.
        operation: String,
        /// The missing capability.
        capability: Capability,
    },

    /// The operation was applied and the handler reported a failure.
    #[error("`{operation}` failed on {direction} handler `{tag}`")]
    Domain {
        /// Direction of the handler.
        direction: Direction,
        /// Tag of the handler.
        tag: String,
        /// Operation type name.
        operation: String,
        /// The handler's error.
        #[source]
        source: BoxError,
    },

    /// The caller cancelled the request.
    #[error("request was cancelled")]
    Cancelled,

    /// The request did not complete within its deadline.
    #[error("request timed out after {0:?}")]
    TimedOut(Duration),
}

impl ControlError {
    /// Creates an engine error.
    pub fn engine(
        direction: Direction,
        tag: impl Into<String>,
        action: EngineAction,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Engine {
            direction,
            tag: tag.into(),
            action,
            source: source.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(direction: Direction, tag: impl Into<String>) -> Self {
        Self::NotFound {
            direction,
            tag: tag.into(),
        }
    }

    /// Creates an unknown operation error.
    pub fn unknown_operation(type_name: impl Into<String>) -> Self {
        Self::UnknownOperation {
            type_name: type_name.into(),
            target: None,
        }
    }

    /// Creates a decode error.
    pub fn decode(type_name: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            type_name: type_name.into(),
            target: None,
            source: source.into(),
        }
    }

    /// Records the handler a resolve error was raised for.
    ///
    /// Only the operation resolve errors carry a target; every other variant
    /// is returned unchanged.
    pub fn for_target(mut self, direction: Direction, tag: impl Into<String>) -> Self {
        if let Self::UnknownOperation { target, .. } | Self::Decode { target, .. } = &mut self {
            target.get_or_insert(Target {
                direction,
                tag: tag.into(),
            });
        }
        self
    }

    /// Returns the classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Engine { .. } => ErrorKind::Engine,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::OperationDirection { .. }
            | Self::HandlerDirection { .. }
            | Self::UnsupportedCapability { .. } => ErrorKind::UnsupportedCapability,
            Self::Domain { .. } => ErrorKind::Domain,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::TimedOut(_) => ErrorKind::TimedOut,
        }
    }

    /// Whether the request itself was malformed or misdirected.
    ///
    /// Such requests fail the same way every time they are sent.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::UnknownOperation | ErrorKind::Decode | ErrorKind::UnsupportedCapability
        )
    }

    /// Renders the error followed by every `source()` in its chain.
    pub fn display_chain(&self) -> String {
        let mut rendered = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            source = cause.source();
        }
        rendered
    }
}

/// The handler a request was aimed at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Direction of the handler.
    pub direction: Direction,
    /// Tag of the handler.
    pub tag: String,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} handler `{}`", self.direction, self.tag)
    }
}

fn on_target(target: &Option<Target>) -> String {
    target
        .as_ref()
        .map(|target| format!(" for {target}"))
        .unwrap_or_default()
}

/// An operation was given a capability other than the one it declared.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("expected {expected} capability, got {actual}")]
pub struct CapabilityMismatch {
    /// The capability the operation declared.
    pub expected: Capability,
    /// The capability it was handed.
    pub actual: Capability,
}
