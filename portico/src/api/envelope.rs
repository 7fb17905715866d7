//! Transport-agnostic JSON envelope.
//!
//! A transport carries one [`ControlRequest`] per line and gets one
//! [`ControlResponse`] back. Both are tagged with a `method` field:
//!
//! ```json
//! {"method":"remove_inbound","tag":"web"}
//! {"method":"error","kind":"not_found","message":"inbound handler not found: web"}
//! ```

use super::messages::{
    AddInboundRequest, AddInboundResponse, AddOutboundRequest, AddOutboundResponse,
    AlterInboundRequest, AlterInboundResponse, AlterOutboundRequest, AlterOutboundResponse,
    GetInboundConfRequest, GetInboundConfResponse, GetOutboundConfRequest,
    GetOutboundConfResponse, ListInboundConfRequest, ListInboundConfResponse,
    ListOutboundConfRequest, ListOutboundConfResponse, RemoveInboundRequest,
    RemoveInboundResponse, RemoveOutboundRequest, RemoveOutboundResponse,
};
use portico_core::{ControlError, ErrorKind};
use serde::{Deserialize, Serialize};

/// Any request the handler service accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ControlRequest {
    /// See [`AddInboundRequest`].
    AddInbound(AddInboundRequest),
    /// See [`RemoveInboundRequest`].
    RemoveInbound(RemoveInboundRequest),
    /// See [`AlterInboundRequest`].
    AlterInbound(AlterInboundRequest),
    /// See [`GetInboundConfRequest`].
    GetInboundConf(GetInboundConfRequest),
    /// See [`ListInboundConfRequest`].
    ListInboundConf(ListInboundConfRequest),
    /// See [`AddOutboundRequest`].
    AddOutbound(AddOutboundRequest),
    /// See [`RemoveOutboundRequest`].
    RemoveOutbound(RemoveOutboundRequest),
    /// See [`AlterOutboundRequest`].
    AlterOutbound(AlterOutboundRequest),
    /// See [`GetOutboundConfRequest`].
    GetOutboundConf(GetOutboundConfRequest),
    /// See [`ListOutboundConfRequest`].
    ListOutboundConf(ListOutboundConfRequest),
}

impl ControlRequest {
    /// The `method` tag of this request.
    pub fn method(&self) -> &'static str {
        match self {
            Self::AddInbound(_) => "add_inbound",
            Self::RemoveInbound(_) => "remove_inbound",
            Self::AlterInbound(_) => "alter_inbound",
            Self::GetInboundConf(_) => "get_inbound_conf",
            Self::ListInboundConf(_) => "list_inbound_conf",
            Self::AddOutbound(_) => "add_outbound",
            Self::RemoveOutbound(_) => "remove_outbound",
            Self::AlterOutbound(_) => "alter_outbound",
            Self::GetOutboundConf(_) => "get_outbound_conf",
            Self::ListOutboundConf(_) => "list_outbound_conf",
        }
    }

    /// Parse one JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }

    /// Render as one JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// A failed request, as reported through the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorReply {
    /// Classification of the failure.
    pub kind: ErrorKind,
    /// The error and its full cause chain.
    pub message: String,
}

impl From<&ControlError> for ErrorReply {
    fn from(err: &ControlError) -> Self {
        Self {
            kind: err.kind(),
            message: err.display_chain(),
        }
    }
}

/// The answer to a [`ControlRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ControlResponse {
    /// See [`AddInboundResponse`].
    AddInbound(AddInboundResponse),
    /// See [`RemoveInboundResponse`].
    RemoveInbound(RemoveInboundResponse),
    /// See [`AlterInboundResponse`].
    AlterInbound(AlterInboundResponse),
    /// See [`GetInboundConfResponse`].
    GetInboundConf(GetInboundConfResponse),
    /// See [`ListInboundConfResponse`].
    ListInboundConf(ListInboundConfResponse),
    /// See [`AddOutboundResponse`].
    AddOutbound(AddOutboundResponse),
    /// See [`RemoveOutboundResponse`].
    RemoveOutbound(RemoveOutboundResponse),
    /// See [`AlterOutboundResponse`].
    AlterOutbound(AlterOutboundResponse),
    /// See [`GetOutboundConfResponse`].
    GetOutboundConf(GetOutboundConfResponse),
    /// See [`ListOutboundConfResponse`].
    ListOutboundConf(ListOutboundConfResponse),
    /// The request failed.
    Error(ErrorReply),
}

impl ControlResponse {
    /// Whether this response reports a failure.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The failure, if this response reports one.
    pub fn error(&self) -> Option<&ErrorReply> {
        match self {
            Self::Error(reply) => Some(reply),
            _ => None,
        }
    }

    /// Parse one JSON line.
    pub fn from_json_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line.trim_end())
    }

    /// Render as one JSON line, without the trailing newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<ControlError> for ControlResponse {
    fn from(err: ControlError) -> Self {
        Self::Error(ErrorReply::from(&err))
    }
}
