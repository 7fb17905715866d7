//! Wire-level types of the handler service.
//!
//! - [`config`]: handler configurations stored by the index
//! - [`messages`]: one request/response pair per service method
//! - [`envelope`]: the `method`-tagged JSON envelope wrapping them

pub mod config;
pub mod envelope;
pub mod messages;

pub use config::{InboundHandlerConfig, OutboundHandlerConfig};
pub use envelope::{ControlRequest, ControlResponse, ErrorReply};
pub use messages::{
    AddInboundRequest, AddInboundResponse, AddOutboundRequest, AddOutboundResponse,
    AlterInboundRequest, AlterInboundResponse, AlterOutboundRequest, AlterOutboundResponse,
    GetInboundConfRequest, GetInboundConfResponse, GetOutboundConfRequest,
    GetOutboundConfResponse, ListInboundConfRequest, ListInboundConfResponse,
    ListOutboundConfRequest, ListOutboundConfResponse, RemoveInboundRequest,
    RemoveInboundResponse, RemoveOutboundRequest, RemoveOutboundResponse,
};
