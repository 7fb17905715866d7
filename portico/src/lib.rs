//! # portico - Live Handler Registry and Command Dispatch
//!
//! `portico` is the runtime control plane of a proxy engine. An operator
//! adds, removes, inspects and mutates live inbound listeners and outbound
//! connectors without restarting the engine.
//!
//! Mutations arrive as type-tagged payloads ([`TypedMessage`]). The
//! [`OperationRegistry`] decodes them into operations, and the
//! [`HandlerService`] applies them to the live handler under a tag through
//! the capability the operation declares.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use portico::prelude::*;
//!
//! let service = HandlerService::builder(inbound_manager, outbound_manager).build()?;
//! let cx = RequestContext::new();
//!
//! service
//!     .add_inbound(&cx, AddInboundRequest::new(InboundHandlerConfig::new("web")))
//!     .await?;
//!
//! let add = AddUser { user: User::new("love@example.com", 0) };
//! service
//!     .alter_inbound(&cx, AlterInboundRequest::operation("web", &add)?)
//!     .await?;
//! ```
//!
//! ## Custom Operations
//!
//! ```rust,ignore
//! #[derive(Debug, Serialize, Deserialize, TypedOperation)]
//! #[operation(name = "acme.ResetQuota")]
//! struct ResetQuota { email: String }
//!
//! impl Operation for ResetQuota {
//!     const CAPABILITY: Capability = Capability::UserManager;
//!
//!     async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
//!         // ...
//!     }
//! }
//!
//! let registry = OperationRegistry::builder()
//!     .with_builtin()
//!     .register_type::<ResetQuota>()
//!     .build();
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub mod api;
pub mod service;

pub use portico_core::{
    // Capabilities
    BalancerControl,
    // Errors
    BoxError,
    BoxFuture,
    Capabilities,
    Capability,
    CapabilityMismatch,
    CapabilityRef,
    ControlError,
    Direction,
    DynBalancerControl,
    // Operations
    DynOperation,
    DynUserManager,
    EngineAction,
    ErrorKind,
    // Engine
    HandlerConfig,
    HandlerManager,
    // Users
    MemoryUser,
    Operation,
    // Handlers
    ProxyHandler,
    Target,
    TypedMessage,
    TypedOperation,
    User,
    UserError,
    UserManager,
};

pub use portico_std::{
    AddUser, CancellationToken, DecodeFn, HandlerEntry, Insertion, OperationRegistration,
    OperationRegistry, OperationRegistryBuilder, OverrideBalancerTarget, RegistryError,
    RemoveUser, RequestContext, TaggedRegistry, decode_json,
};

pub use api::{
    AddInboundRequest, AddInboundResponse, AddOutboundRequest, AddOutboundResponse,
    AlterInboundRequest, AlterInboundResponse, AlterOutboundRequest, AlterOutboundResponse,
    ControlRequest, ControlResponse, ErrorReply, GetInboundConfRequest, GetInboundConfResponse,
    GetOutboundConfRequest, GetOutboundConfResponse, InboundHandlerConfig,
    ListInboundConfRequest, ListInboundConfResponse, ListOutboundConfRequest,
    ListOutboundConfResponse, OutboundHandlerConfig, RemoveInboundRequest, RemoveInboundResponse,
    RemoveOutboundRequest, RemoveOutboundResponse,
};
pub use service::{HandlerService, ServiceBuilder, ServiceConfig, ServiceError};

/// Testing utilities.
pub mod testing {
    pub use portico_std::testing::{
        HandlerFactory, MockBalancerHandler, MockManager, MockUserHandler, PlainHandler,
    };
}

/// Prelude module - common imports for Portico.
///
/// # Usage
///
/// ```rust,ignore
/// use portico::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Requests
        AddInboundRequest,
        AddOutboundRequest,
        AddUser,
        AlterInboundRequest,
        AlterOutboundRequest,
        // Errors
        BoxError,
        Capability,
        CapabilityRef,
        ControlError,
        ControlRequest,
        ControlResponse,
        Direction,
        GetInboundConfRequest,
        GetOutboundConfRequest,
        // Service
        HandlerService,
        InboundHandlerConfig,
        ListInboundConfRequest,
        ListOutboundConfRequest,
        // Operations
        Operation,
        OperationRegistry,
        OutboundHandlerConfig,
        RemoveInboundRequest,
        RemoveOutboundRequest,
        RemoveUser,
        RequestContext,
        ServiceConfig,
        TypedMessage,
        TypedOperation,
        User,
    };
}

#[cfg(feature = "macros")]
pub use portico_macros::TypedOperation;

#[cfg(feature = "inventory")]
pub use inventory;
