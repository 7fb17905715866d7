//! The handler service: the command dispatcher of the control plane.
//!
//! [`HandlerService`] owns one tag index per direction and the operation
//! registry, and drives the engine through its two [`HandlerManager`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! let service = HandlerService::builder(inbound_manager, outbound_manager)
//!     .config(ServiceConfig::from_json_str(r#"{"request_timeout_ms":5000}"#)?)
//!     .build()?;
//!
//! let cx = RequestContext::new();
//! service
//!     .add_inbound(&cx, AddInboundRequest::new(InboundHandlerConfig::new("web")))
//!     .await?;
//! ```

mod config;
mod controller;

pub use config::ServiceConfig;

use crate::api::{
    AddInboundRequest, AddInboundResponse, AddOutboundRequest, AddOutboundResponse,
    AlterInboundRequest, AlterInboundResponse, AlterOutboundRequest, AlterOutboundResponse,
    ControlRequest, ControlResponse, GetInboundConfRequest, GetInboundConfResponse,
    GetOutboundConfRequest, GetOutboundConfResponse, InboundHandlerConfig,
    ListInboundConfRequest, ListInboundConfResponse, ListOutboundConfRequest,
    ListOutboundConfResponse, OutboundHandlerConfig, RemoveInboundRequest, RemoveInboundResponse,
    RemoveOutboundRequest, RemoveOutboundResponse,
};
use controller::DirectionController;
use portico_core::{Capabilities, ControlError, Direction, HandlerManager};
use portico_std::{OperationRegistry, RegistryError, RequestContext, TaggedRegistry};
use std::{future::Future, sync::Arc, time::Duration};
use thiserror::Error;
use tracing::{Instrument, info_span};

/// Errors raised while assembling a [`HandlerService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The configuration document could not be parsed.
    #[error("invalid service configuration")]
    Config(#[from] serde_json::Error),

    /// The operation allow-list names an unregistered type.
    #[error("invalid operation allow-list")]
    Registry(#[from] RegistryError),
}

/// Logs the outcome of a request inside its span.
async fn logged<T, F>(request: F) -> Result<T, ControlError>
where
    F: Future<Output = Result<T, ControlError>>,
{
    let result = request.await;
    match &result {
        Ok(_) => tracing::debug!("request completed"),
        Err(err) => tracing::warn!(
            kind = ?err.kind(),
            error = %err.display_chain(),
            "request failed"
        ),
    }
    result
}

/// Live handler registry and command dispatcher.
///
/// All methods take `&self` and may be called concurrently. Each direction's
/// index has its own lock, so inbound and outbound requests never contend.
pub struct HandlerService<I, O>
where
    I: HandlerManager<Config = InboundHandlerConfig>,
    O: HandlerManager<Config = OutboundHandlerConfig>,
{
    tag: String,
    request_timeout: Option<Duration>,
    operations: Arc<OperationRegistry>,
    inbound: DirectionController<I>,
    outbound: DirectionController<O>,
}

impl<I, O> HandlerService<I, O>
where
    I: HandlerManager<Config = InboundHandlerConfig>,
    O: HandlerManager<Config = OutboundHandlerConfig>,
{
    /// Start building a service around the engine's two managers.
    pub fn builder(inbound: I, outbound: O) -> ServiceBuilder<I, O> {
        ServiceBuilder::new(inbound, outbound)
    }

    /// Tag the service is known by.
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The shared operation registry.
    pub fn operations(&self) -> &Arc<OperationRegistry> {
        &self.operations
    }

    /// The inbound handler manager.
    pub fn inbound_manager(&self) -> &I {
        self.inbound.manager()
    }

    /// The outbound handler manager.
    pub fn outbound_manager(&self) -> &O {
        self.outbound.manager()
    }

    /// The inbound tag index.
    pub fn inbound_index(&self) -> &TaggedRegistry<InboundHandlerConfig> {
        self.inbound.index()
    }

    /// The outbound tag index.
    pub fn outbound_index(&self) -> &TaggedRegistry<OutboundHandlerConfig> {
        self.outbound.index()
    }

    fn scope(&self, cx: &RequestContext) -> RequestContext {
        cx.or_timeout(self.request_timeout)
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    /// Build an inbound handler and index it under its tag.
    ///
    /// # Errors
    ///
    /// [`ControlError::Engine`] if the engine cannot build or register the
    /// handler; nothing is indexed in that case.
    pub async fn add_inbound(
        &self,
        cx: &RequestContext,
        request: AddInboundRequest,
    ) -> Result<AddInboundResponse, ControlError> {
        let span = info_span!(
            "add_inbound",
            direction = %self.inbound.direction(),
            tag = %request.inbound.tag,
        );
        let cx = self.scope(cx);
        logged(self.inbound.add(&cx, request.inbound))
            .instrument(span)
            .await?;
        Ok(AddInboundResponse {})
    }

    /// Drop the index entry for a tag, then tear down the inbound handler.
    ///
    /// # Errors
    ///
    /// [`ControlError::Engine`] if the engine teardown fails. The index
    /// entry is gone regardless.
    pub async fn remove_inbound(
        &self,
        cx: &RequestContext,
        request: RemoveInboundRequest,
    ) -> Result<RemoveInboundResponse, ControlError> {
        let span = info_span!(
            "remove_inbound",
            direction = %self.inbound.direction(),
            tag = %request.tag,
        );
        let cx = self.scope(cx);
        logged(self.inbound.remove(&cx, &request.tag))
            .instrument(span)
            .await?;
        Ok(RemoveInboundResponse {})
    }

    /// Apply a type-tagged operation to a live inbound handler.
    ///
    /// # Errors
    ///
    /// - [`ControlError::UnknownOperation`] or [`ControlError::Decode`] if
    ///   the payload cannot be resolved
    /// - [`ControlError::NotFound`] if no live handler has the tag
    /// - an unsupported-capability error if the handler cannot apply it
    /// - [`ControlError::Domain`] if the handler rejects it
    pub async fn alter_inbound(
        &self,
        cx: &RequestContext,
        request: AlterInboundRequest,
    ) -> Result<AlterInboundResponse, ControlError> {
        let span = info_span!(
            "alter_inbound",
            direction = %self.inbound.direction(),
            tag = %request.tag,
            operation = %request.operation.type_name,
        );
        let cx = self.scope(cx);
        logged(
            self.inbound
                .alter(&cx, &self.operations, &request.tag, &request.operation),
        )
        .instrument(span)
        .await?;
        Ok(AlterInboundResponse {})
    }

    /// The configuration indexed under a tag.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotFound`] if the tag is not indexed.
    pub async fn get_inbound_conf(
        &self,
        cx: &RequestContext,
        request: GetInboundConfRequest,
    ) -> Result<GetInboundConfResponse, ControlError> {
        let span = info_span!(
            "get_inbound_conf",
            direction = %self.inbound.direction(),
            tag = %request.tag,
        );
        let inbound = logged(async { self.inbound.get(cx, &request.tag) })
            .instrument(span)
            .await?;
        Ok(GetInboundConfResponse { inbound })
    }

    /// Indexed configurations whose tag starts with a prefix.
    pub async fn list_inbound_conf(
        &self,
        cx: &RequestContext,
        request: ListInboundConfRequest,
    ) -> Result<ListInboundConfResponse, ControlError> {
        let span = info_span!(
            "list_inbound_conf",
            direction = %self.inbound.direction(),
            prefix = %request.prefix,
        );
        let inbounds = logged(async { self.inbound.list(cx, &request.prefix) })
            .instrument(span)
            .await?;
        Ok(ListInboundConfResponse { inbounds })
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    /// Build an outbound handler and index it under its tag.
    ///
    /// # Errors
    ///
    /// [`ControlError::Engine`] if the engine cannot build or register the
    /// handler; nothing is indexed in that case.
    pub async fn add_outbound(
        &self,
        cx: &RequestContext,
        request: AddOutboundRequest,
    ) -> Result<AddOutboundResponse, ControlError> {
        let span = info_span!(
            "add_outbound",
            direction = %self.outbound.direction(),
            tag = %request.outbound.tag,
        );
        let cx = self.scope(cx);
        logged(self.outbound.add(&cx, request.outbound))
            .instrument(span)
            .await?;
        Ok(AddOutboundResponse {})
    }

    /// Drop the index entry for a tag, then tear down the outbound handler.
    ///
    /// # Errors
    ///
    /// [`ControlError::Engine`] if the engine teardown fails. The index
    /// entry is gone regardless.
    pub async fn remove_outbound(
        &self,
        cx: &RequestContext,
        request: RemoveOutboundRequest,
    ) -> Result<RemoveOutboundResponse, ControlError> {
        let span = info_span!(
            "remove_outbound",
            direction = %self.outbound.direction(),
            tag = %request.tag,
        );
        let cx = self.scope(cx);
        logged(self.outbound.remove(&cx, &request.tag))
            .instrument(span)
            .await?;
        Ok(RemoveOutboundResponse {})
    }

    /// Apply a type-tagged operation to a live outbound handler.
    ///
    /// Fails the same ways as [`HandlerService::alter_inbound`].
    pub async fn alter_outbound(
        &self,
        cx: &RequestContext,
        request: AlterOutboundRequest,
    ) -> Result<AlterOutboundResponse, ControlError> {
        let span = info_span!(
            "alter_outbound",
            direction = %self.outbound.direction(),
            tag = %request.tag,
            operation = %request.operation.type_name,
        );
        let cx = self.scope(cx);
        logged(
            self.outbound
                .alter(&cx, &self.operations, &request.tag, &request.operation),
        )
        .instrument(span)
        .await?;
        Ok(AlterOutboundResponse {})
    }

    /// The configuration indexed under a tag.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotFound`] if the tag is not indexed.
    pub async fn get_outbound_conf(
        &self,
        cx: &RequestContext,
        request: GetOutboundConfRequest,
    ) -> Result<GetOutboundConfResponse, ControlError> {
        let span = info_span!(
            "get_outbound_conf",
            direction = %self.outbound.direction(),
            tag = %request.tag,
        );
        let outbound = logged(async { self.outbound.get(cx, &request.tag) })
            .instrument(span)
            .await?;
        Ok(GetOutboundConfResponse { outbound })
    }

    /// Indexed configurations whose tag starts with a prefix.
    pub async fn list_outbound_conf(
        &self,
        cx: &RequestContext,
        request: ListOutboundConfRequest,
    ) -> Result<ListOutboundConfResponse, ControlError> {
        let span = info_span!(
            "list_outbound_conf",
            direction = %self.outbound.direction(),
            prefix = %request.prefix,
        );
        let outbounds = logged(async { self.outbound.list(cx, &request.prefix) })
            .instrument(span)
            .await?;
        Ok(ListOutboundConfResponse { outbounds })
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// What the live inbound handler under `tag` exposes.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotFound`] if no live handler has the tag.
    pub async fn inbound_capabilities(
        &self,
        cx: &RequestContext,
        tag: &str,
    ) -> Result<Capabilities, ControlError> {
        let span = info_span!(
            "inbound_capabilities",
            direction = %self.inbound.direction(),
            tag = %tag,
        );
        let cx = self.scope(cx);
        logged(self.inbound.capabilities(&cx, tag))
            .instrument(span)
            .await
    }

    /// What the live outbound handler under `tag` exposes.
    ///
    /// # Errors
    ///
    /// [`ControlError::NotFound`] if no live handler has the tag.
    pub async fn outbound_capabilities(
        &self,
        cx: &RequestContext,
        tag: &str,
    ) -> Result<Capabilities, ControlError> {
        let span = info_span!(
            "outbound_capabilities",
            direction = %self.outbound.direction(),
            tag = %tag,
        );
        let cx = self.scope(cx);
        logged(self.outbound.capabilities(&cx, tag))
            .instrument(span)
            .await
    }

    // ------------------------------------------------------------------------
    // Envelope
    // ------------------------------------------------------------------------

    /// Route an enveloped request to its method.
    ///
    /// Failures come back as [`ControlResponse::Error`].
    pub async fn dispatch(&self, cx: &RequestContext, request: ControlRequest) -> ControlResponse {
        let result = match request {
            ControlRequest::AddInbound(r) => self
                .add_inbound(cx, r)
                .await
                .map(ControlResponse::AddInbound),
            ControlRequest::RemoveInbound(r) => self
                .remove_inbound(cx, r)
                .await
                .map(ControlResponse::RemoveInbound),
            ControlRequest::AlterInbound(r) => self
                .alter_inbound(cx, r)
                .await
                .map(ControlResponse::AlterInbound),
            ControlRequest::GetInboundConf(r) => self
                .get_inbound_conf(cx, r)
                .await
                .map(ControlResponse::GetInboundConf),
            ControlRequest::ListInboundConf(r) => self
                .list_inbound_conf(cx, r)
                .await
                .map(ControlResponse::ListInboundConf),
            ControlRequest::AddOutbound(r) => self
                .add_outbound(cx, r)
                .await
                .map(ControlResponse::AddOutbound),
            ControlRequest::RemoveOutbound(r) => self
                .remove_outbound(cx, r)
                .await
                .map(ControlResponse::RemoveOutbound),
            ControlRequest::AlterOutbound(r) => self
                .alter_outbound(cx, r)
                .await
                .map(ControlResponse::AlterOutbound),
            ControlRequest::GetOutboundConf(r) => self
                .get_outbound_conf(cx, r)
                .await
                .map(ControlResponse::GetOutboundConf),
            ControlRequest::ListOutboundConf(r) => self
                .list_outbound_conf(cx, r)
                .await
                .map(ControlResponse::ListOutboundConf),
        };
        result.unwrap_or_else(ControlResponse::from)
    }
}

impl<I, O> std::fmt::Debug for HandlerService<I, O>
where
    I: HandlerManager<Config = InboundHandlerConfig>,
    O: HandlerManager<Config = OutboundHandlerConfig>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerService")
            .field("tag", &self.tag)
            .field("request_timeout", &self.request_timeout)
            .field("operations", &self.operations)
            .field("inbound", &self.inbound.index().len())
            .field("outbound", &self.outbound.index().len())
            .finish()
    }
}

/// Builder for constructing a [`HandlerService`].
pub struct ServiceBuilder<I, O> {
    inbound: I,
    outbound: O,
    operations: Option<OperationRegistry>,
    config: ServiceConfig,
}

impl<I, O> ServiceBuilder<I, O>
where
    I: HandlerManager<Config = InboundHandlerConfig>,
    O: HandlerManager<Config = OutboundHandlerConfig>,
{
    /// Create a builder with the default configuration.
    pub fn new(inbound: I, outbound: O) -> Self {
        Self {
            inbound,
            outbound,
            operations: None,
            config: ServiceConfig::default(),
        }
    }

    /// Use `operations` instead of the default registry.
    ///
    /// The default holds the built-in operations, plus every collected one
    /// when the `inventory` feature is enabled.
    pub fn operations(mut self, operations: OperationRegistry) -> Self {
        self.operations = Some(operations);
        self
    }

    /// Apply `config`.
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Build the service.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Registry`] if the configured allow-list names a type
    /// the registry does not hold.
    pub fn build(self) -> Result<HandlerService<I, O>, ServiceError> {
        let mut operations = self.operations.unwrap_or_else(default_operations);
        if let Some(allowed) = &self.config.operations {
            operations = operations.restrict(allowed)?;
        }
        tracing::debug!(tag = %self.config.tag, ?operations, "handler service built");

        Ok(HandlerService {
            request_timeout: self.config.request_timeout(),
            tag: self.config.tag,
            operations: Arc::new(operations),
            inbound: DirectionController::new(Direction::Inbound, self.inbound),
            outbound: DirectionController::new(Direction::Outbound, self.outbound),
        })
    }
}

#[cfg(not(feature = "inventory"))]
fn default_operations() -> OperationRegistry {
    OperationRegistry::builtin()
}

#[cfg(feature = "inventory")]
fn default_operations() -> OperationRegistry {
    OperationRegistry::builder()
        .with_builtin()
        .with_collected()
        .build()
}
