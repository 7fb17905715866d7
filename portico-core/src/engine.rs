//! # Engine Contracts
//!
//! The proxy engine owns every live handler. The control plane reaches it
//! only through [`HandlerManager`], one instance per direction, and treats
//! handler configurations as opaque values implementing [`HandlerConfig`].

use crate::{error::BoxError, handler::ProxyHandler};
use std::{fmt::Debug, future::Future, sync::Arc};

/// Configuration a live handler is built from.
///
/// The control plane stores it verbatim and returns it on query; the only
/// thing it ever reads is the tag.
pub trait HandlerConfig: Clone + Debug + Send + Sync + 'static {
    /// The operator-assigned tag; empty for anonymous handlers.
    fn tag(&self) -> &str;
}

/// The engine's bookkeeping of live handlers for one direction.
///
/// Implementations own their handlers and serialize construction and
/// teardown however they see fit; the control plane calls these methods
/// without holding any lock of its own.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `HandlerManager`",
    label = "missing `HandlerManager` implementation",
    note = "Engines expose one `HandlerManager` per direction."
)]
pub trait HandlerManager: Send + Sync + 'static {
    /// Configuration type accepted by [`HandlerManager::instantiate`].
    type Config: HandlerConfig;

    /// Builds a live handler from `config` without registering it.
    fn instantiate(
        &self,
        config: &Self::Config,
    ) -> impl Future<Output = Result<Arc<dyn ProxyHandler>, BoxError>> + Send;

    /// Starts routing traffic through `handler`.
    ///
    /// Rejecting a duplicate tag is the manager's decision.
    fn add_handler(
        &self,
        handler: Arc<dyn ProxyHandler>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// The live handler registered under `tag`, if any.
    fn get_handler(&self, tag: &str) -> impl Future<Output = Option<Arc<dyn ProxyHandler>>> + Send;

    /// Stops and drops the handler registered under `tag`.
    fn remove_handler(&self, tag: &str) -> impl Future<Output = Result<(), BoxError>> + Send;
}

impl<M: HandlerManager> HandlerManager for Arc<M> {
    type Config = M::Config;

    fn instantiate(
        &self,
        config: &Self::Config,
    ) -> impl Future<Output = Result<Arc<dyn ProxyHandler>, BoxError>> + Send {
        (**self).instantiate(config)
    }

    fn add_handler(
        &self,
        handler: Arc<dyn ProxyHandler>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).add_handler(handler)
    }

    fn get_handler(&self, tag: &str) -> impl Future<Output = Option<Arc<dyn ProxyHandler>>> + Send {
        (**self).get_handler(tag)
    }

    fn remove_handler(&self, tag: &str) -> impl Future<Output = Result<(), BoxError>> + Send {
        (**self).remove_handler(tag)
    }
}
