//! One direction of the control plane: the tag index plus the engine's
//! handler manager.

use portico_core::{
    Capabilities, ControlError, Direction, EngineAction, HandlerConfig, HandlerManager,
    ProxyHandler, TypedMessage,
};
use std::sync::Arc;
use portico_std::{Insertion, OperationRegistry, RequestContext, TaggedRegistry};

/// Drives add, remove, query and alter for the handlers of one direction.
///
/// The index lock is never held across an engine call.
pub(crate) struct DirectionController<M: HandlerManager> {
    manager: M,
    index: TaggedRegistry<M::Config>,
}

impl<M: HandlerManager> DirectionController<M> {
    pub(crate) fn new(direction: Direction, manager: M) -> Self {
        Self {
            manager,
            index: TaggedRegistry::new(direction),
        }
    }

    pub(crate) fn direction(&self) -> Direction {
        self.index.direction()
    }

    pub(crate) fn manager(&self) -> &M {
        &self.manager
    }

    pub(crate) fn index(&self) -> &TaggedRegistry<M::Config> {
        &self.index
    }

    /// Instantiate and register a handler, then index it if tagged.
    ///
    /// Nothing is indexed unless both engine calls succeed.
    pub(crate) async fn add(
        &self,
        cx: &RequestContext,
        config: M::Config,
    ) -> Result<(), ControlError> {
        let direction = self.direction();
        let tag = config.tag().to_owned();

        let handler = cx
            .run(async {
                self.manager.instantiate(&config).await.map_err(|source| {
                    ControlError::engine(direction, &tag, EngineAction::Instantiate, source)
                })
            })
            .await?;

        cx.run(async {
            self.manager.add_handler(handler).await.map_err(|source| {
                ControlError::engine(direction, &tag, EngineAction::Register, source)
            })
        })
        .await?;

        match self.index.insert(&tag, config) {
            Insertion::Anonymous => tracing::debug!("anonymous handler added, not indexed"),
            Insertion::Inserted => tracing::debug!("handler indexed"),
            Insertion::Replaced(_) => tracing::debug!("index entry replaced"),
        }
        Ok(())
    }

    /// Drop the index entry, then ask the engine to tear the handler down.
    ///
    /// The entry stays dropped even if the engine call fails.
    pub(crate) async fn remove(&self, cx: &RequestContext, tag: &str) -> Result<(), ControlError> {
        cx.check()?;

        if self.index.remove(tag).is_none() {
            tracing::debug!("tag was not indexed");
        }

        let direction = self.direction();
        cx.run(async {
            self.manager.remove_handler(tag).await.map_err(|source| {
                ControlError::engine(direction, tag, EngineAction::Remove, source)
            })
        })
        .await
    }

    pub(crate) fn get(&self, cx: &RequestContext, tag: &str) -> Result<M::Config, ControlError> {
        cx.check()?;
        self.index
            .get(tag)
            .ok_or_else(|| ControlError::not_found(self.direction(), tag))
    }

    pub(crate) fn list(
        &self,
        cx: &RequestContext,
        prefix: &str,
    ) -> Result<Vec<M::Config>, ControlError> {
        cx.check()?;
        Ok(self.index.list(prefix))
    }

    /// What the live handler under `tag` exposes.
    pub(crate) async fn capabilities(
        &self,
        cx: &RequestContext,
        tag: &str,
    ) -> Result<Capabilities, ControlError> {
        Ok(self.live(cx, tag).await?.capabilities())
    }

    async fn live(
        &self,
        cx: &RequestContext,
        tag: &str,
    ) -> Result<Arc<dyn ProxyHandler>, ControlError> {
        cx.run(async { Ok(self.manager.get_handler(tag).await) })
            .await?
            .ok_or_else(|| ControlError::not_found(self.direction(), tag))
    }

    /// Resolve `message` and apply it to the live handler under `tag`.
    ///
    /// The handler is only touched once the operation is known to apply to
    /// this direction and the handler exposes the capability it needs.
    pub(crate) async fn alter(
        &self,
        cx: &RequestContext,
        operations: &OperationRegistry,
        tag: &str,
        message: &TypedMessage,
    ) -> Result<(), ControlError> {
        cx.check()?;
        let direction = self.direction();

        let operation = operations
            .resolve(message)
            .map_err(|err| err.for_target(direction, tag))?;
        if !operation.applies_to(direction) {
            return Err(ControlError::OperationDirection {
                operation: operation.type_name().to_owned(),
                direction,
                tag: tag.to_owned(),
            });
        }

        let handler = self.live(cx, tag).await?;
        let capabilities = handler.capabilities();
        tracing::debug!(?capabilities, "handler resolved");

        if !capabilities.contains(direction.into()) {
            return Err(ControlError::HandlerDirection {
                tag: tag.to_owned(),
                direction,
            });
        }

        let capability = operation.capability();
        let unsupported = || ControlError::UnsupportedCapability {
            direction,
            tag: tag.to_owned(),
            operation: operation.type_name().to_owned(),
            capability,
        };
        if !capabilities.contains(capability.flag()) {
            return Err(unsupported());
        }
        let target = capability
            .resolve(handler.as_ref())
            .ok_or_else(unsupported)?;

        cx.run(async {
            operation
                .apply_dyn(target)
                .await
                .map_err(|source| ControlError::Domain {
                    direction,
                    tag: tag.to_owned(),
                    operation: operation.type_name().to_owned(),
                    source,
                })
        })
        .await
    }
}
