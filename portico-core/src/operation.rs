//! # Operations
//!
//! An operation is a strongly typed mutation applied to a live handler
//! through one of its capabilities (for example "add this user").
//!
//! Operations arrive as a [`TypedMessage`](crate::TypedMessage); a decoder
//! registered under [`TypedOperation::TYPE_NAME`] turns the payload into a
//! `Box<dyn DynOperation>`. The dispatcher never names concrete operation
//! types: it reads [`DynOperation::capability`], resolves that capability on
//! the target handler and calls [`DynOperation::apply_dyn`].
//!
//! # Static vs Dynamic Dispatch
//!
//! Implement [`Operation`] (native `async fn`, associated constants). Every
//! `Operation` is automatically a [`DynOperation`], the object-safe form used
//! by registries.

use crate::{
    capability::BoxFuture,
    error::BoxError,
    handler::{Capability, CapabilityRef, Direction},
};
use std::{fmt::Debug, future::Future};

/// Binds a type to the stable name its payloads are tagged with.
///
/// Usually derived:
///
/// ```rust,ignore
/// #[derive(Debug, Deserialize, TypedOperation)]
/// #[operation(name = "acme.command.ResetQuota")]
/// struct ResetQuota { email: String }
/// ```
pub trait TypedOperation {
    /// Stable type name, unique across the process.
    const TYPE_NAME: &'static str;
}

/// A mutation applicable to any handler exposing [`Operation::CAPABILITY`].
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Operation`",
    label = "missing `Operation` implementation",
    note = "Operations declare the capability they need and implement `apply`."
)]
pub trait Operation: TypedOperation + Debug + Send + Sync + 'static {
    /// The capability the target handler must expose.
    const CAPABILITY: Capability;

    /// Directions whose handlers this operation may target.
    const DIRECTIONS: &'static [Direction] = Direction::ALL;

    /// Applies the operation through the resolved capability.
    ///
    /// `target` always matches [`Operation::CAPABILITY`] when called by the
    /// dispatcher. The handler's own failures are returned unchanged.
    fn apply(&self, target: CapabilityRef<'_>)
    -> impl Future<Output = Result<(), BoxError>> + Send;
}

/// Object-safe version of [`Operation`].
pub trait DynOperation: Debug + Send + Sync + 'static {
    /// See [`TypedOperation::TYPE_NAME`].
    fn type_name(&self) -> &'static str;

    /// See [`Operation::CAPABILITY`].
    fn capability(&self) -> Capability;

    /// Whether the operation may target handlers of `direction`.
    fn applies_to(&self, direction: Direction) -> bool;

    /// See [`Operation::apply`].
    fn apply_dyn<'a>(&'a self, target: CapabilityRef<'a>) -> BoxFuture<'a, Result<(), BoxError>>;
}

impl<T: Operation> DynOperation for T {
    fn type_name(&self) -> &'static str {
        T::TYPE_NAME
    }

    fn capability(&self) -> Capability {
        T::CAPABILITY
    }

    fn applies_to(&self, direction: Direction) -> bool {
        T::DIRECTIONS.contains(&direction)
    }

    fn apply_dyn<'a>(&'a self, target: CapabilityRef<'a>) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.apply(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::BalancerControl;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct PinTarget(String);

    impl TypedOperation for PinTarget {
        const TYPE_NAME: &'static str = "test.PinTarget";
    }

    impl Operation for PinTarget {
        const CAPABILITY: Capability = Capability::Balancer;
        const DIRECTIONS: &'static [Direction] = &[Direction::Outbound];

        async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
            target
                .balancer()?
                .override_target_dyn(Some(self.0.clone()))
                .await
        }
    }

    #[derive(Default)]
    struct Balancer {
        pinned: Mutex<Option<String>>,
    }

    impl BalancerControl for Balancer {
        async fn override_target(&self, target: Option<String>) -> Result<(), BoxError> {
            *self.pinned.lock().unwrap() = target;
            Ok(())
        }

        fn current_override(&self) -> Option<String> {
            self.pinned.lock().unwrap().clone()
        }
    }

    #[tokio::test]
    async fn test_dyn_operation_forwards() {
        let op: Box<dyn DynOperation> = Box::new(PinTarget("direct".into()));
        assert_eq!(op.type_name(), "test.PinTarget");
        assert_eq!(op.capability(), Capability::Balancer);
        assert!(op.applies_to(Direction::Outbound));
        assert!(!op.applies_to(Direction::Inbound));

        let balancer = Balancer::default();
        op.apply_dyn(CapabilityRef::Balancer(&balancer))
            .await
            .unwrap();
        assert_eq!(balancer.current_override(), Some("direct".to_string()));
    }
}
