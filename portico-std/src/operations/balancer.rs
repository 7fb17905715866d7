//! Balancer steering for outbound handlers.

use portico_core::{BoxError, Capability, CapabilityRef, Direction, Operation, TypedOperation};
use serde::{Deserialize, Serialize};

/// Pins an outbound handler's balancer to one target.
///
/// An empty `target` clears the override and restores normal selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideBalancerTarget {
    /// Tag of the target to pin; empty to clear.
    #[serde(default)]
    pub target: String,
}

impl TypedOperation for OverrideBalancerTarget {
    const TYPE_NAME: &'static str = "portico.command.OverrideBalancerTargetOperation";
}

impl Operation for OverrideBalancerTarget {
    const CAPABILITY: Capability = Capability::Balancer;
    const DIRECTIONS: &'static [Direction] = &[Direction::Outbound];

    async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
        let pinned = (!self.target.is_empty()).then(|| self.target.clone());
        target.balancer()?.override_target_dyn(pinned).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockBalancerHandler;
    use portico_core::DynOperation;

    #[tokio::test]
    async fn test_override_and_clear() {
        let handler = MockBalancerHandler::new("balanced");
        let target = || Capability::Balancer.resolve(&handler).unwrap();

        OverrideBalancerTarget {
            target: "direct".into(),
        }
        .apply(target())
        .await
        .unwrap();
        assert_eq!(handler.pinned(), Some("direct".to_string()));

        OverrideBalancerTarget {
            target: String::new(),
        }
        .apply(target())
        .await
        .unwrap();
        assert_eq!(handler.pinned(), None);
    }

    #[test]
    fn test_outbound_only() {
        let op = OverrideBalancerTarget {
            target: "direct".into(),
        };
        assert!(op.applies_to(Direction::Outbound));
        assert!(!op.applies_to(Direction::Inbound));
    }
}
