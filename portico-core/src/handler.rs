//! # Live Handlers and Capability Probes
//!
//! A live handler is an inbound listener or outbound connector owned by the
//! proxy engine. The control plane never sees concrete proxy types: it only
//! talks to [`ProxyHandler`], whose probe methods answer "does this handler
//! also manage users?" or "does it steer a balancer?" by returning an optional
//! reference to the matching sub-interface.
//!
//! Probes are resolved once per request through [`Capability::resolve`],
//! producing a [`CapabilityRef`] that an operation then applies itself to.

use crate::capability::{DynBalancerControl, DynUserManager};
use crate::error::CapabilityMismatch;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Which side of the engine a handler sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Listening endpoints accepting client traffic.
    Inbound,
    /// Connecting endpoints carrying traffic onward.
    Outbound,
}

impl Direction {
    /// Both directions, inbound first.
    pub const ALL: &'static [Direction] = &[Direction::Inbound, Direction::Outbound];

    /// Lowercase name, as used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ability an operation may require from its target handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Adds and removes authorized users.
    UserManager,
    /// Overrides the target picked by an internal load balancer.
    Balancer,
}

impl Capability {
    /// The flag that represents this capability in a [`Capabilities`] set.
    pub const fn flag(self) -> Capabilities {
        match self {
            Capability::UserManager => Capabilities::USER_MANAGER,
            Capability::Balancer => Capabilities::BALANCER,
        }
    }

    /// Probes `handler` for this capability.
    pub fn resolve(self, handler: &dyn ProxyHandler) -> Option<CapabilityRef<'_>> {
        match self {
            Capability::UserManager => handler.user_manager().map(CapabilityRef::UserManager),
            Capability::Balancer => handler.balancer().map(CapabilityRef::Balancer),
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Capability::UserManager => "user manager",
            Capability::Balancer => "balancer",
        })
    }
}

bitflags! {
    /// Summary of everything a handler exposes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// The handler is an inbound endpoint.
        const INBOUND = 1 << 0;
        /// The handler is an outbound endpoint.
        const OUTBOUND = 1 << 1;
        /// The handler manages a set of users.
        const USER_MANAGER = 1 << 2;
        /// The handler steers a load balancer.
        const BALANCER = 1 << 3;
    }
}

impl From<Direction> for Capabilities {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Inbound => Capabilities::INBOUND,
            Direction::Outbound => Capabilities::OUTBOUND,
        }
    }
}

/// A running handler as seen by the control plane.
///
/// Handlers are owned by the engine; the control plane only borrows them for
/// the duration of a single request.
///
/// # Probes
///
/// Handlers that implement a capability return `Some(self)` from the matching
/// probe:
///
/// ```rust,ignore
/// impl ProxyHandler for VmessInbound {
///     fn tag(&self) -> &str { &self.tag }
///     fn direction(&self) -> Direction { Direction::Inbound }
///     fn user_manager(&self) -> Option<&dyn DynUserManager> { Some(self) }
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `ProxyHandler`",
    label = "missing `ProxyHandler` implementation",
    note = "Live handlers must report their tag and direction."
)]
pub trait ProxyHandler: Send + Sync + 'static {
    /// The operator-assigned tag; empty for anonymous handlers.
    fn tag(&self) -> &str;

    /// Whether this handler is an inbound or outbound endpoint.
    fn direction(&self) -> Direction;

    /// User management, if the handler supports it.
    fn user_manager(&self) -> Option<&dyn DynUserManager> {
        None
    }

    /// Balancer control, if the handler supports it.
    fn balancer(&self) -> Option<&dyn DynBalancerControl> {
        None
    }

    /// Everything this handler exposes, derived from the probes.
    fn capabilities(&self) -> Capabilities {
        let mut caps = Capabilities::from(self.direction());
        if self.user_manager().is_some() {
            caps |= Capabilities::USER_MANAGER;
        }
        if self.balancer().is_some() {
            caps |= Capabilities::BALANCER;
        }
        caps
    }
}

/// A resolved capability of one handler.
#[derive(Clone, Copy)]
pub enum CapabilityRef<'a> {
    /// The handler's user manager.
    UserManager(&'a dyn DynUserManager),
    /// The handler's balancer control.
    Balancer(&'a dyn DynBalancerControl),
}

impl<'a> CapabilityRef<'a> {
    /// Which capability this is.
    pub fn capability(&self) -> Capability {
        match self {
            CapabilityRef::UserManager(_) => Capability::UserManager,
            CapabilityRef::Balancer(_) => Capability::Balancer,
        }
    }

    /// The user manager, or a mismatch error.
    pub fn user_manager(self) -> Result<&'a dyn DynUserManager, CapabilityMismatch> {
        match self {
            CapabilityRef::UserManager(manager) => Ok(manager),
            other => Err(CapabilityMismatch {
                expected: Capability::UserManager,
                actual: other.capability(),
            }),
        }
    }

    /// The balancer control, or a mismatch error.
    pub fn balancer(self) -> Result<&'a dyn DynBalancerControl, CapabilityMismatch> {
        match self {
            CapabilityRef::Balancer(balancer) => Ok(balancer),
            other => Err(CapabilityMismatch {
                expected: Capability::Balancer,
                actual: other.capability(),
            }),
        }
    }
}

impl std::fmt::Debug for CapabilityRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CapabilityRef")
            .field(&self.capability())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bare;

    impl ProxyHandler for Bare {
        fn tag(&self) -> &str {
            "bare"
        }

        fn direction(&self) -> Direction {
            Direction::Outbound
        }
    }

    #[test]
    fn test_bare_handler_has_only_direction() {
        let handler = Bare;
        assert_eq!(handler.capabilities(), Capabilities::OUTBOUND);
        assert!(Capability::UserManager.resolve(&handler).is_none());
        assert!(Capability::Balancer.resolve(&handler).is_none());
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(Direction::Inbound.to_string(), "inbound");
        assert_eq!(Direction::Outbound.to_string(), "outbound");
        assert_eq!(Capability::UserManager.flag(), Capabilities::USER_MANAGER);
    }
}
