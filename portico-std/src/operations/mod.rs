//! Built-in operations.
//!
//! | Operation | Capability | Directions |
//! |-----------|------------|------------|
//! | [`AddUser`] | user manager | inbound, outbound |
//! | [`RemoveUser`] | user manager | inbound, outbound |
//! | [`OverrideBalancerTarget`] | balancer | outbound |

mod balancer;
mod user;

pub use balancer::OverrideBalancerTarget;
pub use user::{AddUser, RemoveUser};
