//! # portico-core
//!
//! Core contracts for the Portico handler control plane.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! engines and handler implementations that don't need the registries in
//! `portico-std`.
//!
//! # Contracts
//!
//! ## Handlers ([`ProxyHandler`])
//!
//! A live inbound or outbound endpoint owned by the engine. Handlers expose
//! optional capabilities through probe methods instead of runtime downcasts.
//!
//! ## Capabilities ([`UserManager`], [`BalancerControl`])
//!
//! Sub-interfaces a handler may implement. Each has an object-safe twin
//! ([`DynUserManager`], [`DynBalancerControl`]) returned by the probes.
//!
//! ## Operations ([`Operation`])
//!
//! Typed mutations decoded from a [`TypedMessage`]. An operation declares the
//! capability it needs and applies itself through a [`CapabilityRef`].
//!
//! ## Engine ([`HandlerManager`])
//!
//! The engine-side bookkeeping the control plane drives: instantiate, add,
//! look up and remove handlers by tag.
//!
//! # Error Types
//!
//! - [`ControlError`] - Every failure a control request reports
//! - [`UserError`] - Rejected user records
//! - [`CapabilityMismatch`] - An operation received the wrong capability

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod capability;
mod engine;
mod error;
mod handler;
mod operation;
mod typed;
mod user;

// Re-exports
pub use capability::{BalancerControl, BoxFuture, DynBalancerControl, DynUserManager, UserManager};
pub use engine::{HandlerConfig, HandlerManager};
pub use error::{BoxError, CapabilityMismatch, ControlError, EngineAction, ErrorKind, Target};
pub use handler::{Capabilities, Capability, CapabilityRef, Direction, ProxyHandler};
pub use operation::{DynOperation, Operation, TypedOperation};
pub use typed::TypedMessage;
pub use user::{MemoryUser, User, UserError};
