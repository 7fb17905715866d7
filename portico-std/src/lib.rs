//! # portico-std
//!
//! Standard building blocks for the Portico handler control plane.
//!
//! This crate provides:
//! - **Registries**: [`TaggedRegistry`] for per-direction configuration
//!   snapshots, [`OperationRegistry`] for operation type lookup
//! - **Operations**: [`AddUser`], [`RemoveUser`], [`OverrideBalancerTarget`]
//! - **Request scoping**: [`RequestContext`] for cancellation and deadlines
//! - **Testing**: in-memory engines and handlers in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core contracts
pub use portico_core;

// Modules
pub mod context;
pub mod operations;
pub mod registry;
pub mod testing;

pub use context::RequestContext;
pub use operations::{AddUser, OverrideBalancerTarget, RemoveUser};
pub use registry::{
    DecodeFn, HandlerEntry, Insertion, OperationRegistration, OperationRegistry,
    OperationRegistryBuilder, RegistryError, TaggedRegistry, decode_json,
};
pub use tokio_util::sync::CancellationToken;

#[cfg(feature = "inventory")]
pub use inventory;
