//! Registries owned by the control plane.
//!
//! - [`TaggedRegistry`]: the tag-indexed configuration snapshots of one
//!   direction, guarded by its own lock.
//! - [`OperationRegistry`]: the write-once table mapping operation type names
//!   to payload decoders.

pub mod operation;
pub mod tagged;

pub use operation::{
    DecodeFn, OperationRegistration, OperationRegistry, OperationRegistryBuilder, RegistryError,
    decode_json,
};
pub use tagged::{HandlerEntry, Insertion, TaggedRegistry};
