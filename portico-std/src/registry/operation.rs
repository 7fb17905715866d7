//! Operation type table: stable type name to payload decoder.

use crate::operations::{AddUser, OverrideBalancerTarget, RemoveUser};
use portico_core::{BoxError, ControlError, DynOperation, Operation, TypedMessage};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Turns an opaque payload into a concrete operation.
pub type DecodeFn = fn(&[u8]) -> Result<Box<dyn DynOperation>, BoxError>;

/// Decodes a JSON payload into `T`.
pub fn decode_json<T>(bytes: &[u8]) -> Result<Box<dyn DynOperation>, BoxError>
where
    T: Operation + DeserializeOwned,
{
    let operation: T = serde_json::from_slice(bytes)?;
    Ok(Box::new(operation))
}

/// Errors raised while building an [`OperationRegistry`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A decoder is already registered under the name.
    #[error("operation type already registered: {0}")]
    DuplicateType(String),

    /// A name was referenced that has no decoder.
    #[error("operation type not registered: {0}")]
    UnknownType(String),
}

/// A decoder entry, submittable to the distributed `inventory` collection.
///
/// ```rust,ignore
/// inventory::submit! { OperationRegistration::of::<ResetQuota>() }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct OperationRegistration {
    /// Stable type name.
    pub type_name: &'static str,
    /// Decoder for the type's payloads.
    pub decode: DecodeFn,
}

impl OperationRegistration {
    /// Registration for `T`, decoding JSON payloads.
    pub const fn of<T>() -> Self
    where
        T: Operation + DeserializeOwned,
    {
        Self {
            type_name: T::TYPE_NAME,
            decode: decode_json::<T>,
        }
    }
}

#[cfg(feature = "inventory")]
inventory::collect!(OperationRegistration);

/// Resolves type-tagged payloads into operations.
///
/// Built once at startup with [`OperationRegistryBuilder`] and then shared
/// read-only, so lookups take no lock. Registration order never matters.
pub struct OperationRegistry {
    decoders: HashMap<String, DecodeFn>,
}

impl OperationRegistry {
    /// Start building a registry.
    pub fn builder() -> OperationRegistryBuilder {
        OperationRegistryBuilder::new()
    }

    /// A registry holding only the built-in operations.
    pub fn builtin() -> Self {
        Self::builder().with_builtin().build()
    }

    /// Decode `message` with the decoder registered under its type name.
    ///
    /// # Errors
    ///
    /// [`ControlError::UnknownOperation`] if the name is not registered,
    /// [`ControlError::Decode`] if the payload does not fit the type.
    pub fn resolve(&self, message: &TypedMessage) -> Result<Box<dyn DynOperation>, ControlError> {
        let decode = self
            .decoders
            .get(&message.type_name)
            .ok_or_else(|| ControlError::unknown_operation(&message.type_name))?;
        decode(&message.value).map_err(|source| ControlError::decode(&message.type_name, source))
    }

    /// Whether a decoder is registered under `type_name`.
    pub fn contains(&self, type_name: &str) -> bool {
        self.decoders.contains_key(type_name)
    }

    /// Registered type names, in no particular order.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.decoders.keys().map(String::as_str)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether no type is registered.
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Keep only the types named in `allowed`.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownType`] if `allowed` names an unregistered type.
    pub fn restrict<I, S>(mut self, allowed: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep = HashSet::new();
        for name in allowed {
            let name = name.as_ref();
            if !self.decoders.contains_key(name) {
                return Err(RegistryError::UnknownType(name.to_owned()));
            }
            keep.insert(name.to_owned());
        }
        self.decoders.retain(|name, _| keep.contains(name));
        Ok(self)
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<_> = self.type_names().collect();
        names.sort_unstable();
        f.debug_struct("OperationRegistry")
            .field("types", &names)
            .finish()
    }
}

/// Builder for constructing an [`OperationRegistry`].
#[derive(Default)]
pub struct OperationRegistryBuilder {
    decoders: HashMap<String, DecodeFn>,
}

impl OperationRegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `decode` under `type_name`.
    ///
    /// # Panics
    ///
    /// Panics if `type_name` is already registered. Type names are fixed at
    /// compile time, so a clash is a programming error.
    pub fn register(mut self, type_name: impl Into<String>, decode: DecodeFn) -> Self {
        if let Err(err) = self.try_register(type_name, decode) {
            panic!("{err}");
        }
        self
    }

    /// Register the JSON decoder for `T` under [`TypedOperation::TYPE_NAME`].
    ///
    /// # Panics
    ///
    /// Panics if the name is already registered.
    ///
    /// [`TypedOperation::TYPE_NAME`]: portico_core::TypedOperation::TYPE_NAME
    pub fn register_type<T>(self) -> Self
    where
        T: Operation + DeserializeOwned,
    {
        self.register(T::TYPE_NAME, decode_json::<T>)
    }

    /// Register `decode` under `type_name`, reporting a clash instead of
    /// panicking.
    pub fn try_register(
        &mut self,
        type_name: impl Into<String>,
        decode: DecodeFn,
    ) -> Result<(), RegistryError> {
        let type_name = type_name.into();
        if self.decoders.contains_key(&type_name) {
            return Err(RegistryError::DuplicateType(type_name));
        }
        tracing::trace!(%type_name, "registered operation type");
        self.decoders.insert(type_name, decode);
        Ok(())
    }

    /// Register every built-in operation.
    pub fn with_builtin(self) -> Self {
        self.register_type::<AddUser>()
            .register_type::<RemoveUser>()
            .register_type::<OverrideBalancerTarget>()
    }

    /// Register every operation submitted to the `inventory` collection.
    ///
    /// # Panics
    ///
    /// Panics if a collected name is already registered.
    #[cfg(feature = "inventory")]
    pub fn with_collected(mut self) -> Self {
        for registration in inventory::iter::<OperationRegistration> {
            self = self.register(registration.type_name, registration.decode);
        }
        self
    }

    /// Build the registry.
    pub fn build(self) -> OperationRegistry {
        OperationRegistry {
            decoders: self.decoders,
        }
    }
}
