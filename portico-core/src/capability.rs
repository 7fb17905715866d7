//! # Capability Contracts
//!
//! Sub-interfaces a [`ProxyHandler`](crate::ProxyHandler) may expose.
//!
//! Each contract comes in two forms, following the same split as the
//! operation traits:
//!
//! - A static trait using native `async fn` ([`UserManager`],
//!   [`BalancerControl`]) that handler authors implement.
//! - An object-safe twin ([`DynUserManager`], [`DynBalancerControl`]) that
//!   the probes return. Every static implementation gets the dynamic one for
//!   free through a blanket impl.
//!
//! # Concurrency
//!
//! The control plane does not serialize operations against one handler. Two
//! alter requests for the same tag may run at the same time, so
//! implementations must guard their own state.

use crate::error::BoxError;
use crate::user::MemoryUser;
use std::{future::Future, pin::Pin};

/// A boxed, sendable future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Manages the set of users authorized on a handler.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `UserManager`",
    label = "missing `UserManager` implementation",
    note = "Handlers that accept user operations must implement `UserManager`."
)]
pub trait UserManager: Send + Sync + 'static {
    /// Installs a user. Fails if a user with the same email already exists.
    fn add_user(&self, user: MemoryUser) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Removes the user keyed by `email`. Fails if no such user exists.
    fn remove_user(&self, email: &str) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Looks a user up by email.
    fn get_user(&self, email: &str) -> impl Future<Output = Option<MemoryUser>> + Send;

    /// Number of users currently installed.
    fn user_count(&self) -> impl Future<Output = usize> + Send;
}

/// Object-safe version of [`UserManager`].
pub trait DynUserManager: Send + Sync + 'static {
    /// See [`UserManager::add_user`].
    fn add_user_dyn(&self, user: MemoryUser) -> BoxFuture<'_, Result<(), BoxError>>;

    /// See [`UserManager::remove_user`].
    fn remove_user_dyn<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), BoxError>>;

    /// See [`UserManager::get_user`].
    fn get_user_dyn<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Option<MemoryUser>>;

    /// See [`UserManager::user_count`].
    fn user_count_dyn(&self) -> BoxFuture<'_, usize>;
}

impl<T: UserManager> DynUserManager for T {
    fn add_user_dyn(&self, user: MemoryUser) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(self.add_user(user))
    }

    fn remove_user_dyn<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Result<(), BoxError>> {
        Box::pin(self.remove_user(email))
    }

    fn get_user_dyn<'a>(&'a self, email: &'a str) -> BoxFuture<'a, Option<MemoryUser>> {
        Box::pin(self.get_user(email))
    }

    fn user_count_dyn(&self) -> BoxFuture<'_, usize> {
        Box::pin(self.user_count())
    }
}

/// Steers the target chosen by a handler's internal load balancer.
#[diagnostic::on_unimplemented(
    message = "`{Self}` does not implement `BalancerControl`",
    label = "missing `BalancerControl` implementation",
    note = "Handlers that accept balancer operations must implement `BalancerControl`."
)]
pub trait BalancerControl: Send + Sync + 'static {
    /// Pins the balancer to `target`, or restores normal selection on `None`.
    fn override_target(
        &self,
        target: Option<String>,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// The target currently pinned, if any.
    fn current_override(&self) -> Option<String>;
}

/// Object-safe version of [`BalancerControl`].
pub trait DynBalancerControl: Send + Sync + 'static {
    /// See [`BalancerControl::override_target`].
    fn override_target_dyn(&self, target: Option<String>) -> BoxFuture<'_, Result<(), BoxError>>;

    /// See [`BalancerControl::current_override`].
    fn current_override_dyn(&self) -> Option<String>;
}

impl<T: BalancerControl> DynBalancerControl for T {
    fn override_target_dyn(&self, target: Option<String>) -> BoxFuture<'_, Result<(), BoxError>> {
        Box::pin(self.override_target(target))
    }

    fn current_override_dyn(&self) -> Option<String> {
        self.current_override()
    }
}
