//! User management operations.

use portico_core::{BoxError, Capability, CapabilityRef, Operation, TypedOperation, User};
use serde::{Deserialize, Serialize};

/// Installs a user on a handler.
///
/// The record is validated before the handler sees it; a malformed record
/// fails with a [`UserError`](portico_core::UserError) and leaves the
/// handler untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUser {
    /// The user to install.
    pub user: User,
}

impl TypedOperation for AddUser {
    const TYPE_NAME: &'static str = "portico.command.AddUserOperation";
}

impl Operation for AddUser {
    const CAPABILITY: Capability = Capability::UserManager;

    async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
        let manager = target.user_manager()?;
        let user = self.user.to_memory_user()?;
        manager.add_user_dyn(user).await
    }
}

/// Removes a user, keyed by email, from a handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveUser {
    /// Email of the user to remove.
    pub email: String,
}

impl TypedOperation for RemoveUser {
    const TYPE_NAME: &'static str = "portico.command.RemoveUserOperation";
}

impl Operation for RemoveUser {
    const CAPABILITY: Capability = Capability::UserManager;

    async fn apply(&self, target: CapabilityRef<'_>) -> Result<(), BoxError> {
        target.user_manager()?.remove_user_dyn(&self.email).await
    }
}
