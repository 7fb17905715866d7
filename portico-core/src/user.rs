//! User records carried by user-management operations.
//!
//! [`User`] is the wire form sent by the operator; [`MemoryUser`] is the
//! validated form handed to a [`UserManager`](crate::UserManager).

use crate::typed::TypedMessage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A user record as it arrives in an operation payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique key of the user within a handler.
    #[serde(default)]
    pub email: String,
    /// Policy level applied to the user's connections.
    #[serde(default)]
    pub level: u32,
    /// Protocol-specific account settings, opaque to the control plane.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<TypedMessage>,
}

impl User {
    /// Create a user with the given email and level and no account settings.
    pub fn new(email: impl Into<String>, level: u32) -> Self {
        Self {
            email: email.into(),
            level,
            account: None,
        }
    }

    /// Attach protocol-specific account settings.
    pub fn with_account(mut self, account: TypedMessage) -> Self {
        self.account = Some(account);
        self
    }

    /// Validate the record and convert it into its in-memory form.
    ///
    /// # Errors
    ///
    /// Returns [`UserError`] if the email is empty or contains whitespace, or
    /// if the account settings carry no type name.
    pub fn to_memory_user(&self) -> Result<MemoryUser, UserError> {
        if self.email.is_empty() {
            return Err(UserError::MissingEmail);
        }
        if self.email.chars().any(char::is_whitespace) {
            return Err(UserError::InvalidEmail(self.email.clone()));
        }
        if let Some(account) = &self.account {
            if account.type_name.is_empty() {
                return Err(UserError::UntypedAccount(self.email.clone()));
            }
        }
        Ok(MemoryUser {
            email: self.email.clone(),
            level: self.level,
            account: self.account.clone(),
        })
    }
}

/// A validated user, ready to be installed into a handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryUser {
    /// Unique key of the user within a handler.
    pub email: String,
    /// Policy level applied to the user's connections.
    pub level: u32,
    /// Protocol-specific account settings.
    pub account: Option<TypedMessage>,
}

/// Reasons a [`User`] record is rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// The record has no email.
    #[error("user has no email")]
    MissingEmail,

    /// The email contains whitespace.
    #[error("invalid user email: {0:?}")]
    InvalidEmail(String),

    /// The account settings have an empty type name.
    #[error("account settings of user {0} carry no type")]
    UntypedAccount(String),
}
