//! Service configuration.

use super::ServiceError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_tag() -> String {
    "api".to_owned()
}

/// Settings of the handler service.
///
/// ```json
/// {"tag":"api","request_timeout_ms":5000,"operations":["portico.command.AddUserOperation"]}
/// ```
///
/// Every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Tag the control service is known by.
    #[serde(default = "default_tag")]
    pub tag: String,

    /// Deadline applied to requests whose context sets none. Zero disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_ms: Option<u64>,

    /// Operation type names the service accepts. Unset accepts every
    /// registered type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations: Option<Vec<String>>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            tag: default_tag(),
            request_timeout_ms: None,
            operations: None,
        }
    }
}

impl ServiceConfig {
    /// Parse a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ServiceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The default request deadline, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }
}
