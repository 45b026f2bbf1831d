use serde::{Deserialize, Serialize};

use crate::DRIVER_NAME;

/// Driver-specific payload attached to an allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceHandle {
    pub driver_name: String,
    pub data: String,
}

/// Outcome of a successful allocation, persisted on the claim by the framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationResult {
    pub shareable: bool,
    pub resource_handles: Vec<ResourceHandle>,
}

impl AllocationResult {
    /// Shareable allocation whose single handle names the backing namespace.
    pub fn for_space(namespace: impl Into<String>) -> Self {
        Self {
            shareable: true,
            resource_handles: vec![ResourceHandle {
                driver_name: DRIVER_NAME.to_string(),
                data: namespace.into(),
            }],
        }
    }

    /// Handle data produced by this driver, if any.
    pub fn handle(&self) -> Option<&str> {
        self.resource_handles
            .iter()
            .find(|h| h.driver_name == DRIVER_NAME)
            .map(|h| h.data.as_str())
    }
}
