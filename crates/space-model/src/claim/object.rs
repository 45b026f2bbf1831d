use serde::{Deserialize, Serialize};

use crate::{ClaimParameters, ClaimUid, ClassParameters, ParametersRef};

/// The parts of a resource claim the driver looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClaim {
    pub uid: ClaimUid,
    pub name: String,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_ref: Option<ParametersRef>,
}

impl ResourceClaim {
    pub fn new(uid: impl Into<ClaimUid>, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            namespace: namespace.into(),
            parameters_ref: None,
        }
    }

    pub fn with_parameters_ref(mut self, r: ParametersRef) -> Self {
        self.parameters_ref = Some(r);
        self
    }
}

/// The parts of a resource class the driver looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceClass {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_ref: Option<ParametersRef>,
}

impl ResourceClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters_ref: None,
        }
    }
}

/// Pod being scheduled, used only for logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRef {
    pub namespace: String,
    pub name: String,
}

/// One claim of an allocation batch, with its parameters already resolved.
#[derive(Debug, Clone)]
pub struct ClaimAllocation {
    pub claim: ResourceClaim,
    pub class: ResourceClass,
    pub claim_parameters: ClaimParameters,
    pub class_parameters: ClassParameters,
}

impl ClaimAllocation {
    pub fn new(claim: ResourceClaim, class: ResourceClass, claim_parameters: ClaimParameters) -> Self {
        Self {
            claim,
            class,
            claim_parameters,
            class_parameters: ClassParameters,
        }
    }
}

/// Claim as delivered to the node agent by the kubelet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeClaim {
    pub uid: ClaimUid,
    pub namespace: String,
    pub name: String,
    /// Opaque handle produced by the controller (the backing namespace name).
    pub resource_handle: String,
}

impl NodeClaim {
    pub fn new(
        uid: impl Into<ClaimUid>,
        name: impl Into<String>,
        resource_handle: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            namespace: String::new(),
            name: name.into(),
            resource_handle: resource_handle.into(),
        }
    }
}
