use space_model::{ClaimUid, ModelError};
use thiserror::Error;

/// Failure reported by an external store (namespaces, parameters, CDI specs, artifacts).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: &'static str },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Encode(String),

    #[error("backend error: {0}")]
    Backend(String),
}

/// Errors returned by the controller entry points.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("invalid parameters reference: {0}")]
    InvalidReference(String),

    #[error("unknown ResourceClaim.ParametersRef.Kind: {0}")]
    UnknownParameterKind(String),

    #[error("invalid claim parameters: {0}")]
    InvalidParameters(String),

    #[error("error getting {kind} called '{name}' in namespace '{namespace}': {source}")]
    UpstreamFetch {
        kind: &'static str,
        namespace: String,
        name: String,
        #[source]
        source: StoreError,
    },

    #[error("immediate allocation is not supported (claim {claim} has no selected node)")]
    ImmediateAllocationUnsupported { claim: ClaimUid },

    #[error("provisioning of claim {claim} failed to {step}: {source}")]
    Provisioning {
        claim: ClaimUid,
        step: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("teardown of claim {claim} failed to {step}: {source}")]
    Teardown {
        claim: ClaimUid,
        step: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("more than one namespace found for claim {claim}: {names:?}")]
    ConsistencyViolation { claim: ClaimUid, names: Vec<String> },

    #[error("operation on claim {claim} was canceled")]
    Canceled { claim: ClaimUid },
}

impl ControllerError {
    /// Whether the reconciliation loop may retry the same request as is.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ControllerError::UpstreamFetch { .. }
                | ControllerError::Provisioning { .. }
                | ControllerError::Teardown { .. }
                | ControllerError::Canceled { .. }
        )
    }

    /// Short label used for metrics and structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ControllerError::InvalidReference(_) => "invalid_reference",
            ControllerError::UnknownParameterKind(_) => "unknown_parameter_kind",
            ControllerError::InvalidParameters(_) => "invalid_parameters",
            ControllerError::UpstreamFetch { .. } => "upstream_fetch",
            ControllerError::ImmediateAllocationUnsupported { .. } => "immediate_allocation",
            ControllerError::Provisioning { .. } => "provisioning",
            ControllerError::Teardown { .. } => "teardown",
            ControllerError::ConsistencyViolation { .. } => "consistency_violation",
            ControllerError::Canceled { .. } => "canceled",
        }
    }
}

impl From<ModelError> for ControllerError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::InvalidApiGroup(group) => {
                ControllerError::InvalidReference(format!("incorrect API group: {group:?}"))
            }
            ModelError::UnknownParameterKind(kind) => ControllerError::UnknownParameterKind(kind),
            other => ControllerError::InvalidParameters(other.to_string()),
        }
    }
}

/// Errors returned by the node agent for a single claim.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("invalid resource handle for claim {claim}: {source}")]
    InvalidHandle {
        claim: ClaimUid,
        #[source]
        source: ModelError,
    },

    #[error("invalid claim name for claim {claim}: {source}")]
    InvalidName {
        claim: ClaimUid,
        #[source]
        source: ModelError,
    },

    #[error("unable to create claim artifacts for {claim}: {source}")]
    CreateArtifacts {
        claim: ClaimUid,
        #[source]
        source: StoreError,
    },

    #[error("unable to create CDI spec file {spec} for claim {claim}: {source}")]
    WriteSpec {
        claim: ClaimUid,
        spec: String,
        #[source]
        source: StoreError,
    },

    #[error("unable to remove claim artifacts for {claim}: {source}")]
    RemoveArtifacts {
        claim: ClaimUid,
        #[source]
        source: StoreError,
    },

    #[error("unable to delete CDI spec file {spec} for claim {claim}: {source}")]
    RemoveSpec {
        claim: ClaimUid,
        spec: String,
        #[source]
        source: StoreError,
    },

    #[error("unable to create CDI spec file for common edits: {0}")]
    CommonSpec(#[source] StoreError),

    #[error("operation on claim {claim} was canceled")]
    Canceled { claim: ClaimUid },
}

impl AgentError {
    pub fn kind(&self) -> &'static str {
        match self {
            AgentError::InvalidHandle { .. } => "invalid_handle",
            AgentError::InvalidName { .. } => "invalid_name",
            AgentError::CreateArtifacts { .. } => "create_artifacts",
            AgentError::WriteSpec { .. } => "write_spec",
            AgentError::RemoveArtifacts { .. } => "remove_artifacts",
            AgentError::RemoveSpec { .. } => "remove_spec",
            AgentError::CommonSpec(_) => "common_spec",
            AgentError::Canceled { .. } => "canceled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_errors_are_terminal() {
        let uid = ClaimUid::from("c-1");
        assert!(!ControllerError::InvalidReference("x".into()).is_retryable());
        assert!(!ControllerError::UnknownParameterKind("x".into()).is_retryable());
        assert!(!ControllerError::ImmediateAllocationUnsupported { claim: uid.clone() }.is_retryable());
        assert!(
            !ControllerError::ConsistencyViolation {
                claim: uid.clone(),
                names: vec![]
            }
            .is_retryable()
        );
        assert!(
            ControllerError::Provisioning {
                claim: uid,
                step: "create namespace",
                source: StoreError::Backend("boom".into()),
            }
            .is_retryable()
        );
    }

    #[test]
    fn model_errors_map_to_taxonomy() {
        let e: ControllerError = ModelError::InvalidApiGroup("other.io".into()).into();
        assert!(matches!(e, ControllerError::InvalidReference(ref m) if m.contains("other.io")));

        let e: ControllerError = ModelError::UnknownParameterKind("Foo".into()).into();
        assert!(matches!(e, ControllerError::UnknownParameterKind(ref k) if k == "Foo"));

        let e: ControllerError = ModelError::Invalid("bad".into()).into();
        assert_eq!(e.kind(), "invalid_parameters");
    }

    #[test]
    fn messages_carry_claim_context() {
        let e = AgentError::WriteSpec {
            claim: ClaimUid::from("c-7"),
            spec: "vendor-class_c-7".into(),
            source: StoreError::Backend("disk full".into()),
        };
        let msg = e.to_string();
        assert!(msg.contains("c-7"));
        assert!(msg.contains("disk full"));
    }
}
