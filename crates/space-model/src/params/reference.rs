use serde::{Deserialize, Serialize};

use crate::{DRIVER_API_GROUP, ModelError, ModelResult, ParameterKind};

/// Reference from a claim (or class) to a typed parameters object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParametersRef {
    /// API group of the referenced object. Empty means the core group.
    #[serde(default)]
    pub api_group: String,
    pub kind: String,
    pub name: String,
}

impl ParametersRef {
    pub fn new(
        api_group: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            api_group: api_group.into(),
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Check the group against the driver's own group, then map the kind.
    ///
    /// Group is checked first: a foreign group is rejected whatever its kind.
    pub fn resolve_kind(&self) -> ModelResult<ParameterKind> {
        if self.api_group != DRIVER_API_GROUP {
            return Err(ModelError::InvalidApiGroup(self.api_group.clone()));
        }
        self.kind.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_driver_group_and_known_kind() {
        let r = ParametersRef::new(DRIVER_API_GROUP, "SpaceClaimParameters", "p");
        assert_eq!(r.resolve_kind().unwrap(), ParameterKind::SpaceClaimParameters);
    }

    #[test]
    fn foreign_group_wins_over_unknown_kind() {
        let r = ParametersRef::new("gpu.example.com", "Whatever", "p");
        assert!(matches!(r.resolve_kind(), Err(ModelError::InvalidApiGroup(g)) if g == "gpu.example.com"));
    }

    #[test]
    fn core_group_is_rejected() {
        let r = ParametersRef::new("", "ConfigMap", "p");
        assert!(matches!(r.resolve_kind(), Err(ModelError::InvalidApiGroup(_))));
    }

    #[test]
    fn unknown_kind_in_driver_group() {
        let r = ParametersRef::new(DRIVER_API_GROUP, "GpuClaimParameters", "p");
        assert!(matches!(
            r.resolve_kind(),
            Err(ModelError::UnknownParameterKind(k)) if k == "GpuClaimParameters"
        ));
    }
}
