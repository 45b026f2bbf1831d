use serde::{Deserialize, Serialize};

use crate::{DEFAULT_GENERATE_NAME, ModelError, ModelResult};

/// Longest name a namespace may have.
const MAX_NAMESPACE_NAME: usize = 63;

/// Characters the API server appends to a `generateName` prefix.
const GENERATED_SUFFIX_LEN: usize = 5;

/// Spec of the `SpaceClaimParameters` object.
///
/// With the `crd` feature this type also derives the namespaced
/// `SpaceClaimParameters` custom resource (`space.resource.example.com/v1alpha1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "crd", derive(kube::CustomResource))]
#[cfg_attr(
    feature = "crd",
    kube(
        group = "space.resource.example.com",
        version = "v1alpha1",
        kind = "SpaceClaimParameters",
        plural = "spaceclaimparameters",
        namespaced
    )
)]
#[serde(rename_all = "camelCase")]
pub struct SpaceClaimParametersSpec {
    /// Prefix for the generated namespace name.
    #[serde(default = "default_generate_name")]
    pub generate_name: String,
}

fn default_generate_name() -> String {
    DEFAULT_GENERATE_NAME.to_string()
}

impl Default for SpaceClaimParametersSpec {
    fn default() -> Self {
        Self {
            generate_name: default_generate_name(),
        }
    }
}

impl SpaceClaimParametersSpec {
    /// Check that `generate_name` can prefix a valid namespace name.
    pub fn validate(&self) -> ModelResult<()> {
        let prefix = &self.generate_name;
        if prefix.is_empty() {
            return Err(ModelError::Invalid("generateName must not be empty".into()));
        }
        if prefix.len() > MAX_NAMESPACE_NAME - GENERATED_SUFFIX_LEN {
            return Err(ModelError::Invalid(format!(
                "generateName {prefix:?} is longer than {} characters",
                MAX_NAMESPACE_NAME - GENERATED_SUFFIX_LEN
            )));
        }
        if !prefix.starts_with(|c: char| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err(ModelError::Invalid(format!(
                "generateName {prefix:?} must start with a lowercase alphanumeric character"
            )));
        }
        if !prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ModelError::Invalid(format!(
                "generateName {prefix:?} may only contain lowercase alphanumerics and '-'"
            )));
        }
        Ok(())
    }
}
