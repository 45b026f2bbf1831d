//! Claim and class parameters.
//!
//! A claim may reference a typed parameters object. The set of kinds this
//! driver understands is closed: [`ParameterKind`] enumerates them and
//! [`ClaimParameters`] carries the resolved payload of each.
mod kind;
pub use kind::ParameterKind;

mod reference;
pub use reference::ParametersRef;

mod space;
pub use space::SpaceClaimParametersSpec;

#[cfg(feature = "crd")]
pub use space::SpaceClaimParameters;

/// Resolved, immutable claim parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClaimParameters {
    Space(SpaceClaimParametersSpec),
}

impl ClaimParameters {
    /// Parameters used when a claim has no parameters reference.
    pub fn default_space() -> Self {
        ClaimParameters::Space(SpaceClaimParametersSpec::default())
    }

    /// Name template for the backing namespace.
    pub fn generate_name(&self) -> &str {
        match self {
            ClaimParameters::Space(spec) => &spec.generate_name,
        }
    }

    pub fn kind(&self) -> ParameterKind {
        match self {
            ClaimParameters::Space(_) => ParameterKind::SpaceClaimParameters,
        }
    }
}

/// Resolved class parameters. This driver defines none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassParameters;
