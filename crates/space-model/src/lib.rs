mod domain;
pub use domain::*;

mod error;
pub use error::{ModelError, ModelResult};

mod params;
pub use params::{
    ClaimParameters, ClassParameters, ParameterKind, ParametersRef, SpaceClaimParametersSpec,
};

#[cfg(feature = "crd")]
pub use params::SpaceClaimParameters;

mod claim;
pub use claim::{
    AllocationResult, ClaimAllocation, NodeClaim, PodRef, ResourceClaim, ResourceClass,
    ResourceHandle,
};

pub mod cdi;
