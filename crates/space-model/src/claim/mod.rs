//! Claim-side objects exchanged with the claim-binding framework and the kubelet.
mod allocation;
pub use allocation::{AllocationResult, ResourceHandle};

mod object;
pub use object::{ClaimAllocation, NodeClaim, PodRef, ResourceClaim, ResourceClass};
