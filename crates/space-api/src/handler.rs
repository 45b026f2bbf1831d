use std::collections::HashMap;

use async_trait::async_trait;
use space_core::error::AgentError;
use space_model::{ClaimUid, NodeClaim};

use crate::error::ApiError;

/// Qualified CDI device names per claim, or why the claim could not be prepared.
pub type PrepareResults = HashMap<ClaimUid, Result<Vec<String>, AgentError>>;

/// Per-claim outcome of an unprepare request.
pub type UnprepareResults = HashMap<ClaimUid, Result<(), AgentError>>;

/// Node plugin backend.
///
/// A returned `Err` rejects the whole request; a failing claim is reported
/// in its own map entry and does not affect the others.
#[async_trait]
pub trait NodeHandler: Send + Sync + 'static {
    async fn prepare_resources(&self, claims: Vec<NodeClaim>) -> Result<PrepareResults, ApiError>;

    async fn unprepare_resources(
        &self,
        claims: Vec<NodeClaim>,
    ) -> Result<UnprepareResults, ApiError>;
}
