use async_trait::async_trait;
use space_core::agent::SpaceNodeAgent;
use space_model::NodeClaim;
use tokio_util::sync::CancellationToken;

use crate::{
    error::ApiError,
    handler::{NodeHandler, PrepareResults, UnprepareResults},
};

/// Adapter that bridges [`SpaceNodeAgent`] to [`NodeHandler`].
///
/// Cancelling `shutdown` aborts in-flight claim operations and makes new
/// requests fail with [`ApiError::ShuttingDown`].
pub struct NodeAgentAdapter {
    agent: SpaceNodeAgent,
    shutdown: CancellationToken,
}

impl NodeAgentAdapter {
    pub fn new(agent: SpaceNodeAgent, shutdown: CancellationToken) -> Self {
        Self { agent, shutdown }
    }

    fn check_running(&self) -> Result<(), ApiError> {
        if self.shutdown.is_cancelled() {
            return Err(ApiError::ShuttingDown);
        }
        Ok(())
    }
}

#[async_trait]
impl NodeHandler for NodeAgentAdapter {
    async fn prepare_resources(&self, claims: Vec<NodeClaim>) -> Result<PrepareResults, ApiError> {
        self.check_running()?;
        Ok(self.agent.prepare_resources(claims, &self.shutdown).await)
    }

    async fn unprepare_resources(
        &self,
        claims: Vec<NodeClaim>,
    ) -> Result<UnprepareResults, ApiError> {
        self.check_running()?;
        Ok(self.agent.unprepare_resources(claims, &self.shutdown).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use space_core::testing::{MemoryArtifacts, MemorySpecs};
    use space_model::ClaimUid;

    use super::*;

    fn adapter() -> (NodeAgentAdapter, Arc<MemorySpecs>, CancellationToken) {
        let specs = Arc::new(MemorySpecs::new());
        let agent = SpaceNodeAgent::new(
            specs.clone(),
            Arc::new(MemoryArtifacts::new()),
            "https://kubernetes.default.svc",
        );
        let shutdown = CancellationToken::new();
        (NodeAgentAdapter::new(agent, shutdown.clone()), specs, shutdown)
    }

    #[tokio::test]
    async fn delegates_to_the_agent() {
        let (adapter, specs, _) = adapter();
        let claims = vec![NodeClaim::new("c-1", "first", "space-00001")];

        let prepared = adapter.prepare_resources(claims.clone()).await.unwrap();
        let devices = prepared[&ClaimUid::from("c-1")].as_ref().unwrap();
        assert_eq!(devices.len(), 2);
        assert_eq!(specs.names().len(), 1);

        let unprepared = adapter.unprepare_resources(claims).await.unwrap();
        assert!(unprepared[&ClaimUid::from("c-1")].is_ok());
        assert!(specs.names().is_empty());
    }

    #[tokio::test]
    async fn rejects_requests_after_shutdown() {
        let (adapter, specs, shutdown) = adapter();
        shutdown.cancel();

        let claims = vec![NodeClaim::new("c-1", "first", "space-00001")];
        let err = adapter.prepare_resources(claims.clone()).await.unwrap_err();
        assert!(matches!(err, ApiError::ShuttingDown));
        let err = adapter.unprepare_resources(claims).await.unwrap_err();
        assert!(matches!(err, ApiError::ShuttingDown));
        assert!(specs.names().is_empty());
    }
}
