use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::debug;

use crate::{
    convert,
    handler::NodeHandler,
    proto::{self, node_server::Node},
};

/// gRPC service implementation.
///
/// Wraps a [`NodeHandler`] and implements the generated `v1alpha3.Node` trait.
pub struct DraNodeService<H> {
    handler: Arc<H>,
}

impl<H> DraNodeService<H>
where
    H: NodeHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }
}

#[tonic::async_trait]
impl<H> Node for DraNodeService<H>
where
    H: NodeHandler,
{
    async fn node_prepare_resources(
        &self,
        request: Request<proto::NodePrepareResourcesRequest>,
    ) -> Result<Response<proto::NodePrepareResourcesResponse>, Status> {
        let claims = convert::node_claims(request.into_inner().claims)?;
        debug!(claims = claims.len(), "NodePrepareResources");

        let results = self.handler.prepare_resources(claims).await?;

        Ok(Response::new(convert::prepare_response(results)))
    }

    async fn node_unprepare_resources(
        &self,
        request: Request<proto::NodeUnprepareResourcesRequest>,
    ) -> Result<Response<proto::NodeUnprepareResourcesResponse>, Status> {
        let claims = convert::node_claims(request.into_inner().claims)?;
        debug!(claims = claims.len(), "NodeUnprepareResources");

        let results = self.handler.unprepare_resources(claims).await?;

        Ok(Response::new(convert::unprepare_response(results)))
    }
}
