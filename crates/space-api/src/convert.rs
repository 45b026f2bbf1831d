use std::collections::HashSet;

use space_model::{ClaimUid, NodeClaim};

use crate::{
    error::ApiError,
    handler::{PrepareResults, UnprepareResults},
    proto,
};

impl TryFrom<proto::Claim> for NodeClaim {
    type Error = ApiError;

    fn try_from(claim: proto::Claim) -> Result<Self, Self::Error> {
        if claim.uid.trim().is_empty() {
            return Err(ApiError::InvalidRequest("claim uid cannot be empty".into()));
        }
        Ok(NodeClaim {
            uid: ClaimUid::from(claim.uid),
            namespace: claim.namespace,
            name: claim.name,
            resource_handle: claim.resource_handle,
        })
    }
}

/// Convert the claims of a request. Responses are keyed by uid, so a uid
/// may appear only once.
pub(crate) fn node_claims(claims: Vec<proto::Claim>) -> Result<Vec<NodeClaim>, ApiError> {
    let mut seen = HashSet::with_capacity(claims.len());
    claims
        .into_iter()
        .map(|c| {
            let claim = NodeClaim::try_from(c)?;
            if !seen.insert(claim.uid.clone()) {
                return Err(ApiError::InvalidRequest(format!(
                    "claim {} listed more than once",
                    claim.uid
                )));
            }
            Ok(claim)
        })
        .collect()
}

pub(crate) fn prepare_response(results: PrepareResults) -> proto::NodePrepareResourcesResponse {
    let claims = results
        .into_iter()
        .map(|(uid, res)| {
            let rsp = match res {
                Ok(cdi_devices) => proto::NodePrepareResourceResponse {
                    cdi_devices,
                    error: String::new(),
                },
                Err(e) => proto::NodePrepareResourceResponse {
                    cdi_devices: Vec::new(),
                    error: e.to_string(),
                },
            };
            (uid.to_string(), rsp)
        })
        .collect();
    proto::NodePrepareResourcesResponse { claims }
}

pub(crate) fn unprepare_response(
    results: UnprepareResults,
) -> proto::NodeUnprepareResourcesResponse {
    let claims = results
        .into_iter()
        .map(|(uid, res)| {
            let error = res.err().map(|e| e.to_string()).unwrap_or_default();
            (uid.to_string(), proto::NodeUnprepareResourceResponse { error })
        })
        .collect();
    proto::NodeUnprepareResourcesResponse { claims }
}
