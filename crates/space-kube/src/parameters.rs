use async_trait::async_trait;
use kube::{Api, Client, CustomResourceExt};
use space_core::{error::StoreError, store::ParametersSource};
use space_model::{SpaceClaimParameters, SpaceClaimParametersSpec};

use crate::error::store_error;

/// Typed fetch of `SpaceClaimParameters` objects.
#[derive(Clone)]
pub struct KubeParameters {
    client: Client,
}

impl KubeParameters {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParametersSource for KubeParameters {
    async fn space_claim_parameters(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<SpaceClaimParametersSpec, StoreError> {
        let api: Api<SpaceClaimParameters> = Api::namespaced(self.client.clone(), namespace);
        match api.get_opt(name).await.map_err(store_error)? {
            Some(obj) => Ok(obj.spec),
            None => Err(StoreError::NotFound(format!("{namespace}/{name}"))),
        }
    }
}

/// CustomResourceDefinition of `SpaceClaimParameters`, as YAML-compatible JSON.
pub fn crd_manifest() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&SpaceClaimParameters::crd())
}
