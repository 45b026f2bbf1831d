use async_trait::async_trait;
use k8s_openapi::{api::core::v1::Namespace, apimachinery::pkg::apis::meta::v1::ObjectMeta};
use kube::{
    Api, Client,
    api::{DeleteParams, ListParams, PostParams},
};
use space_core::{
    error::StoreError,
    store::{BackingResource, BackingStore},
};
use space_model::Labels;
use tracing::debug;

use crate::error::{is_not_found, store_error};

/// Cluster namespaces as backing resources.
#[derive(Clone)]
pub struct KubeNamespaces {
    api: Api<Namespace>,
}

impl KubeNamespaces {
    pub fn new(client: Client) -> Self {
        Self {
            api: Api::all(client),
        }
    }
}

/// Namespace object named by the API server from `generate_name`.
fn namespace_object(generate_name: &str, labels: &Labels) -> Namespace {
    Namespace {
        metadata: ObjectMeta {
            generate_name: Some(generate_name.to_string()),
            labels: Some(labels.to_map()),
            ..ObjectMeta::default()
        },
        ..Namespace::default()
    }
}

fn backing_resource(ns: Namespace) -> Option<BackingResource> {
    let name = ns.metadata.name?;
    let mut labels = Labels::new();
    for (k, v) in ns.metadata.labels.unwrap_or_default() {
        labels.insert(k, v);
    }
    Some(BackingResource { name, labels })
}

#[async_trait]
impl BackingStore for KubeNamespaces {
    async fn list(&self, selector: &Labels) -> Result<Vec<BackingResource>, StoreError> {
        let params = ListParams::default().labels(&selector.to_selector());
        let list = self.api.list(&params).await.map_err(store_error)?;
        Ok(list.items.into_iter().filter_map(backing_resource).collect())
    }

    async fn create(
        &self,
        generate_name: &str,
        labels: &Labels,
    ) -> Result<BackingResource, StoreError> {
        let created = self
            .api
            .create(&PostParams::default(), &namespace_object(generate_name, labels))
            .await
            .map_err(store_error)?;
        backing_resource(created)
            .ok_or_else(|| StoreError::Backend("created namespace has no name".into()))
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        match self.api.delete(name, &DeleteParams::default()).await {
            Ok(_) => Ok(()),
            Err(e) if is_not_found(&e) => {
                debug!(namespace = name, "namespace already deleted");
                Ok(())
            }
            Err(e) => Err(store_error(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use space_model::{ClaimUid, RESOURCE_CLAIM_LABEL};

    use super::*;

    #[test]
    fn namespace_carries_template_and_claim_label() {
        let ns = namespace_object("space-", &Labels::for_claim(&ClaimUid::from("c-1")));
        assert_eq!(ns.metadata.generate_name.as_deref(), Some("space-"));
        assert!(ns.metadata.name.is_none());
        let labels = ns.metadata.labels.unwrap();
        assert_eq!(labels.get(RESOURCE_CLAIM_LABEL).map(String::as_str), Some("c-1"));
    }

    #[test]
    fn unnamed_objects_are_skipped() {
        assert!(backing_resource(Namespace::default()).is_none());

        let mut ns = namespace_object("space-", &Labels::for_claim(&ClaimUid::from("c-1")));
        ns.metadata.name = Some("space-x7f2a".into());
        let res = backing_resource(ns).unwrap();
        assert_eq!(res.name, "space-x7f2a");
        assert_eq!(res.labels, Labels::for_claim(&ClaimUid::from("c-1")));
    }
}
