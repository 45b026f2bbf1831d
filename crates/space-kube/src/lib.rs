//! Kubernetes API adapters for the controller stores.
//!
//! The DRA controller framework owns the reconciliation loop; it builds a
//! [`SpaceController`](space_core::controller::SpaceController) over these
//! adapters and calls it for every claim event. [`crd_manifest`] renders the
//! `SpaceClaimParameters` definition to install before the first claim.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use space_core::controller::SpaceController;
//! use space_kube::{Client, KubeNamespaces, KubeParameters};
//!
//! fn controller(client: Client) -> SpaceController {
//!     SpaceController::new(
//!         Arc::new(KubeNamespaces::new(client.clone())),
//!         Arc::new(KubeParameters::new(client)),
//!     )
//! }
//! ```
mod error;

mod namespaces;
pub use namespaces::KubeNamespaces;

mod parameters;
pub use parameters::{KubeParameters, crd_manifest};

pub use kube::Client;

/// Client configured from the environment (in-cluster or kubeconfig).
pub async fn client() -> Result<Client, kube::Error> {
    Client::try_default().await
}
