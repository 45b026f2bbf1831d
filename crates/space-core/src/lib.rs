pub mod agent;
mod cancel;
pub mod controller;
pub mod error;
pub mod lock;
pub mod metrics;
pub mod store;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub mod prelude {
    pub use crate::agent::SpaceNodeAgent;
    pub use crate::controller::SpaceController;
    pub use crate::error::{AgentError, ControllerError, StoreError};
    pub use crate::lock::{ClaimGuard, ClaimLocks};
    pub use crate::metrics::{MetricsBackend, MetricsHandle, Operation, Outcome};
    pub use crate::store::{
        ArtifactStore, BackingResource, BackingStore, ClaimArtifacts, DeviceSpecStore,
        ParametersSource,
    };
}
