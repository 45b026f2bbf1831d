//! Well-known names shared by the controller and the node agent.
//!
//! Both sides derive labels, CDI names and environment markers from these values,
//! so they must never drift apart.

/// Name of the resource driver. Also used as the API group of its parameter objects.
pub const DRIVER_NAME: &str = "space.resource.example.com";

/// API group a claim's parameters reference must belong to.
pub const DRIVER_API_GROUP: &str = DRIVER_NAME;

/// Label put on every backing namespace; the value is the claim uid.
pub const RESOURCE_CLAIM_LABEL: &str = "space.resource.example.com/resourceclaim";

/// Kind of the typed claim parameters object.
pub const SPACE_CLAIM_PARAMETERS_KIND: &str = "SpaceClaimParameters";

/// Name template used when a claim carries no parameters reference.
pub const DEFAULT_GENERATE_NAME: &str = "space-";

/// CDI vendor of every device produced by the node agent.
pub const CDI_VENDOR: &str = "k8s.space.resource.example.com";

/// CDI class of every device produced by the node agent.
pub const CDI_CLASS: &str = "space";

/// Device name of the common (claim independent) CDI device.
pub const CDI_COMMON_DEVICE: &str = "common";

/// Environment marker injected by the common device.
pub const DRIVER_NAME_ENV: &str = "DRA_RESOURCE_DRIVER_NAME";

/// Name of the credential file inside a claim's artifact directory.
pub const CREDENTIAL_FILE_NAME: &str = "kubeconfig";
