//! Container Device Interface (CDI) spec documents and naming rules.
//!
//! The node agent describes every claim as a CDI device. The runtime resolves
//! fully-qualified device names (`vendor/class=name`) against spec files found
//! in its CDI directories.
mod naming;
pub use naming::{
    env_prefix, qualified_name, spec_name, transient_spec_name, validate_claim_name,
    validate_device_name,
};

mod spec;
pub use spec::{CdiDevice, CdiMount, CdiSpec, ContainerEdits};

use crate::{CDI_CLASS, CDI_VENDOR};

/// CDI kind (`vendor/class`) of every spec written by the node agent.
pub fn cdi_kind() -> String {
    format!("{CDI_VENDOR}/{CDI_CLASS}")
}
