//! CDI documents and artifacts produced for the node agent.
use std::path::Path;

use space_model::{
    CDI_CLASS, CDI_COMMON_DEVICE, CDI_VENDOR, CREDENTIAL_FILE_NAME, ClaimUid, DRIVER_NAME,
    DRIVER_NAME_ENV, Env,
    cdi::{
        CdiDevice, CdiMount, CdiSpec, ContainerEdits, cdi_kind, env_prefix, qualified_name,
        transient_spec_name,
    },
};

/// Spec name of the common descriptor.
pub fn common_spec_name() -> String {
    transient_spec_name(CDI_VENDOR, CDI_CLASS, CDI_COMMON_DEVICE)
}

/// Spec name of a claim's descriptor, recomputable from the uid alone.
///
/// Claim ids carry a `claim-` prefix, so no uid maps onto [`common_spec_name`].
pub fn claim_spec_name(claim: &ClaimUid) -> String {
    transient_spec_name(CDI_VENDOR, CDI_CLASS, &format!("claim-{claim}"))
}

/// Descriptor shared by every claim on the node.
pub fn common_spec() -> CdiSpec {
    let edits = ContainerEdits::with_env(&Env::single(DRIVER_NAME_ENV, DRIVER_NAME));
    CdiSpec::new(cdi_kind(), vec![CdiDevice::new(CDI_COMMON_DEVICE, edits)])
}

/// Where the artifact directory shows up inside the workload.
pub fn container_dir(claim_name: &str) -> String {
    format!("/etc/{claim_name}")
}

/// Descriptor of one claim. The device is named after the backing handle.
pub fn claim_spec(claim_name: &str, handle: &str, cluster: &str, host_dir: &Path) -> CdiSpec {
    let prefix = env_prefix(claim_name);
    let in_container = container_dir(claim_name);

    let mut env = Env::new();
    env.push(format!("{prefix}_CLUSTER"), cluster);
    env.push(format!("{prefix}_NAMESPACE"), handle);
    env.push(
        format!("{prefix}_KUBECONFIG"),
        format!("{in_container}/{CREDENTIAL_FILE_NAME}"),
    );

    let edits = ContainerEdits::with_env(&env)
        .mount(CdiMount::bind(host_dir.to_string_lossy(), in_container));
    CdiSpec::new(cdi_kind(), vec![CdiDevice::new(handle, edits)])
}

/// Fully qualified devices injected for a claim: the common device first.
pub fn claim_devices(handle: &str) -> Vec<String> {
    vec![
        qualified_name(CDI_VENDOR, CDI_CLASS, CDI_COMMON_DEVICE),
        qualified_name(CDI_VENDOR, CDI_CLASS, handle),
    ]
}

/// Kubeconfig-shaped credential scoped to the claim's namespace. Carries no secret.
pub fn credential(cluster: &str, namespace: &str) -> String {
    format!(
        "apiVersion: v1\n\
         kind: Config\n\
         clusters:\n\
         - name: space\n  cluster:\n    server: {cluster}\n\
         contexts:\n\
         - name: space\n  context:\n    cluster: space\n    namespace: {namespace}\n\
         current-context: space\n\
         users: []\n"
    )
}
