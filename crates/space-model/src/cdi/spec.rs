use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Env;

const CDI_VERSION_BASE: &str = "0.3.0";
const CDI_VERSION_DIGIT_NAMES: &str = "0.5.0";
const CDI_VERSION_ANNOTATIONS: &str = "0.6.0";

/// CDI spec document, serialized in the on-disk JSON layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdiSpec {
    pub cdi_version: String,
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    pub devices: Vec<CdiDevice>,
}

impl CdiSpec {
    /// Build a spec stamped with the lowest CDI version able to express it.
    pub fn new(kind: impl Into<String>, devices: Vec<CdiDevice>) -> Self {
        let mut spec = Self {
            cdi_version: String::new(),
            kind: kind.into(),
            annotations: BTreeMap::new(),
            devices,
        };
        spec.cdi_version = spec.minimum_version().to_string();
        spec
    }

    /// Lowest CDI spec version that supports every feature used here.
    pub fn minimum_version(&self) -> &'static str {
        let annotated = !self.annotations.is_empty()
            || self.devices.iter().any(|d| !d.annotations.is_empty());
        if annotated {
            return CDI_VERSION_ANNOTATIONS;
        }

        let digit_names = self
            .devices
            .iter()
            .any(|d| d.name.starts_with(|c: char| c.is_ascii_digit()));
        if digit_names {
            return CDI_VERSION_DIGIT_NAMES;
        }

        CDI_VERSION_BASE
    }

    pub fn device(&self, name: &str) -> Option<&CdiDevice> {
        self.devices.iter().find(|d| d.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdiDevice {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    pub container_edits: ContainerEdits,
}

impl CdiDevice {
    pub fn new(name: impl Into<String>, container_edits: ContainerEdits) -> Self {
        Self {
            name: name.into(),
            annotations: BTreeMap::new(),
            container_edits,
        }
    }
}

/// Changes applied to a container that requests a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerEdits {
    /// `KEY=VALUE` entries.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<CdiMount>,
}

impl ContainerEdits {
    pub fn with_env(env: &Env) -> Self {
        Self {
            env: env.to_assignments(),
            mounts: Vec::new(),
        }
    }

    pub fn mount(mut self, mount: CdiMount) -> Self {
        self.mounts.push(mount);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdiMount {
    pub host_path: String,
    pub container_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl CdiMount {
    /// Read-write bind mount of `host_path` onto `container_path`.
    pub fn bind(host_path: impl Into<String>, container_path: impl Into<String>) -> Self {
        Self {
            host_path: host_path.into(),
            container_path: container_path.into(),
            options: vec!["bind".to_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(name: &str) -> CdiDevice {
        CdiDevice::new(name, ContainerEdits::with_env(&Env::single("A", "1")))
    }

    #[test]
    fn plain_spec_needs_base_version() {
        let spec = CdiSpec::new("vendor.io/space", vec![device("common")]);
        assert_eq!(spec.cdi_version, "0.3.0");
    }

    #[test]
    fn digit_leading_device_name_bumps_version() {
        let spec = CdiSpec::new("vendor.io/space", vec![device("common"), device("7space")]);
        assert_eq!(spec.cdi_version, "0.5.0");
    }

    #[test]
    fn annotations_bump_version() {
        let mut d = device("common");
        d.annotations.insert("a".into(), "b".into());
        let spec = CdiSpec::new("vendor.io/space", vec![d]);
        assert_eq!(spec.cdi_version, "0.6.0");
    }

    #[test]
    fn json_layout_matches_cdi_files() {
        let edits = ContainerEdits::with_env(&Env::single("X_NAMESPACE", "space-a"))
            .mount(CdiMount::bind("/host/c-1", "/etc/x"));
        let spec = CdiSpec::new("vendor.io/space", vec![CdiDevice::new("space-a", edits)]);

        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["cdiVersion"], "0.3.0");
        assert_eq!(json["kind"], "vendor.io/space");
        assert!(json.get("annotations").is_none());

        let dev = &json["devices"][0];
        assert_eq!(dev["name"], "space-a");
        assert_eq!(dev["containerEdits"]["env"][0], "X_NAMESPACE=space-a");
        assert_eq!(dev["containerEdits"]["mounts"][0]["hostPath"], "/host/c-1");
        assert_eq!(dev["containerEdits"]["mounts"][0]["containerPath"], "/etc/x");
        assert_eq!(dev["containerEdits"]["mounts"][0]["options"][0], "bind");
    }
}
