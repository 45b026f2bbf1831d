use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ClaimUid, RESOURCE_CLAIM_LABEL};

/// Kubernetes-style label set, ordered for deterministic selectors.
#[derive(Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Labels(pub BTreeMap<String, String>);

impl Labels {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Labels identifying the backing namespace of a claim.
    pub fn for_claim(uid: &ClaimUid) -> Self {
        let mut labels = Self::new();
        labels.insert(RESOURCE_CLAIM_LABEL, uid.as_str());
        labels
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Insert or overwrite a label.
    pub fn insert<K, V>(&mut self, key: K, val: V) -> &mut Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.insert(key.into(), val.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns `true` if every label in `selector` is present here with the same value.
    pub fn matches(&self, selector: &Labels) -> bool {
        selector.iter().all(|(k, v)| self.get(k) == Some(v))
    }

    /// Equality-based selector string (`k1=v1,k2=v2`).
    pub fn to_selector(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Clone into a plain map, the shape expected by Kubernetes object metadata.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_labels_select_by_uid() {
        let labels = Labels::for_claim(&ClaimUid::from("c-123"));
        assert_eq!(labels.get(RESOURCE_CLAIM_LABEL), Some("c-123"));
        assert_eq!(
            labels.to_selector(),
            "space.resource.example.com/resourceclaim=c-123"
        );
    }

    #[test]
    fn matches_requires_exact_values() {
        let mut actual = Labels::for_claim(&ClaimUid::from("c-1"));
        actual.insert("team", "a");

        assert!(actual.matches(&Labels::for_claim(&ClaimUid::from("c-1"))));
        assert!(!actual.matches(&Labels::for_claim(&ClaimUid::from("c-10"))));
        assert!(actual.matches(&Labels::new()));
    }

    #[test]
    fn selector_is_sorted_by_key() {
        let mut labels = Labels::new();
        labels.insert("b", "2").insert("a", "1");
        assert_eq!(labels.to_selector(), "a=1,b=2");
    }
}
