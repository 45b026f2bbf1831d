use crate::KeyValue;

/// Ordered list of environment variables injected into a workload.
///
/// CDI consumes the `KEY=VALUE` form produced by [`Env::to_assignments`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env(Vec<KeyValue>);

impl Env {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create an environment containing a single key–value pair.
    pub fn single<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self(vec![KeyValue::new(key, value)])
    }

    /// Append a key–value pair.
    pub fn push<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.0.push(KeyValue::new(key, value));
    }

    /// Render every entry as `KEY=VALUE`, preserving order.
    pub fn to_assignments(&self) -> Vec<String> {
        self.0
            .iter()
            .map(|kv| format!("{}={}", kv.key(), kv.value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::Env;

    #[test]
    fn new_env_renders_nothing() {
        assert!(Env::new().to_assignments().is_empty());
    }

    #[test]
    fn assignments_keep_insertion_order() {
        let mut env = Env::single("A", "1");
        env.push("B", "x=y");
        env.push("A", "2");

        assert_eq!(env.to_assignments(), vec!["A=1", "B=x=y", "A=2"]);
    }
}
