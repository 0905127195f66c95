//! Table des bindings préfixe → namespace utilisée à l'écriture

use super::constants::GENERATED_PREFIX;

/// Bindings de namespaces, une seule entrée par préfixe
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceTable {
    bindings: Vec<(String, Option<String>)>,
}

impl NamespaceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table contenant uniquement le binding du namespace cible
    pub fn with_target(prefix: &str, namespace: Option<&str>) -> Self {
        let mut table = Self::new();
        table.bind(prefix, namespace);
        table
    }

    /// Lie `prefix` à `namespace`, en remplaçant un binding existant
    pub fn bind(&mut self, prefix: &str, namespace: Option<&str>) {
        let namespace = namespace.map(str::to_string);
        match self.bindings.iter_mut().find(|(p, _)| p == prefix) {
            Some(entry) => entry.1 = namespace,
            None => self.bindings.push((prefix.to_string(), namespace)),
        }
    }

    pub fn namespace_of(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .and_then(|(_, ns)| ns.as_deref())
    }

    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, ns)| ns.as_deref() == Some(namespace))
            .map(|(p, _)| p.as_str())
    }

    /// Premier préfixe généré (`ns1`, `ns2`, ...) encore libre
    pub fn free_prefix(&self) -> String {
        (1..)
            .map(|i| format!("{}{}", GENERATED_PREFIX, i))
            .find(|candidate| self.bindings.iter().all(|(p, _)| p != candidate))
            .unwrap_or_else(|| GENERATED_PREFIX.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.bindings
            .iter()
            .map(|(p, ns)| (p.as_str(), ns.as_deref()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
