use crate::core::Scanner;
use std::collections::HashMap;
use std::sync::Arc;

pub struct ScannerRegistry {
    scanners: HashMap<String, Arc<dyn Scanner>>,
}

impl ScannerRegistry {
    pub fn new() -> Self {
        Self {
            scanners: HashMap::new(),
        }
    }

    /// A registry pre-loaded with every built-in rule.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        crate::rules::register_builtin(&mut registry);
        registry
    }

    pub fn register<S: Scanner + 'static>(&mut self, scanner: S) {
        let id = scanner.id().to_string();
        self.scanners.insert(id, Arc::new(scanner));
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Scanner>> {
        self.scanners.get(id).cloned()
    }

    /// All registered scanners, ordered by id so downstream output is stable.
    pub fn all(&self) -> Vec<Arc<dyn Scanner>> {
        let mut scanners: Vec<_> = self.scanners.values().cloned().collect();
        scanners.sort_by_key(|s| s.id());
        scanners
    }

    pub fn enabled(&self) -> Vec<Arc<dyn Scanner>> {
        self.all()
            .into_iter()
            .filter(|s| s.enabled_by_default())
            .collect()
    }

    pub fn list_ids(&self) -> Vec<String> {
        let mut ids: Vec<_> = self.scanners.keys().cloned().collect();
        ids.sort();
        ids
    }
}

impl Default for ScannerRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_has_all_rules() {
        let registry = ScannerRegistry::with_builtin();
        let ids = registry.list_ids();
        assert_eq!(ids.len(), 10);
        assert!(ids.contains(&"missing-execute-authorization".to_string()));
        assert!(ids.contains(&"storage-key-collision".to_string()));
        assert!(ids.contains(&"reply-ignores-errors".to_string()));
    }

    #[test]
    fn test_ids_sorted() {
        let registry = ScannerRegistry::with_builtin();
        let ids = registry.list_ids();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }
}
