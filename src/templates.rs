//! In-memory saved-template store.
//!
//! Templates live for the lifetime of the process; persistence is out of
//! scope. The store is shared across handlers behind the server state.

use std::sync::RwLock;

use crate::report::SavedTemplate;

/// Thread-safe, append-only template store.
#[derive(Debug, Default)]
pub struct TemplateStore {
    inner: RwLock<Vec<SavedTemplate>>,
}

impl TemplateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Save a template and return the new total count.
    pub fn save(&self, template: SavedTemplate) -> usize {
        let mut templates = self.inner.write().expect("template store lock poisoned");
        templates.push(template);
        templates.len()
    }

    /// Snapshot of every saved template, in insertion order.
    pub fn list(&self) -> Vec<SavedTemplate> {
        self.inner
            .read()
            .expect("template store lock poisoned")
            .clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().expect("template store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Dataset;
    use crate::report::{AccessRole, ReportRequest};

    fn template(name: &str) -> SavedTemplate {
        let config: ReportRequest =
            serde_json::from_value(serde_json::json!({ "dataset": "incident_safety" })).unwrap();
        SavedTemplate {
            name: name.to_string(),
            description: None,
            config,
            access_role: AccessRole::Operations,
        }
    }

    #[test]
    fn test_save_and_list_ordering() {
        let store = TemplateStore::new();
        assert!(store.is_empty());

        assert_eq!(store.save(template("first")), 1);
        assert_eq!(store.save(template("second")), 2);

        let listed = store.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].name, "first");
        assert_eq!(listed[1].name, "second");
        assert_eq!(listed[0].config.dataset, Dataset::IncidentSafety);
    }
}
