//! Copy-on-write environment snapshot threaded through program continuations.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// String keyed environment with value semantics.
///
/// Cloning shares the underlying map; the first write after a clone detaches
/// the writer, so mutations in one branch are never visible in a sibling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Store {
    entries: Rc<BTreeMap<String, Value>>,
}

impl Store {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value bound to `key`, if any.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Binds `key` to `value`, returning the previous binding.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        Rc::make_mut(&mut self.entries).insert(key.into(), value)
    }

    /// Removes the binding for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        if !self.entries.contains_key(key) {
            return None;
        }
        Rc::make_mut(&mut self.entries).remove(key)
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no bindings are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates bindings in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Returns true when both stores share the same backing map.
    pub fn shares_storage_with(&self, other: &Store) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clone_shares_until_written() {
        let mut base = Store::new();
        base.insert("x", json!(1));
        let mut branch = base.clone();
        assert!(branch.shares_storage_with(&base));

        branch.insert("x", json!(2));
        assert!(!branch.shares_storage_with(&base));
        assert_eq!(base.get("x"), Some(&json!(1)));
        assert_eq!(branch.get("x"), Some(&json!(2)));
    }

    #[test]
    fn removing_missing_key_keeps_sharing() {
        let base = Store::new();
        let mut branch = base.clone();
        assert_eq!(branch.remove("absent"), None);
        assert!(branch.shares_storage_with(&base));
    }
}
