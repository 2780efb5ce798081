//! In-Memory Key/Value Storage
//!
//! Implements the `Storage` port on a `DashMap`. Each key holds exactly one
//! typed value; writing a key with another type replaces it.

use dashmap::DashMap;

use crate::domain::Storage;

#[derive(Debug, Clone, PartialEq)]
enum StoredValue {
    String(String),
    Int(i32),
    Float(f32),
    Long(i64),
}

/// Process-local `Storage` implementation.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    values: DashMap<String, StoredValue>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn get(&self, key: &str) -> Option<StoredValue> {
        self.values.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: StoredValue) {
        self.values.insert(key.to_string(), value);
    }
}

impl Storage for InMemoryStorage {
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key)? {
            StoredValue::String(value) => Some(value),
            _ => None,
        }
    }

    fn set_string(&self, key: &str, value: &str) {
        self.set(key, StoredValue::String(value.to_string()));
    }

    fn get_int(&self, key: &str) -> Option<i32> {
        match self.get(key)? {
            StoredValue::Int(value) => Some(value),
            _ => None,
        }
    }

    fn set_int(&self, key: &str, value: i32) {
        self.set(key, StoredValue::Int(value));
    }

    fn get_float(&self, key: &str) -> Option<f32> {
        match self.get(key)? {
            StoredValue::Float(value) => Some(value),
            _ => None,
        }
    }

    fn set_float(&self, key: &str, value: f32) {
        self.set(key, StoredValue::Float(value));
    }

    fn get_long(&self, key: &str) -> Option<i64> {
        match self.get(key)? {
            StoredValue::Long(value) => Some(value),
            _ => None,
        }
    }

    fn set_long(&self, key: &str, value: i64) {
        self.set(key, StoredValue::Long(value));
    }

    fn remove(&self, key: &str) {
        self.values.remove(key);
    }
}

// =============================================================================
// Tests
// =============================================================================
