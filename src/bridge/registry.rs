// Tue Jan 20 2026 - Alex

//! Name → bound object registry.
//!
//! Insertion-ordered; re-binding a name swaps the handle in place. The bridge
//! only ever drops its own `Arc`, the caller keeps whatever it registered.

use crate::bridge::api::HostObject;
use crate::bridge::error::DispatchError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use regex::Regex;
use std::sync::Arc;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").expect("identifier pattern"));

/// Registry handle shared by the bridge and the runtime's host-call hook
pub type SharedRegistry = Arc<RwLock<ObjectRegistry>>;

#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: IndexMap<String, Arc<HostObject>>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self {
            objects: IndexMap::new(),
        }
    }

    pub fn shared() -> SharedRegistry {
        Arc::new(RwLock::new(Self::new()))
    }

    /// Register `object` under `name`, returning the handle it replaced.
    pub fn bind(&mut self, name: &str, object: Arc<HostObject>) -> Option<Arc<HostObject>> {
        if !is_identifier(name) {
            log::warn!(
                "Bound name '{}' is not a JavaScript identifier, scripts must use globalThis[\"{}\"]",
                name,
                name
            );
        }
        let previous = self.objects.insert(name.to_string(), object);
        if previous.is_some() {
            log::debug!("Rebound '{}'", name);
        }
        previous
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<HostObject>, DispatchError> {
        self.objects
            .get(name)
            .cloned()
            .ok_or_else(|| DispatchError::UnboundName(name.to_string()))
    }

    pub fn unbind(&mut self, name: &str) -> Option<Arc<HostObject>> {
        self.objects.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
    }

    /// Bound names in insertion order.
    pub fn names(&self) -> Vec<String> {
        self.objects.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<HostObject>)> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}
