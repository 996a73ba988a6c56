//! Descriptor lookup by stable id.

use rustc_hash::FxHashMap;
use std::sync::Arc;

use super::descriptor::NodeDescriptor;

/// Maps descriptor ids to their shared [`NodeDescriptor`] instances.
///
/// This is the compile-time-checked replacement for constructing node kinds
/// by qualified name strings: descriptors are registered once, and everything
/// downstream (snapshot restore, program factories) resolves through the id.
#[derive(Debug, Default)]
pub struct DescriptorRegistry {
    descriptors: FxHashMap<String, Arc<NodeDescriptor>>,
}

impl DescriptorRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor under its own id, replacing any previous entry.
    pub fn register(&mut self, descriptor: Arc<NodeDescriptor>) {
        if let Some(old) = self
            .descriptors
            .insert(descriptor.id().to_string(), descriptor)
        {
            tracing::warn!(id = old.id(), "replacing registered descriptor");
        }
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<Arc<NodeDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_and_resolve() {
        let mut reg = DescriptorRegistry::new();
        reg.register(NodeDescriptor::builder("core.file", "File").build_arc());
        assert!(reg.get("core.file").is_some());
        assert!(reg.get("core.missing").is_none());
        assert_eq!(reg.len(), 1);
    }
}
