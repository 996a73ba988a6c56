//! Node instances owned by the workflow graph.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::registry::NodeDescriptor;
use crate::types::{NodeId, Position, ProcessingState};

/// One configured processing unit placed in a scheme.
///
/// Nodes are owned exclusively by the [`WorkflowGraph`](super::WorkflowGraph);
/// everything else refers to them by [`NodeId`]. The property bag is opaque to
/// the core: it is transported to the node executor, never interpreted.
#[derive(Clone, Debug)]
pub struct SchemeNode {
    pub(crate) id: NodeId,
    pub(crate) descriptor: Arc<NodeDescriptor>,
    pub(crate) title: String,
    pub(crate) position: Position,
    pub(crate) properties: FxHashMap<String, Value>,
    pub(crate) progress: f64,
    pub(crate) processing_state: ProcessingState,
}

impl SchemeNode {
    pub(crate) fn new(id: NodeId, descriptor: Arc<NodeDescriptor>) -> Self {
        let title = descriptor.name().to_string();
        Self {
            id,
            descriptor,
            title,
            position: Position::default(),
            properties: FxHashMap::default(),
            progress: 0.0,
            processing_state: ProcessingState::Idle,
        }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn descriptor(&self) -> &Arc<NodeDescriptor> {
        &self.descriptor
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn properties(&self) -> &FxHashMap<String, Value> {
        &self.properties
    }

    /// Progress of the current computation, clamped to `0.0..=100.0`.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.progress
    }

    #[must_use]
    pub fn processing_state(&self) -> ProcessingState {
        self.processing_state
    }
}
