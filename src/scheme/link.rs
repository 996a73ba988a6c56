//! Directed, typed connections between node channels.

use serde::{Deserialize, Serialize};

use crate::types::{LinkId, NodeId};

/// A directed edge from one node's output channel to another node's input
/// channel.
///
/// Links are validated when inserted into a graph: channel names must resolve
/// on both descriptors, the source type must be acceptable to the sink, the
/// endpoints must be distinct nodes, and a single-input sink channel must not
/// already be occupied. The id is assigned by the graph on insertion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeLink {
    pub(crate) id: LinkId,
    pub(crate) source_node: NodeId,
    pub(crate) source_channel: String,
    pub(crate) sink_node: NodeId,
    pub(crate) sink_channel: String,
    pub(crate) enabled: bool,
}

impl SchemeLink {
    /// Build a link ready to be handed to
    /// [`WorkflowGraph::add_link`](super::WorkflowGraph::add_link). Enabled by
    /// default.
    #[must_use]
    pub fn new(
        source_node: NodeId,
        source_channel: impl Into<String>,
        sink_node: NodeId,
        sink_channel: impl Into<String>,
    ) -> Self {
        Self {
            id: LinkId(0),
            source_node,
            source_channel: source_channel.into(),
            sink_node,
            sink_channel: sink_channel.into(),
            enabled: true,
        }
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    #[must_use]
    pub fn id(&self) -> LinkId {
        self.id
    }

    #[must_use]
    pub fn source_node(&self) -> NodeId {
        self.source_node
    }

    #[must_use]
    pub fn source_channel(&self) -> &str {
        &self.source_channel
    }

    #[must_use]
    pub fn sink_node(&self) -> NodeId {
        self.sink_node
    }

    #[must_use]
    pub fn sink_channel(&self) -> &str {
        &self.sink_channel
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}
