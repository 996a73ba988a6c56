//! Read-only structural snapshots and bulk restore.
//!
//! A [`SchemeSnapshot`] is the boundary handed to whatever persistence
//! adapter the host uses: it captures nodes (in insertion order), links, and
//! annotations with everything needed to rebuild the graph, and nothing about
//! runtime state. The concrete file format is the adapter's business; the
//! snapshot types simply derive serde.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::registry::{DescriptorRegistry, TypeRegistry};
use crate::types::{LinkId, NodeId, Position};

use super::annotations::Annotation;
use super::errors::SchemeError;
use super::graph::WorkflowGraph;
use super::link::SchemeLink;

/// Persisted form of one node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub descriptor: String,
    pub title: String,
    pub position: Position,
    #[serde(default)]
    pub properties: FxHashMap<String, Value>,
}

/// Persisted form of one link.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub id: LinkId,
    pub source_node: NodeId,
    pub source_channel: String,
    pub sink_node: NodeId,
    pub sink_channel: String,
    pub enabled: bool,
}

/// Complete structural snapshot of a [`WorkflowGraph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchemeSnapshot {
    pub title: String,
    pub description: String,
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl WorkflowGraph {
    /// Capture the graph's structure for serialization.
    #[must_use]
    pub fn snapshot(&self) -> SchemeSnapshot {
        SchemeSnapshot {
            title: self.title.clone(),
            description: self.description.clone(),
            nodes: self
                .nodes
                .iter()
                .map(|n| NodeRecord {
                    id: n.id,
                    descriptor: n.descriptor.id().to_string(),
                    title: n.title.clone(),
                    position: n.position,
                    properties: n.properties.clone(),
                })
                .collect(),
            links: self
                .links
                .iter()
                .map(|l| LinkRecord {
                    id: l.id,
                    source_node: l.source_node,
                    source_channel: l.source_channel.clone(),
                    sink_node: l.sink_node,
                    sink_channel: l.sink_channel.clone(),
                    enabled: l.enabled,
                })
                .collect(),
            annotations: self.annotations.clone(),
        }
    }

    /// Rebuild a graph from a snapshot by replaying node and link insertions.
    ///
    /// Descriptors are resolved through the [`DescriptorRegistry`]; an
    /// unregistered id fails with [`SchemeError::UnknownDescriptor`]. Links
    /// are re-validated on the way in, so a snapshot that violates current
    /// descriptor declarations is rejected rather than silently loaded.
    /// Entity ids are preserved.
    pub fn restore(
        snapshot: &SchemeSnapshot,
        descriptors: &DescriptorRegistry,
        types: Arc<TypeRegistry>,
    ) -> Result<WorkflowGraph, SchemeError> {
        let mut graph = WorkflowGraph::new(types);
        graph.title = snapshot.title.clone();
        graph.description = snapshot.description.clone();

        for record in &snapshot.nodes {
            let descriptor =
                descriptors
                    .get(&record.descriptor)
                    .ok_or_else(|| SchemeError::UnknownDescriptor {
                        id: record.descriptor.clone(),
                    })?;
            graph.restore_node(
                record.id,
                descriptor,
                record.title.clone(),
                record.position,
                record.properties.clone(),
            );
        }

        for record in &snapshot.links {
            let link = SchemeLink {
                id: record.id,
                source_node: record.source_node,
                source_channel: record.source_channel.clone(),
                sink_node: record.sink_node,
                sink_channel: record.sink_channel.clone(),
                enabled: record.enabled,
            };
            graph.restore_link(link)?;
        }

        for annotation in &snapshot.annotations {
            graph.restore_annotation(annotation.clone());
        }

        tracing::debug!(
            nodes = graph.nodes.len(),
            links = graph.links.len(),
            "restored scheme"
        );
        Ok(graph)
    }
}
