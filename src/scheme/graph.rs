//! The workflow graph aggregate.

use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::registry::{ChannelDirection, NodeDescriptor, TypeRegistry};
use crate::types::{AnnotationId, LinkId, NodeId, Position, ProcessingState};

use super::annotations::Annotation;
use super::errors::SchemeError;
use super::events::{EventHub, SchemeEvent};
use super::link::SchemeLink;
use super::node::SchemeNode;

/// Wildcard filter for [`WorkflowGraph::find_links`].
///
/// Unset fields match everything.
///
/// # Examples
///
/// ```no_run
/// # use flowscheme::scheme::LinkFilter;
/// # use flowscheme::types::NodeId;
/// # let (a, b) = (NodeId(1), NodeId(2));
/// let filter = LinkFilter::new().source(a).sink(b);
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct LinkFilter<'a> {
    source: Option<NodeId>,
    source_channel: Option<&'a str>,
    sink: Option<NodeId>,
    sink_channel: Option<&'a str>,
}

impl<'a> LinkFilter<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn source(mut self, node: NodeId) -> Self {
        self.source = Some(node);
        self
    }

    #[must_use]
    pub fn source_channel(mut self, channel: &'a str) -> Self {
        self.source_channel = Some(channel);
        self
    }

    #[must_use]
    pub fn sink(mut self, node: NodeId) -> Self {
        self.sink = Some(node);
        self
    }

    #[must_use]
    pub fn sink_channel(mut self, channel: &'a str) -> Self {
        self.sink_channel = Some(channel);
        self
    }

    fn matches(&self, link: &SchemeLink) -> bool {
        self.source.is_none_or(|n| link.source_node == n)
            && self
                .source_channel
                .is_none_or(|c| link.source_channel == c)
            && self.sink.is_none_or(|n| link.sink_node == n)
            && self.sink_channel.is_none_or(|c| link.sink_channel == c)
    }
}

/// The aggregate owning nodes, links, and annotations.
///
/// Nodes and links are kept in insertion order, which is also the iteration
/// and persistence order. Every mutation either fully applies and emits a
/// [`SchemeEvent`], or fails with a [`SchemeError`] leaving the graph exactly
/// as it was.
///
/// The graph is mutated from one control flow at a time; it contains no
/// internal locking. Callers needing concurrent access must serialize it
/// themselves.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use flowscheme::registry::{NodeDescriptor, TypeRegistry};
/// use flowscheme::scheme::WorkflowGraph;
///
/// let types = Arc::new(TypeRegistry::new());
/// let file = NodeDescriptor::builder("core.file", "File")
///     .output("Data", "Data")
///     .build_arc();
/// let show = NodeDescriptor::builder("core.show", "Show")
///     .single_input("Data", ["Data"])
///     .build_arc();
///
/// let mut graph = WorkflowGraph::new(types);
/// let a = graph.new_node(file);
/// let b = graph.new_node(show);
/// let link = graph.new_link(a, "Data", b, "Data").unwrap();
/// assert!(link.enabled());
/// ```
#[derive(Debug)]
pub struct WorkflowGraph {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) types: Arc<TypeRegistry>,
    pub(crate) nodes: Vec<SchemeNode>,
    pub(crate) links: Vec<SchemeLink>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) next_node: u64,
    pub(crate) next_link: u64,
    pub(crate) next_annotation: u64,
    hub: EventHub,
}

impl WorkflowGraph {
    #[must_use]
    pub fn new(types: Arc<TypeRegistry>) -> Self {
        Self {
            title: "untitled".to_string(),
            description: String::new(),
            types,
            nodes: Vec::new(),
            links: Vec::new(),
            annotations: Vec::new(),
            next_node: 1,
            next_link: 1,
            next_annotation: 1,
            hub: EventHub::default(),
        }
    }

    /// Obtain a receiver for all subsequent change notifications.
    ///
    /// Subscribe before populating the graph if the observer (for example a
    /// [`SignalManager`](crate::signals::SignalManager)) needs to see the
    /// construction events.
    pub fn subscribe(&mut self) -> flume::Receiver<SchemeEvent> {
        self.hub.subscribe()
    }

    // ------------------------------------------------------------------
    // Scheme metadata
    // ------------------------------------------------------------------

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.hub.emit(SchemeEvent::TitleChanged {
            title: self.title.clone(),
        });
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.hub.emit(SchemeEvent::DescriptionChanged {
            description: self.description.clone(),
        });
    }

    #[must_use]
    pub fn type_registry(&self) -> &Arc<TypeRegistry> {
        &self.types
    }

    // ------------------------------------------------------------------
    // Nodes
    // ------------------------------------------------------------------

    /// Create a node from a descriptor and append it to the node sequence.
    ///
    /// The node's title defaults to the descriptor's display name. Never
    /// fails.
    pub fn new_node(&mut self, descriptor: Arc<NodeDescriptor>) -> NodeId {
        self.new_node_with_properties(descriptor, FxHashMap::default())
    }

    /// Like [`new_node`](Self::new_node), seeding the free-form property bag
    /// consumed by the node executor.
    pub fn new_node_with_properties(
        &mut self,
        descriptor: Arc<NodeDescriptor>,
        properties: FxHashMap<String, Value>,
    ) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        let mut node = SchemeNode::new(id, descriptor.clone());
        node.properties = properties;
        tracing::debug!(node = %id, descriptor = descriptor.id(), "adding node");
        self.nodes.push(node);
        self.hub.emit(SchemeEvent::NodeAdded {
            node: id,
            descriptor,
        });
        id
    }

    /// Remove a node and every link touching it.
    ///
    /// Incident links are removed first, each emitting its own
    /// [`SchemeEvent::LinkRemoved`], so observers never see a dangling link.
    /// Returns the removed node.
    pub fn remove_node(&mut self, id: NodeId) -> Result<SchemeNode, SchemeError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or(SchemeError::NodeNotInGraph { node: id })?;

        let incident: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.source_node == id || l.sink_node == id)
            .map(|l| l.id)
            .collect();
        for link_id in incident {
            // Cannot fail: the id was just taken from the live link set.
            let _ = self.remove_link(link_id);
        }

        let node = self.nodes.remove(index);
        tracing::debug!(node = %id, "removed node");
        self.hub.emit(SchemeEvent::NodeRemoved { node: id });
        Ok(node)
    }

    #[must_use]
    pub fn nodes(&self) -> &[SchemeNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Result<&SchemeNode, SchemeError> {
        self.nodes
            .iter()
            .find(|n| n.id == id)
            .ok_or(SchemeError::NodeNotInGraph { node: id })
    }

    #[must_use]
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut SchemeNode, SchemeError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(SchemeError::NodeNotInGraph { node: id })
    }

    pub fn set_node_title(&mut self, id: NodeId, title: impl Into<String>) -> Result<(), SchemeError> {
        self.node_mut(id)?.title = title.into();
        Ok(())
    }

    pub fn set_node_position(&mut self, id: NodeId, position: Position) -> Result<(), SchemeError> {
        self.node_mut(id)?.position = position;
        Ok(())
    }

    /// Replace the node's property bag. The graph never interprets the
    /// values, only transports them to the executor and into snapshots.
    pub fn set_node_properties(
        &mut self,
        id: NodeId,
        properties: FxHashMap<String, Value>,
    ) -> Result<(), SchemeError> {
        self.node_mut(id)?.properties = properties;
        Ok(())
    }

    /// Record computation progress, clamped to `0.0..=100.0`.
    pub fn set_node_progress(&mut self, id: NodeId, progress: f64) -> Result<(), SchemeError> {
        self.node_mut(id)?.progress = progress.clamp(0.0, 100.0);
        Ok(())
    }

    pub fn set_node_processing_state(
        &mut self,
        id: NodeId,
        state: ProcessingState,
    ) -> Result<(), SchemeError> {
        self.node_mut(id)?.processing_state = state;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Links
    // ------------------------------------------------------------------

    /// Create and insert a link between two channels, validating as
    /// [`add_link`](Self::add_link) does. Returns the inserted link.
    pub fn new_link(
        &mut self,
        source_node: NodeId,
        source_channel: &str,
        sink_node: NodeId,
        sink_channel: &str,
    ) -> Result<SchemeLink, SchemeError> {
        self.add_link(SchemeLink::new(
            source_node,
            source_channel,
            sink_node,
            sink_channel,
        ))
    }

    /// Insert a pre-built link.
    ///
    /// Validation order: endpoints must exist, channel names must resolve on
    /// both descriptors, the endpoints must be distinct nodes, the source
    /// type must be acceptable to the sink, and a single-input sink channel
    /// must be free. The link's id is assigned here; on success the inserted
    /// link is returned and [`SchemeEvent::LinkAdded`] is emitted.
    pub fn add_link(&mut self, mut link: SchemeLink) -> Result<SchemeLink, SchemeError> {
        self.validate_link(&link)?;
        link.id = LinkId(self.next_link);
        self.next_link += 1;
        tracing::debug!(
            link = %link.id,
            source = %link.source_node,
            sink = %link.sink_node,
            "adding link"
        );
        self.links.push(link.clone());
        self.hub.emit(SchemeEvent::LinkAdded { link: link.clone() });
        Ok(link)
    }

    /// Remove a link by id, returning it.
    pub fn remove_link(&mut self, id: LinkId) -> Result<SchemeLink, SchemeError> {
        let index = self
            .links
            .iter()
            .position(|l| l.id == id)
            .ok_or(SchemeError::LinkNotInGraph { link: id })?;
        let link = self.links.remove(index);
        tracing::debug!(link = %id, "removed link");
        self.hub.emit(SchemeEvent::LinkRemoved { link: link.clone() });
        Ok(link)
    }

    /// Flip a link's enabled flag.
    ///
    /// Enabling must respect single-input occupancy, exactly as if the link
    /// were being added. A no-op change emits nothing.
    pub fn set_link_enabled(&mut self, id: LinkId, enabled: bool) -> Result<(), SchemeError> {
        let link = self
            .links
            .iter()
            .find(|l| l.id == id)
            .ok_or(SchemeError::LinkNotInGraph { link: id })?
            .clone();
        if link.enabled == enabled {
            return Ok(());
        }
        if enabled {
            self.check_sink_capacity(&link, Some(id))?;
        }
        let stored = self
            .links
            .iter_mut()
            .find(|l| l.id == id)
            .expect("link present above");
        stored.enabled = enabled;
        let updated = stored.clone();
        self.hub.emit(SchemeEvent::LinkEnabledChanged {
            link: updated,
            enabled,
        });
        Ok(())
    }

    #[must_use]
    pub fn links(&self) -> &[SchemeLink] {
        &self.links
    }

    pub fn link(&self, id: LinkId) -> Result<&SchemeLink, SchemeError> {
        self.links
            .iter()
            .find(|l| l.id == id)
            .ok_or(SchemeError::LinkNotInGraph { link: id })
    }

    /// All links matching the filter, in insertion order.
    #[must_use]
    pub fn find_links(&self, filter: LinkFilter<'_>) -> Vec<&SchemeLink> {
        self.links.iter().filter(|l| filter.matches(l)).collect()
    }

    /// Links delivering into `node`, in insertion order.
    #[must_use]
    pub fn links_to(&self, node: NodeId) -> Vec<&SchemeLink> {
        self.find_links(LinkFilter::new().sink(node))
    }

    /// Links originating at `node`, in insertion order.
    #[must_use]
    pub fn links_from(&self, node: NodeId) -> Vec<&SchemeLink> {
        self.find_links(LinkFilter::new().source(node))
    }

    pub(crate) fn validate_link(&self, link: &SchemeLink) -> Result<(), SchemeError> {
        let source = self.node(link.source_node)?;
        let sink = self.node(link.sink_node)?;

        let output = source
            .descriptor
            .find_output(&link.source_channel)
            .ok_or_else(|| SchemeError::ChannelNotFound {
                descriptor: source.descriptor.id().to_string(),
                channel: link.source_channel.clone(),
                direction: ChannelDirection::Output,
            })?;
        let input = sink
            .descriptor
            .find_input(&link.sink_channel)
            .ok_or_else(|| SchemeError::ChannelNotFound {
                descriptor: sink.descriptor.id().to_string(),
                channel: link.sink_channel.clone(),
                direction: ChannelDirection::Input,
            })?;

        if link.source_node == link.sink_node {
            return Err(SchemeError::SelfLoop {
                node: link.source_node,
            });
        }

        if !self.types.compatible(&output.ty, &input.accepted) {
            return Err(SchemeError::IncompatibleChannels {
                source_channel: link.source_channel.clone(),
                source_type: output.ty.to_string(),
                sink_channel: link.sink_channel.clone(),
            });
        }

        if link.enabled {
            self.check_sink_capacity(link, None)?;
        }
        Ok(())
    }

    /// Reject when the sink channel is single-input and already fed by an
    /// enabled link (other than `ignore`, used when re-enabling in place).
    fn check_sink_capacity(
        &self,
        link: &SchemeLink,
        ignore: Option<LinkId>,
    ) -> Result<(), SchemeError> {
        let sink = self.node(link.sink_node)?;
        let single = sink
            .descriptor
            .find_input(&link.sink_channel)
            .is_some_and(|c| c.flags.single);
        if !single {
            return Ok(());
        }
        let occupied = self.links.iter().find(|l| {
            l.enabled
                && l.sink_node == link.sink_node
                && l.sink_channel == link.sink_channel
                && ignore != Some(l.id)
        });
        match occupied {
            Some(existing) => Err(SchemeError::SinkChannelOccupied {
                node: link.sink_node,
                channel: link.sink_channel.clone(),
                existing: existing.id,
            }),
            None => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Annotations
    // ------------------------------------------------------------------

    /// Add a display annotation, assigning its id.
    pub fn add_annotation(&mut self, mut annotation: Annotation) -> AnnotationId {
        let id = AnnotationId(self.next_annotation);
        self.next_annotation += 1;
        annotation.set_id(id);
        self.annotations.push(annotation);
        self.hub.emit(SchemeEvent::AnnotationAdded { annotation: id });
        id
    }

    pub fn remove_annotation(&mut self, id: AnnotationId) -> Result<Annotation, SchemeError> {
        let index = self
            .annotations
            .iter()
            .position(|a| a.id() == id)
            .ok_or(SchemeError::AnnotationNotInGraph { annotation: id })?;
        let annotation = self.annotations.remove(index);
        self.hub
            .emit(SchemeEvent::AnnotationRemoved { annotation: id });
        Ok(annotation)
    }

    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    // ------------------------------------------------------------------
    // Restore support (see snapshot module)
    // ------------------------------------------------------------------

    pub(crate) fn restore_node(
        &mut self,
        id: NodeId,
        descriptor: Arc<NodeDescriptor>,
        title: String,
        position: Position,
        properties: FxHashMap<String, Value>,
    ) {
        let mut node = SchemeNode::new(id, descriptor.clone());
        node.title = title;
        node.position = position;
        node.properties = properties;
        self.next_node = self.next_node.max(id.0 + 1);
        self.nodes.push(node);
        self.hub.emit(SchemeEvent::NodeAdded {
            node: id,
            descriptor,
        });
    }

    pub(crate) fn restore_link(&mut self, link: SchemeLink) -> Result<(), SchemeError> {
        self.validate_link(&link)?;
        self.next_link = self.next_link.max(link.id.0 + 1);
        self.links.push(link.clone());
        self.hub.emit(SchemeEvent::LinkAdded { link });
        Ok(())
    }

    pub(crate) fn restore_annotation(&mut self, annotation: Annotation) {
        let id = annotation.id();
        self.next_annotation = self.next_annotation.max(id.0 + 1);
        self.annotations.push(annotation);
        self.hub.emit(SchemeEvent::AnnotationAdded { annotation: id });
    }
}
