//! The signal propagation scheduler.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::registry::ChannelDirection;
use crate::scheme::{SchemeError, SchemeEvent, SchemeLink, SchemeNode, WorkflowGraph};
use crate::types::{LinkId, NodeId};

use super::executor::{
    ExecuteContext, ExecutionReport, InputMap, NodeExecutor, OutputMap,
};

/// Default bound on propagation batches per [`SignalManager::process_pending`]
/// call. A scheme that is still producing new values after this many batches
/// is oscillating; the manager reports a stall instead of looping.
pub const DEFAULT_MAX_BATCHES: usize = 64;

/// One stored input value: which channel it landed on, and through which
/// link. Keying by link keeps multi-input channels from clobbering each
/// other.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct InputSlot {
    channel: String,
    link: LinkId,
}

#[derive(Debug, Default)]
struct NodeSignalState {
    inputs: FxHashMap<InputSlot, Value>,
    outputs: FxHashMap<String, Value>,
    dirty: bool,
}

enum Lifecycle {
    Created(NodeId),
    Destroyed(NodeId),
}

/// Outcome of one propagation pass.
#[derive(Debug, Default)]
pub struct PropagationSummary {
    /// Nodes executed successfully, in execution order.
    pub executed: Vec<NodeId>,
    /// Per-node execution failures; these never abort the pass.
    pub reports: Vec<ExecutionReport>,
    /// Number of batches run.
    pub batches: usize,
    /// True if the batch bound was hit with nodes still ready: the scheme is
    /// oscillating and should be surfaced to the user as a diagnostic.
    pub stalled: bool,
}

/// Decides which nodes run, with which inputs, in which order.
///
/// The manager subscribes to a graph's [`SchemeEvent`] stream and keeps, per
/// node, the values most recently received on each input slot, the values
/// last published on each output channel, and a dirty flag. Calling
/// [`process_pending`](Self::process_pending) drains pending events and then
/// runs dirty, input-satisfied nodes in dependency order until the scheme is
/// quiescent (or the batch bound trips on a cyclic scheme).
///
/// A freshly added node starts clean; it runs once something delivers a
/// value to it, or after an explicit [`invalidate`](Self::invalidate) (which
/// is how source nodes with no inputs are triggered).
///
/// The manager holds no reference to the graph; the caller passes it in,
/// which keeps graph mutation and propagation in one control flow and makes
/// reentrant mutation from inside a propagation pass impossible to express.
pub struct SignalManager {
    events: flume::Receiver<SchemeEvent>,
    states: FxHashMap<NodeId, NodeSignalState>,
    pending_lifecycle: Vec<Lifecycle>,
    max_batches: usize,
}

impl SignalManager {
    /// Subscribe a new manager to `graph`.
    ///
    /// Attach before populating the graph so the manager observes every
    /// construction event.
    #[must_use]
    pub fn attach(graph: &mut WorkflowGraph) -> Self {
        Self {
            events: graph.subscribe(),
            states: FxHashMap::default(),
            pending_lifecycle: Vec::new(),
            max_batches: DEFAULT_MAX_BATCHES,
        }
    }

    #[must_use]
    pub fn with_max_batches(mut self, max_batches: usize) -> Self {
        self.max_batches = max_batches.max(1);
        self
    }

    /// Mark a node dirty so it executes on the next pass even without a new
    /// input delivery. This is how nodes without inputs are started.
    pub fn invalidate(&mut self, node: NodeId) {
        self.states.entry(node).or_default().dirty = true;
    }

    #[must_use]
    pub fn is_dirty(&self, node: NodeId) -> bool {
        self.states.get(&node).is_some_and(|s| s.dirty)
    }

    /// The value last published on a node's output channel, if any.
    #[must_use]
    pub fn published_output(&self, node: NodeId, channel: &str) -> Option<&Value> {
        self.states.get(&node).and_then(|s| s.outputs.get(channel))
    }

    /// Values currently stored on a node's input channel (one per delivering
    /// link; order unspecified).
    #[must_use]
    pub fn stored_inputs(&self, node: NodeId, channel: &str) -> Vec<&Value> {
        self.states
            .get(&node)
            .map(|s| {
                s.inputs
                    .iter()
                    .filter(|(slot, _)| slot.channel == channel)
                    .map(|(_, v)| v)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Publish an output value on behalf of a node, as if it had been
    /// computed. This is the entry point for values originating outside the
    /// scheduler (a source node's result, a value pushed by the host).
    ///
    /// Delivery is equality-gated like any other publication: re-sending the
    /// identical value does not dirty downstream nodes.
    pub fn send(
        &mut self,
        graph: &WorkflowGraph,
        node: NodeId,
        channel: &str,
        value: Value,
    ) -> Result<(), SchemeError> {
        self.absorb_events();
        let node_ref = graph.node(node)?;
        node_ref
            .descriptor()
            .find_output(channel)
            .ok_or_else(|| SchemeError::ChannelNotFound {
                descriptor: node_ref.descriptor().id().to_string(),
                channel: channel.to_string(),
                direction: ChannelDirection::Output,
            })?;
        self.publish(graph, node, channel, Some(value));
        Ok(())
    }

    /// Drain pending graph events and run dirty nodes to quiescence.
    ///
    /// Each batch executes the nodes that were ready when the batch started,
    /// in an order consistent with a topological sort of the enabled-link
    /// dependency graph (nodes on cycles run after the acyclic prefix, in
    /// insertion order). Readiness is re-checked right before each node runs:
    /// a node whose required input was withdrawn earlier in the same batch is
    /// skipped, staying dirty for a later pass. Nodes dirtied *by* a batch wait for the next one, so
    /// a feedback loop can never recurse unboundedly within one call; after
    /// [`max_batches`](Self::with_max_batches) batches without quiescence the
    /// pass stops and reports a stall.
    ///
    /// Execution failures are collected in the summary; the failing node's
    /// outputs are withdrawn (clearing stale downstream values) and the node
    /// is left clean, so the next input change retries it naturally.
    pub async fn process_pending(
        &mut self,
        graph: &WorkflowGraph,
        executor: &dyn NodeExecutor,
    ) -> PropagationSummary {
        self.absorb_events();
        self.dispatch_lifecycle(graph, executor).await;

        let mut summary = PropagationSummary::default();
        loop {
            let ready = self.ready_nodes(graph);
            if ready.is_empty() {
                break;
            }
            if summary.batches >= self.max_batches {
                summary.stalled = true;
                tracing::warn!(
                    batches = summary.batches,
                    pending = ready.len(),
                    "propagation stalled; scheme is oscillating"
                );
                break;
            }
            summary.batches += 1;
            for id in ready {
                let Ok(node) = graph.node(id) else { continue };
                // A failure earlier in this batch may have withdrawn one of
                // this node's required inputs. Skip it; it stays dirty and
                // waits for the next pass.
                if !self.states.get(&id).is_some_and(|s| s.dirty) || !self.is_satisfied(node) {
                    continue;
                }
                if let Some(state) = self.states.get_mut(&id) {
                    state.dirty = false;
                }
                let inputs = self.collect_inputs(graph, id);
                tracing::debug!(node = %id, inputs = inputs.len(), "executing node");
                let result = executor
                    .execute(ExecuteContext {
                        node: id,
                        descriptor: node.descriptor().as_ref(),
                        title: node.title(),
                        properties: node.properties(),
                        inputs: &inputs,
                    })
                    .await;
                match result {
                    Ok(outputs) => {
                        self.apply_outputs(graph, id, node, outputs);
                        summary.executed.push(id);
                    }
                    Err(error) => {
                        tracing::warn!(node = %id, %error, "node execution failed");
                        for output in node.descriptor().outputs() {
                            self.publish(graph, id, &output.name, None);
                        }
                        summary.reports.push(ExecutionReport::new(id, error));
                    }
                }
            }
        }
        summary
    }

    // ------------------------------------------------------------------
    // Event intake
    // ------------------------------------------------------------------

    fn absorb_events(&mut self) {
        let events: Vec<SchemeEvent> = self.events.try_iter().collect();
        for event in events {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: SchemeEvent) {
        match event {
            SchemeEvent::NodeAdded { node, .. } => {
                self.states.entry(node).or_default();
                self.pending_lifecycle.push(Lifecycle::Created(node));
            }
            SchemeEvent::NodeRemoved { node } => {
                self.states.remove(&node);
                self.pending_lifecycle.push(Lifecycle::Destroyed(node));
            }
            SchemeEvent::LinkAdded { link } => {
                if link.enabled() {
                    self.attach_link(&link);
                }
            }
            SchemeEvent::LinkRemoved { link } => self.detach_link(&link),
            SchemeEvent::LinkEnabledChanged { link, enabled } => {
                if enabled {
                    self.attach_link(&link);
                } else {
                    self.detach_link(&link);
                }
            }
            SchemeEvent::TitleChanged { .. }
            | SchemeEvent::DescriptionChanged { .. }
            | SchemeEvent::AnnotationAdded { .. }
            | SchemeEvent::AnnotationRemoved { .. } => {}
        }
    }

    /// A link became live: if the source already published on that channel,
    /// deliver the value to the sink now.
    fn attach_link(&mut self, link: &SchemeLink) {
        let value = self
            .states
            .get(&link.source_node())
            .and_then(|s| s.outputs.get(link.source_channel()))
            .cloned();
        if let Some(value) = value {
            self.deliver(link, Some(value));
        }
    }

    /// A link went away (or was disabled): clear the sink's stored value for
    /// it, so a stale value is never reused.
    fn detach_link(&mut self, link: &SchemeLink) {
        self.deliver(link, None);
    }

    fn deliver(&mut self, link: &SchemeLink, value: Option<Value>) {
        let state = self.states.entry(link.sink_node()).or_default();
        let slot = InputSlot {
            channel: link.sink_channel().to_string(),
            link: link.id(),
        };
        match value {
            Some(value) => {
                state.inputs.insert(slot, value);
                state.dirty = true;
            }
            None => {
                if state.inputs.remove(&slot).is_some() {
                    state.dirty = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Publication
    // ------------------------------------------------------------------

    /// Record a node's output and fan it out over enabled links.
    ///
    /// `None` withdraws the channel's published value. Either way, nothing
    /// happens if the new value equals the previously published one.
    fn publish(&mut self, graph: &WorkflowGraph, node: NodeId, channel: &str, value: Option<Value>) {
        let previous = self.states.get(&node).and_then(|s| s.outputs.get(channel));
        if previous == value.as_ref() {
            return;
        }
        {
            let state = self.states.entry(node).or_default();
            match &value {
                Some(v) => {
                    state.outputs.insert(channel.to_string(), v.clone());
                }
                None => {
                    state.outputs.remove(channel);
                }
            }
        }
        let targets: Vec<SchemeLink> = graph
            .links()
            .iter()
            .filter(|l| l.enabled() && l.source_node() == node && l.source_channel() == channel)
            .cloned()
            .collect();
        for link in targets {
            self.deliver(&link, value.clone());
        }
    }

    fn apply_outputs(
        &mut self,
        graph: &WorkflowGraph,
        node_id: NodeId,
        node: &SchemeNode,
        mut outputs: OutputMap,
    ) {
        // Declared order keeps downstream delivery deterministic.
        for output in node.descriptor().outputs() {
            if let Some(value) = outputs.remove(&output.name) {
                self.publish(graph, node_id, &output.name, value);
            }
        }
        for channel in outputs.keys() {
            tracing::warn!(node = %node_id, channel, "ignoring undeclared output channel");
        }
    }

    // ------------------------------------------------------------------
    // Readiness and ordering
    // ------------------------------------------------------------------

    fn is_satisfied(&self, node: &SchemeNode) -> bool {
        let state = self.states.get(&node.id());
        node.descriptor().inputs().iter().all(|input| {
            input.flags.optional
                || state.is_some_and(|s| s.inputs.keys().any(|slot| slot.channel == input.name))
        })
    }

    /// Dirty, input-satisfied nodes in dependency order: a Kahn topological
    /// sort over enabled links, with cyclic leftovers appended in node
    /// insertion order.
    fn ready_nodes(&self, graph: &WorkflowGraph) -> Vec<NodeId> {
        let mut indegree: FxHashMap<NodeId, usize> =
            graph.nodes().iter().map(|n| (n.id(), 0)).collect();
        for link in graph.links() {
            if link.enabled() {
                if let Some(d) = indegree.get_mut(&link.sink_node()) {
                    *d += 1;
                }
            }
        }

        let mut order: Vec<NodeId> = Vec::with_capacity(graph.nodes().len());
        let mut placed: FxHashSet<NodeId> = FxHashSet::default();
        loop {
            let next = graph
                .nodes()
                .iter()
                .map(SchemeNode::id)
                .find(|id| !placed.contains(id) && indegree[id] == 0);
            let Some(id) = next else { break };
            placed.insert(id);
            order.push(id);
            for link in graph.links() {
                if link.enabled() && link.source_node() == id {
                    if let Some(d) = indegree.get_mut(&link.sink_node()) {
                        *d = d.saturating_sub(1);
                    }
                }
            }
        }
        // Whatever remains sits on a cycle.
        for node in graph.nodes() {
            if !placed.contains(&node.id()) {
                order.push(node.id());
            }
        }

        order
            .into_iter()
            .filter(|id| {
                self.states.get(id).is_some_and(|s| s.dirty)
                    && graph.node(*id).is_ok_and(|n| self.is_satisfied(n))
            })
            .collect()
    }

    /// Resolved input values for one node: per channel, the stored value of
    /// every enabled delivering link, in link insertion order.
    fn collect_inputs(&self, graph: &WorkflowGraph, node: NodeId) -> InputMap {
        let mut map = InputMap::default();
        let Some(state) = self.states.get(&node) else {
            return map;
        };
        for link in graph.links() {
            if link.sink_node() == node && link.enabled() {
                let slot = InputSlot {
                    channel: link.sink_channel().to_string(),
                    link: link.id(),
                };
                if let Some(value) = state.inputs.get(&slot) {
                    map.entry(link.sink_channel().to_string())
                        .or_default()
                        .push(value.clone());
                }
            }
        }
        map
    }

    async fn dispatch_lifecycle(&mut self, graph: &WorkflowGraph, executor: &dyn NodeExecutor) {
        for item in std::mem::take(&mut self.pending_lifecycle) {
            match item {
                Lifecycle::Created(id) => {
                    if let Ok(node) = graph.node(id) {
                        executor.node_created(node).await;
                    }
                }
                Lifecycle::Destroyed(id) => executor.node_destroyed(id).await,
            }
        }
    }
}
