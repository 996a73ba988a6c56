//! Unit tests for the workflow graph aggregate.

use rustc_hash::FxHashMap;
use serde_json::json;
use std::sync::Arc;

use crate::registry::{NodeDescriptor, TypeRegistry};
use crate::types::{LinkId, NodeId, ProcessingState};

use super::{LinkFilter, SchemeError, SchemeEvent, SchemeLink, WorkflowGraph};

fn test_types() -> Arc<TypeRegistry> {
    let mut types = TypeRegistry::new();
    types.register_type("Data");
    types.register_type("Learner");
    types.register_subtype("Table", "Data");
    Arc::new(types)
}

fn file_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("test.file", "File")
        .output("Data", "Data")
        .build_arc()
}

fn discretize_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("test.discretize", "Discretize")
        .single_input("Data", ["Data"])
        .output("Data", "Data")
        .build_arc()
}

fn learner_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("test.bayes", "Naive Bayes")
        .single_input("Data", ["Data"])
        .output("Learner", "Learner")
        .build_arc()
}

fn view_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("test.view", "View")
        .multi_input("Data", ["Data"])
        .build_arc()
}

#[test]
fn new_graph_defaults() {
    let graph = WorkflowGraph::new(test_types());
    assert_eq!(graph.title(), "untitled");
    assert_eq!(graph.description(), "");
    assert!(graph.nodes().is_empty());
    assert!(graph.links().is_empty());
}

#[test]
fn node_and_link_events_in_order() {
    let mut graph = WorkflowGraph::new(test_types());
    let events = graph.subscribe();

    let a = graph.new_node(file_desc());
    let b = graph.new_node(discretize_desc());
    let link = graph.new_link(a, "Data", b, "Data").unwrap();

    let collected: Vec<SchemeEvent> = events.drain().collect();
    assert_eq!(collected.len(), 3);
    assert!(matches!(collected[0], SchemeEvent::NodeAdded { node, .. } if node == a));
    assert!(matches!(collected[1], SchemeEvent::NodeAdded { node, .. } if node == b));
    assert!(
        matches!(&collected[2], SchemeEvent::LinkAdded { link: l } if l.id() == link.id())
    );
}

#[test]
fn self_loop_rejected_regardless_of_channels() {
    let mut graph = WorkflowGraph::new(test_types());
    let b = graph.new_node(discretize_desc());
    let err = graph.new_link(b, "Data", b, "Data").unwrap_err();
    assert!(matches!(err, SchemeError::SelfLoop { node } if node == b));
    assert!(graph.links().is_empty());
}

#[test]
fn incompatible_types_leave_link_set_unchanged() {
    let mut graph = WorkflowGraph::new(test_types());
    let learner = graph.new_node(learner_desc());
    let disc = graph.new_node(discretize_desc());

    let before = graph.links().len();
    let err = graph.new_link(learner, "Learner", disc, "Data").unwrap_err();
    assert!(matches!(err, SchemeError::IncompatibleChannels { .. }));
    assert_eq!(graph.links().len(), before);
}

#[test]
fn subtype_output_accepted_by_supertype_sink() {
    let mut graph = WorkflowGraph::new(test_types());
    let table_source = graph.new_node(
        NodeDescriptor::builder("test.sql", "SQL")
            .output("Table", "Table")
            .build_arc(),
    );
    let disc = graph.new_node(discretize_desc());
    assert!(graph.new_link(table_source, "Table", disc, "Data").is_ok());
}

#[test]
fn missing_channel_is_reported_before_anything_else() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let b = graph.new_node(discretize_desc());

    // File has no input channels at all.
    let err = graph.new_link(b, "Data", a, "Data").unwrap_err();
    assert!(matches!(err, SchemeError::ChannelNotFound { .. }));

    let err = graph.new_link(a, "Bogus", b, "Data").unwrap_err();
    assert!(matches!(err, SchemeError::ChannelNotFound { .. }));
}

#[test]
fn single_input_sink_accepts_exactly_one_enabled_link() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let b = graph.new_node(file_desc());
    let sink = graph.new_node(discretize_desc());

    let first = graph.new_link(a, "Data", sink, "Data").unwrap();
    let err = graph.new_link(b, "Data", sink, "Data").unwrap_err();
    assert!(matches!(err, SchemeError::SinkChannelOccupied { existing, .. }
        if existing == first.id()));

    // The first link is untouched.
    assert_eq!(graph.links().len(), 1);
    assert_eq!(graph.links()[0].id(), first.id());

    // A disabled second link is fine; enabling it is not while the first is live.
    let second = graph
        .add_link(SchemeLink::new(b, "Data", sink, "Data").disabled())
        .unwrap();
    let err = graph.set_link_enabled(second.id(), true).unwrap_err();
    assert!(matches!(err, SchemeError::SinkChannelOccupied { .. }));

    graph.remove_link(first.id()).unwrap();
    graph.set_link_enabled(second.id(), true).unwrap();
}

#[test]
fn multi_input_sink_accepts_many() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let b = graph.new_node(file_desc());
    let view = graph.new_node(view_desc());

    graph.new_link(a, "Data", view, "Data").unwrap();
    graph.new_link(b, "Data", view, "Data").unwrap();
    assert_eq!(graph.links_to(view).len(), 2);
}

#[test]
fn find_links_filters() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let b = graph.new_node(discretize_desc());
    let c = graph.new_node(learner_desc());

    let l1 = graph.new_link(a, "Data", b, "Data").unwrap();
    let l2 = graph.new_link(a, "Data", c, "Data").unwrap();

    let found = graph.find_links(LinkFilter::new().source(a).sink(b));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), l1.id());

    let found = graph.find_links(LinkFilter::new().sink(c));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id(), l2.id());

    graph.remove_link(l2.id()).unwrap();
    assert!(graph.find_links(LinkFilter::new().sink(c)).is_empty());

    // Wildcard filter returns everything in insertion order.
    let all = graph.find_links(LinkFilter::new());
    assert_eq!(all.len(), 1);
}

#[test]
fn remove_node_drops_incident_links_first() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let b = graph.new_node(discretize_desc());
    let c = graph.new_node(learner_desc());
    graph.new_link(a, "Data", b, "Data").unwrap();
    graph.new_link(b, "Data", c, "Data").unwrap();

    let events = graph.subscribe();
    graph.remove_node(b).unwrap();

    let collected: Vec<SchemeEvent> = events.drain().collect();
    assert_eq!(collected.len(), 3);
    assert!(matches!(collected[0], SchemeEvent::LinkRemoved { .. }));
    assert!(matches!(collected[1], SchemeEvent::LinkRemoved { .. }));
    assert!(matches!(collected[2], SchemeEvent::NodeRemoved { node } if node == b));
    assert!(graph.links().is_empty());
    assert!(!graph.contains_node(b));
}

#[test]
fn remove_isolated_node_emits_only_node_removed() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());
    let events = graph.subscribe();
    graph.remove_node(a).unwrap();
    let collected: Vec<SchemeEvent> = events.drain().collect();
    assert_eq!(collected.len(), 1);
    assert!(matches!(collected[0], SchemeEvent::NodeRemoved { node } if node == a));
}

#[test]
fn operations_on_absent_entities_fail() {
    let mut graph = WorkflowGraph::new(test_types());
    assert!(matches!(
        graph.remove_node(NodeId(99)),
        Err(SchemeError::NodeNotInGraph { .. })
    ));
    assert!(matches!(
        graph.remove_link(LinkId(99)),
        Err(SchemeError::LinkNotInGraph { .. })
    ));
}

#[test]
fn node_metadata_setters() {
    let mut graph = WorkflowGraph::new(test_types());
    let a = graph.new_node(file_desc());

    graph.set_node_title(a, "My File").unwrap();
    graph.set_node_progress(a, 150.0).unwrap();
    graph
        .set_node_processing_state(a, ProcessingState::Running)
        .unwrap();
    let mut props = FxHashMap::default();
    props.insert("path".to_string(), json!("/tmp/iris.tab"));
    graph.set_node_properties(a, props).unwrap();

    let node = graph.node(a).unwrap();
    assert_eq!(node.title(), "My File");
    assert_eq!(node.progress(), 100.0);
    assert_eq!(node.processing_state(), ProcessingState::Running);
    assert_eq!(node.properties()["path"], json!("/tmp/iris.tab"));
}

#[test]
fn title_and_description_events() {
    let mut graph = WorkflowGraph::new(test_types());
    let events = graph.subscribe();
    graph.set_title("Flow");
    graph.set_description("demo");
    assert!(matches!(
        events.try_recv().unwrap(),
        SchemeEvent::TitleChanged { title } if title == "Flow"
    ));
    assert!(matches!(
        events.try_recv().unwrap(),
        SchemeEvent::DescriptionChanged { description } if description == "demo"
    ));
}

#[test]
fn annotations_share_the_event_protocol() {
    use super::Annotation;
    let mut graph = WorkflowGraph::new(test_types());
    let events = graph.subscribe();

    let id = graph.add_annotation(Annotation::text((0.0, 0.0, 100.0, 40.0), "note"));
    assert!(matches!(
        events.try_recv().unwrap(),
        SchemeEvent::AnnotationAdded { annotation } if annotation == id
    ));

    graph.remove_annotation(id).unwrap();
    assert!(matches!(
        events.try_recv().unwrap(),
        SchemeEvent::AnnotationRemoved { annotation } if annotation == id
    ));
    assert!(graph.annotations().is_empty());
}

#[test]
fn cross_node_cycles_are_structurally_permitted() {
    let mut graph = WorkflowGraph::new(test_types());
    let x = graph.new_node(discretize_desc());
    let y = graph.new_node(discretize_desc());
    graph.new_link(x, "Data", y, "Data").unwrap();
    graph.new_link(y, "Data", x, "Data").unwrap();
    assert_eq!(graph.links().len(), 2);
}
