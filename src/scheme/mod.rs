//! Workflow graph model: nodes, links, annotations, and change events.
//!
//! The [`WorkflowGraph`] owns the scheme's entities and enforces structural
//! and type invariants on every mutation:
//!
//! - link endpoints always reference live nodes,
//! - channel names resolve against each node's descriptor,
//! - the source channel's type is acceptable to the sink channel (per the
//!   [`TypeRegistry`](crate::registry::TypeRegistry)),
//! - self-loops are rejected outright,
//! - a single-input sink channel holds at most one enabled incoming link.
//!
//! Cross-node cycles are structurally permitted; bounding their propagation
//! is the [`signals`](crate::signals) module's job.
//!
//! Every successful mutation emits a [`SchemeEvent`] to all subscribers
//! before the call returns, so observers (the signal manager, a UI) always
//! see a consistent history. Failed mutations change nothing.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use flowscheme::registry::{NodeDescriptor, TypeRegistry};
//! use flowscheme::scheme::{LinkFilter, SchemeEvent, WorkflowGraph};
//!
//! let types = Arc::new(TypeRegistry::new());
//! let file = NodeDescriptor::builder("core.file", "File")
//!     .output("Data", "Data")
//!     .build_arc();
//! let table = NodeDescriptor::builder("core.table", "Table")
//!     .single_input("Data", ["Data"])
//!     .build_arc();
//!
//! let mut graph = WorkflowGraph::new(types);
//! let events = graph.subscribe();
//!
//! let a = graph.new_node(file);
//! let b = graph.new_node(table);
//! graph.new_link(a, "Data", b, "Data")?;
//!
//! assert_eq!(graph.find_links(LinkFilter::new().source(a).sink(b)).len(), 1);
//! assert!(matches!(events.try_recv(), Ok(SchemeEvent::NodeAdded { .. })));
//!
//! graph.remove_node(a)?; // removes the link first, then the node
//! assert!(graph.links().is_empty());
//! # Ok::<(), flowscheme::scheme::SchemeError>(())
//! ```

mod annotations;
mod errors;
mod events;
mod graph;
mod link;
mod node;
mod snapshot;

#[cfg(test)]
mod tests;

pub use annotations::Annotation;
pub use errors::SchemeError;
pub use events::SchemeEvent;
pub use graph::{LinkFilter, WorkflowGraph};
pub use link::SchemeLink;
pub use node::SchemeNode;
pub use snapshot::{LinkRecord, NodeRecord, SchemeSnapshot};
