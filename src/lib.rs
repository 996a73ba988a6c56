//! # Flowscheme: a dataflow workflow core
//!
//! Flowscheme is the headless core of a visual dataflow editor: a typed
//! workflow graph, a change-notification protocol, and a signal propagation
//! scheduler. Nodes are instances of declared node kinds, links connect
//! typed output channels to typed input channels, and values pushed into the
//! graph flow downstream through an executor of the host's choosing.
//!
//! ## Core concepts
//!
//! - **Descriptors**: immutable templates declaring a node kind's channels
//! - **Scheme**: the graph aggregate enforcing structural and type invariants
//! - **Events**: every successful mutation notifies subscribers before the
//!   call returns
//! - **Signals**: dirty-tracking scheduler that runs nodes in dependency
//!   order with equality-gated delivery
//! - **Snapshots**: serde-friendly persistence of the whole scheme
//!
//! ## Quick start
//!
//! ```
//! use std::sync::Arc;
//! use flowscheme::registry::{NodeDescriptor, TypeRegistry};
//! use flowscheme::scheme::WorkflowGraph;
//!
//! let mut types = TypeRegistry::new();
//! types.register_type("Data");
//! types.register_subtype("Table", "Data");
//!
//! let file = NodeDescriptor::builder("core.file", "File")
//!     .output("Data", "Table")
//!     .build_arc();
//! let view = NodeDescriptor::builder("core.view", "View")
//!     .multi_input("Data", ["Data"])
//!     .build_arc();
//!
//! let mut graph = WorkflowGraph::new(Arc::new(types));
//! let source = graph.new_node(file);
//! let sink = graph.new_node(view);
//!
//! // "Table" is a subtype of "Data", so the link type-checks.
//! let link = graph.new_link(source, "Data", sink, "Data")?;
//! assert!(link.enabled());
//! # Ok::<(), flowscheme::scheme::SchemeError>(())
//! ```
//!
//! Driving computation through the graph is the
//! [`signals`](crate::signals) module's job; see
//! [`SignalManager`](crate::signals::SignalManager) for a worked example.
//!
//! ## Module guide
//!
//! - [`registry`] - channel type lattice and node-kind descriptors
//! - [`scheme`] - the workflow graph, its events and persistence
//! - [`signals`] - propagation scheduling and node execution
//! - [`telemetry`] - tracing setup for embedding programs
//! - [`types`] - shared identifier and geometry primitives

pub mod registry;
pub mod scheme;
pub mod signals;
pub mod telemetry;
pub mod types;
