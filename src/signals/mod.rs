//! Signal propagation: scheduling node executions as values move through
//! the graph.
//!
//! The [`SignalManager`] observes a [`WorkflowGraph`](crate::scheme::WorkflowGraph)
//! through its event stream and maintains, per node, the latest value
//! delivered on each input slot and the latest value published on each
//! output channel. [`process_pending`](SignalManager::process_pending) runs
//! dirty nodes through a [`NodeExecutor`] in dependency order until the
//! scheme is quiescent, with equality-gated delivery so unchanged outputs do
//! not re-trigger downstream work.
//!
//! [`ProgramExecutor`] is the batteries-included executor: hosts register a
//! [`NodeProgram`] factory per descriptor id and it takes care of per-node
//! instantiation and teardown.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use serde_json::json;
//! use async_trait::async_trait;
//! use flowscheme::registry::{NodeDescriptor, TypeRegistry};
//! use flowscheme::scheme::WorkflowGraph;
//! use flowscheme::signals::{
//!     ExecuteContext, ExecutionError, NodeExecutor, OutputMap, SignalManager,
//! };
//!
//! struct Doubler;
//!
//! #[async_trait]
//! impl NodeExecutor for Doubler {
//!     async fn execute(&self, ctx: ExecuteContext<'_>) -> Result<OutputMap, ExecutionError> {
//!         let mut out = OutputMap::default();
//!         if let Some(values) = ctx.inputs.get("In") {
//!             let n = values[0].as_i64().unwrap_or(0);
//!             out.insert("Out".to_string(), Some(json!(n * 2)));
//!         }
//!         Ok(out)
//!     }
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), flowscheme::scheme::SchemeError> {
//! let mut types = TypeRegistry::new();
//! types.register_type("Number");
//! let mut graph = WorkflowGraph::new(Arc::new(types));
//! let mut manager = SignalManager::attach(&mut graph);
//!
//! let source = graph.new_node(
//!     NodeDescriptor::builder("demo.source", "Source")
//!         .output("Out", "Number")
//!         .build_arc(),
//! );
//! let doubler = graph.new_node(
//!     NodeDescriptor::builder("demo.double", "Double")
//!         .single_input("In", ["Number"])
//!         .output("Out", "Number")
//!         .build_arc(),
//! );
//! graph.new_link(source, "Out", doubler, "In")?;
//!
//! manager.send(&graph, source, "Out", json!(21))?;
//! let summary = manager.process_pending(&graph, &Doubler).await;
//! assert_eq!(summary.executed, vec![doubler]);
//! assert_eq!(manager.published_output(doubler, "Out"), Some(&json!(42)));
//! # Ok(())
//! # }
//! ```

mod executor;
mod manager;
mod programs;


pub use executor::{
    ExecuteContext, ExecutionError, ExecutionReport, InputMap, NodeExecutor, OutputMap,
};
pub use manager::{PropagationSummary, SignalManager, DEFAULT_MAX_BATCHES};
pub use programs::{
    ExecutorConfig, NodeProgram, ProgramExecutor, ProgramFactory, ProgramRegistry,
};
