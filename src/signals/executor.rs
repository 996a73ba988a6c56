//! The execution boundary between the scheduler and node computations.
//!
//! The scheduler never inspects what a node computes. It hands the executor a
//! resolved view of the node (descriptor, title, property bag, input values)
//! and receives back a mapping of output channels to new values. Everything
//! domain-specific, including node lifecycle, lives behind [`NodeExecutor`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

use crate::registry::NodeDescriptor;
use crate::scheme::SchemeNode;
use crate::types::NodeId;

/// Resolved input values per channel.
///
/// Single-input channels carry exactly one value; multi-input channels carry
/// one value per live delivering link, in link insertion order. Channels with
/// no delivered value are absent.
pub type InputMap = FxHashMap<String, Vec<Value>>;

/// Output values per channel, as returned by an execution.
///
/// - `Some(value)` publishes the value (delivered downstream only if it
///   differs from the previously published one).
/// - `None` withdraws the channel's published value and clears it from
///   downstream sinks.
/// - Channels absent from the map are left unchanged.
pub type OutputMap = FxHashMap<String, Option<Value>>;

/// Everything an executor gets to see about the node it is running.
#[derive(Debug)]
pub struct ExecuteContext<'a> {
    pub node: NodeId,
    pub descriptor: &'a NodeDescriptor,
    pub title: &'a str,
    pub properties: &'a FxHashMap<String, Value>,
    pub inputs: &'a InputMap,
}

/// Failure of a single node's computation.
///
/// Execution errors are isolated: the scheduler suppresses the failing
/// node's outputs and carries on with the rest of the batch.
#[derive(Debug, Error, Diagnostic)]
pub enum ExecutionError {
    /// The node's program reported a failure.
    #[error("program failed: {0}")]
    #[diagnostic(code(flowscheme::signals::program_failed))]
    Program(String),

    /// A required input was missing or malformed from the program's view.
    #[error("bad input on channel {channel:?}: {reason}")]
    #[diagnostic(code(flowscheme::signals::bad_input))]
    BadInput { channel: String, reason: String },

    /// No program is registered for the node's descriptor.
    #[error("no program registered for descriptor {descriptor:?}")]
    #[diagnostic(
        code(flowscheme::signals::unknown_program),
        help("Register a factory for this descriptor id before scheduling.")
    )]
    UnknownProgram { descriptor: String },

    /// Value (de)serialization failed inside the program.
    #[error(transparent)]
    #[diagnostic(code(flowscheme::signals::serde_json))]
    Serde(#[from] serde_json::Error),
}

/// Adapter that runs node computations and owns their lifecycle.
///
/// Implementations may do the work wherever they like (inline, on a worker
/// pool); the scheduler awaits one execution at a time and applies results in
/// receipt order, so implementations never see two callbacks for the same
/// manager concurrently.
#[async_trait]
pub trait NodeExecutor: Send + Sync {
    /// Run one node with its current resolved inputs.
    async fn execute(&self, ctx: ExecuteContext<'_>) -> Result<OutputMap, ExecutionError>;

    /// A node entered the graph. Default: no-op.
    async fn node_created(&self, _node: &SchemeNode) {}

    /// A node left the graph (its links are already gone). Default: no-op.
    async fn node_destroyed(&self, _node: NodeId) {}
}

/// One recorded execution failure, tied to its node.
#[derive(Debug)]
pub struct ExecutionReport {
    pub node: NodeId,
    pub error: ExecutionError,
    pub when: DateTime<Utc>,
}

impl ExecutionReport {
    pub(crate) fn new(node: NodeId, error: ExecutionError) -> Self {
        Self {
            node,
            error,
            when: Utc::now(),
        }
    }
}
