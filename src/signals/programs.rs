//! Factory-based node programs and the default executor built on them.
//!
//! Instead of looking node implementations up by qualified name at run time,
//! hosts register a factory per descriptor id. The [`ProgramExecutor`]
//! instantiates a [`NodeProgram`] when a node enters the graph (or lazily on
//! first execution, which covers schemes rebuilt from snapshots) and drops it
//! when the node leaves.

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::scheme::SchemeNode;
use crate::types::NodeId;

use super::executor::{ExecuteContext, ExecutionError, InputMap, NodeExecutor, OutputMap};

/// Explicit configuration handed to program factories at construction time.
///
/// The graph and scheduler never read this; it exists so programs do not
/// reach for ambient global configuration.
#[derive(Clone, Debug, Default)]
pub struct ExecutorConfig {
    settings: FxHashMap<String, Value>,
}

impl ExecutorConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

/// A single node's computation, instantiated per node instance.
#[async_trait]
pub trait NodeProgram: Send + Sync {
    /// Compute output values from the current inputs and property bag.
    async fn run(
        &mut self,
        inputs: &InputMap,
        properties: &FxHashMap<String, Value>,
    ) -> Result<OutputMap, ExecutionError>;

    /// Teardown hook, called when the owning node is removed. Default: no-op.
    fn on_destroy(&mut self) {}
}

/// Constructs a fresh program for one node instance.
pub type ProgramFactory = Arc<dyn Fn(&ExecutorConfig) -> Box<dyn NodeProgram> + Send + Sync>;

/// Maps descriptor ids to program factories.
#[derive(Default)]
pub struct ProgramRegistry {
    factories: FxHashMap<String, ProgramFactory>,
}

impl ProgramRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory for a descriptor id, replacing any previous one.
    pub fn register(&mut self, descriptor_id: impl Into<String>, factory: ProgramFactory) {
        self.factories.insert(descriptor_id.into(), factory);
    }

    /// Convenience wrapper taking a plain closure.
    pub fn register_fn<F>(&mut self, descriptor_id: impl Into<String>, factory: F)
    where
        F: Fn(&ExecutorConfig) -> Box<dyn NodeProgram> + Send + Sync + 'static,
    {
        self.register(descriptor_id, Arc::new(factory));
    }

    #[must_use]
    pub fn get(&self, descriptor_id: &str) -> Option<&ProgramFactory> {
        self.factories.get(descriptor_id)
    }
}

/// [`NodeExecutor`] that dispatches to registered [`NodeProgram`]s.
pub struct ProgramExecutor {
    registry: ProgramRegistry,
    config: ExecutorConfig,
    programs: Mutex<FxHashMap<NodeId, Box<dyn NodeProgram>>>,
}

impl ProgramExecutor {
    #[must_use]
    pub fn new(registry: ProgramRegistry, config: ExecutorConfig) -> Self {
        Self {
            registry,
            config,
            programs: Mutex::new(FxHashMap::default()),
        }
    }
}

#[async_trait]
impl NodeExecutor for ProgramExecutor {
    async fn execute(&self, ctx: ExecuteContext<'_>) -> Result<OutputMap, ExecutionError> {
        let mut programs = self.programs.lock().await;
        if !programs.contains_key(&ctx.node) {
            // Lazy instantiation covers nodes that predate this executor,
            // e.g. a scheme restored from a snapshot.
            let factory =
                self.registry
                    .get(ctx.descriptor.id())
                    .ok_or_else(|| ExecutionError::UnknownProgram {
                        descriptor: ctx.descriptor.id().to_string(),
                    })?;
            programs.insert(ctx.node, factory(&self.config));
        }
        let program = programs.get_mut(&ctx.node).expect("inserted above");
        program.run(ctx.inputs, ctx.properties).await
    }

    async fn node_created(&self, node: &SchemeNode) {
        let Some(factory) = self.registry.get(node.descriptor().id()) else {
            tracing::warn!(
                node = %node.id(),
                descriptor = node.descriptor().id(),
                "no program factory registered"
            );
            return;
        };
        tracing::debug!(node = %node.id(), descriptor = node.descriptor().id(), "creating program");
        self.programs
            .lock()
            .await
            .insert(node.id(), factory(&self.config));
    }

    async fn node_destroyed(&self, node: NodeId) {
        if let Some(mut program) = self.programs.lock().await.remove(&node) {
            tracing::debug!(node = %node, "destroying program");
            program.on_destroy();
        }
    }
}
