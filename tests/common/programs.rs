//! Node programs backing the toolbox descriptors, plus a probe for
//! observing what reached the terminal view node.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::{json, Value};

use flowscheme::signals::{
    ExecutionError, ExecutorConfig, InputMap, NodeProgram, OutputMap, ProgramExecutor,
    ProgramRegistry,
};

/// Shared observation point for assertions across program instances.
#[derive(Default)]
pub struct Probe {
    pub viewed: Mutex<Vec<Value>>,
    pub destroyed: AtomicUsize,
}

impl Probe {
    pub fn viewed(&self) -> Vec<Value> {
        self.viewed.lock().unwrap().clone()
    }

    pub fn destroyed(&self) -> usize {
        self.destroyed.load(Ordering::SeqCst)
    }
}

/// Emits the node's "rows" property on its Data output.
struct FileProgram;

#[async_trait]
impl NodeProgram for FileProgram {
    async fn run(
        &mut self,
        _inputs: &InputMap,
        properties: &FxHashMap<String, Value>,
    ) -> Result<OutputMap, ExecutionError> {
        let mut out = OutputMap::default();
        match properties.get("rows") {
            Some(rows) => {
                out.insert("Data".to_string(), Some(rows.clone()));
            }
            None => {
                return Err(ExecutionError::BadInput {
                    channel: "Data".to_string(),
                    reason: "no rows configured".to_string(),
                });
            }
        }
        Ok(out)
    }
}

/// Tags whatever arrives and passes it along.
struct DiscretizeProgram;

#[async_trait]
impl NodeProgram for DiscretizeProgram {
    async fn run(
        &mut self,
        inputs: &InputMap,
        _properties: &FxHashMap<String, Value>,
    ) -> Result<OutputMap, ExecutionError> {
        let mut out = OutputMap::default();
        if let Some(data) = inputs.get("Data").and_then(|v| v.first()) {
            out.insert(
                "Data".to_string(),
                Some(json!({ "discretized": data })),
            );
        }
        Ok(out)
    }
}

/// Produces a summary "model" from its training data.
struct LearnerProgram;

#[async_trait]
impl NodeProgram for LearnerProgram {
    async fn run(
        &mut self,
        inputs: &InputMap,
        _properties: &FxHashMap<String, Value>,
    ) -> Result<OutputMap, ExecutionError> {
        let mut out = OutputMap::default();
        if let Some(data) = inputs.get("Data").and_then(|v| v.first()) {
            let rows = data.as_array().map_or(0, Vec::len);
            out.insert(
                "Classifier".to_string(),
                Some(json!({ "model": "bayes", "rows": rows })),
            );
        }
        Ok(out)
    }
}

/// Terminal sink recording everything it receives into the probe.
struct ViewProgram {
    probe: Arc<Probe>,
}

#[async_trait]
impl NodeProgram for ViewProgram {
    async fn run(
        &mut self,
        inputs: &InputMap,
        _properties: &FxHashMap<String, Value>,
    ) -> Result<OutputMap, ExecutionError> {
        if let Some(values) = inputs.get("Data") {
            self.probe.viewed.lock().unwrap().extend(values.iter().cloned());
        }
        Ok(OutputMap::default())
    }

    fn on_destroy(&mut self) {
        self.probe.destroyed.fetch_add(1, Ordering::SeqCst);
    }
}

/// Executor wired up with programs for every toolbox descriptor.
pub fn toolbox_executor(probe: Arc<Probe>) -> ProgramExecutor {
    let mut programs = ProgramRegistry::new();
    programs.register_fn("toolbox.file", |_| Box::new(FileProgram));
    programs.register_fn("toolbox.discretize", |_| Box::new(DiscretizeProgram));
    programs.register_fn("toolbox.bayes", |_| Box::new(LearnerProgram));
    programs.register_fn("toolbox.view", move |_| {
        Box::new(ViewProgram {
            probe: probe.clone(),
        })
    });
    ProgramExecutor::new(programs, ExecutorConfig::new())
}
