//! Shared descriptor and registry fixtures modeling a tiny data-mining
//! toolbox: a file reader, a discretizer, a learner, and a multi-input view.

use std::sync::Arc;

use flowscheme::registry::{DescriptorRegistry, NodeDescriptor, TypeRegistry};

pub fn toolbox_types() -> Arc<TypeRegistry> {
    let mut types = TypeRegistry::new();
    types.register_type("Data");
    types.register_type("Learner");
    types.register_type("Classifier");
    types.register_subtype("Table", "Data");
    Arc::new(types)
}

pub fn file_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("toolbox.file", "File")
        .output("Data", "Table")
        .build_arc()
}

pub fn discretize_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("toolbox.discretize", "Discretize")
        .single_input("Data", ["Data"])
        .output("Data", "Table")
        .build_arc()
}

pub fn learner_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("toolbox.bayes", "Naive Bayes")
        .single_input("Data", ["Data"])
        .optional_input("Preprocessor", ["Data"])
        .output("Classifier", "Classifier")
        .build_arc()
}

pub fn view_desc() -> Arc<NodeDescriptor> {
    NodeDescriptor::builder("toolbox.view", "Data View")
        .multi_input("Data", ["Data"])
        .build_arc()
}

pub fn toolbox_registry() -> DescriptorRegistry {
    let mut registry = DescriptorRegistry::new();
    registry.register(file_desc());
    registry.register(discretize_desc());
    registry.register(learner_desc());
    registry.register(view_desc());
    registry
}
