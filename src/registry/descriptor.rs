//! Immutable node-kind descriptors and their channel declarations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use super::type_registry::ChannelTypeId;

/// Which side of a node a channel sits on. Used in diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelDirection {
    Input,
    Output,
}

impl fmt::Display for ChannelDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => f.write_str("input"),
            Self::Output => f.write_str("output"),
        }
    }
}

/// Behavioral flags on an input channel.
///
/// `single` limits the channel to at most one enabled incoming link.
/// `optional` exempts the channel from the scheduler's readiness requirement:
/// a node with an empty optional input can still execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputFlags {
    pub single: bool,
    pub optional: bool,
}

impl Default for InputFlags {
    fn default() -> Self {
        Self {
            single: true,
            optional: false,
        }
    }
}

/// A declared input channel: name, accepted value types, flags.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputChannel {
    pub name: String,
    pub accepted: Vec<ChannelTypeId>,
    pub flags: InputFlags,
}

/// A declared output channel: name and the single type it produces.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChannel {
    pub name: String,
    pub ty: ChannelTypeId,
}

/// Immutable template describing a node kind.
///
/// A descriptor carries a stable id (used for persistence and program
/// lookup), a display name, and the ordered channel declarations. Channel
/// names are unique within their direction; the [`builder`](Self::builder)
/// enforces this.
///
/// Descriptors are shared as `Arc<NodeDescriptor>` between the registry, the
/// graph's nodes, and the executor; they are never mutated after
/// construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDescriptor {
    id: String,
    name: String,
    inputs: Vec<InputChannel>,
    outputs: Vec<OutputChannel>,
}

impl NodeDescriptor {
    /// Start building a descriptor with the given stable id and display name.
    #[must_use]
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> NodeDescriptorBuilder {
        NodeDescriptorBuilder {
            id: id.into(),
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn inputs(&self) -> &[InputChannel] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[OutputChannel] {
        &self.outputs
    }

    /// Look up an input channel by name.
    #[must_use]
    pub fn find_input(&self, name: &str) -> Option<&InputChannel> {
        self.inputs.iter().find(|c| c.name == name)
    }

    /// Look up an output channel by name.
    #[must_use]
    pub fn find_output(&self, name: &str) -> Option<&OutputChannel> {
        self.outputs.iter().find(|c| c.name == name)
    }
}

/// Fluent builder for [`NodeDescriptor`].
///
/// # Examples
///
/// ```
/// use flowscheme::registry::NodeDescriptor;
///
/// let desc = NodeDescriptor::builder("core.file", "File")
///     .output("Data", "Data")
///     .build();
/// assert!(desc.inputs().is_empty());
/// assert_eq!(desc.outputs()[0].name, "Data");
/// ```
pub struct NodeDescriptorBuilder {
    id: String,
    name: String,
    inputs: Vec<InputChannel>,
    outputs: Vec<OutputChannel>,
}

impl NodeDescriptorBuilder {
    /// Add an input channel with explicit flags.
    ///
    /// # Panics
    ///
    /// Panics if an input channel of the same name was already declared.
    #[must_use]
    pub fn input<T: Into<ChannelTypeId>>(
        mut self,
        name: impl Into<String>,
        accepted: impl IntoIterator<Item = T>,
        flags: InputFlags,
    ) -> Self {
        let name = name.into();
        assert!(
            !self.inputs.iter().any(|c| c.name == name),
            "duplicate input channel {name:?} on descriptor {:?}",
            self.id
        );
        self.inputs.push(InputChannel {
            name,
            accepted: accepted.into_iter().map(Into::into).collect(),
            flags,
        });
        self
    }

    /// Add a required single-slot input channel.
    #[must_use]
    pub fn single_input<T: Into<ChannelTypeId>>(
        self,
        name: impl Into<String>,
        accepted: impl IntoIterator<Item = T>,
    ) -> Self {
        self.input(name, accepted, InputFlags::default())
    }

    /// Add a required input channel accepting multiple incoming links.
    #[must_use]
    pub fn multi_input<T: Into<ChannelTypeId>>(
        self,
        name: impl Into<String>,
        accepted: impl IntoIterator<Item = T>,
    ) -> Self {
        self.input(
            name,
            accepted,
            InputFlags {
                single: false,
                optional: false,
            },
        )
    }

    /// Add an optional single-slot input channel.
    #[must_use]
    pub fn optional_input<T: Into<ChannelTypeId>>(
        self,
        name: impl Into<String>,
        accepted: impl IntoIterator<Item = T>,
    ) -> Self {
        self.input(
            name,
            accepted,
            InputFlags {
                single: true,
                optional: true,
            },
        )
    }

    /// Add an output channel.
    ///
    /// # Panics
    ///
    /// Panics if an output channel of the same name was already declared.
    #[must_use]
    pub fn output(mut self, name: impl Into<String>, ty: impl Into<ChannelTypeId>) -> Self {
        let name = name.into();
        assert!(
            !self.outputs.iter().any(|c| c.name == name),
            "duplicate output channel {name:?} on descriptor {:?}",
            self.id
        );
        self.outputs.push(OutputChannel {
            name,
            ty: ty.into(),
        });
        self
    }

    #[must_use]
    pub fn build(self) -> NodeDescriptor {
        NodeDescriptor {
            id: self.id,
            name: self.name,
            inputs: self.inputs,
            outputs: self.outputs,
        }
    }

    /// Build and wrap in an [`Arc`], the form the rest of the crate consumes.
    #[must_use]
    pub fn build_arc(self) -> Arc<NodeDescriptor> {
        Arc::new(self.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_declaration_order() {
        let desc = NodeDescriptor::builder("t.multi", "Multi")
            .single_input("First", ["Data"])
            .multi_input("Second", ["Data"])
            .output("Out", "Data")
            .build();

        let names: Vec<_> = desc.inputs().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert!(desc.inputs()[0].flags.single);
        assert!(!desc.inputs()[1].flags.single);
    }

    #[test]
    fn channel_lookup_by_name() {
        let desc = NodeDescriptor::builder("t.one", "One")
            .single_input("Data", ["Data"])
            .output("Data", "Data")
            .build();

        assert!(desc.find_input("Data").is_some());
        assert!(desc.find_output("Data").is_some());
        assert!(desc.find_input("Nope").is_none());
    }

    #[test]
    #[should_panic(expected = "duplicate input channel")]
    fn duplicate_input_name_panics() {
        let _ = NodeDescriptor::builder("t.dup", "Dup")
            .single_input("Data", ["Data"])
            .single_input("Data", ["Table"]);
    }
}
