//! Channel type registry and node descriptors.
//!
//! A [`NodeDescriptor`] is the immutable template for a node kind: the ordered
//! input and output channels it declares, each carrying a [`ChannelTypeId`].
//! The [`TypeRegistry`] owns the subtype relation between channel types and
//! answers the single question the graph asks on every link mutation: is a
//! source channel's declared type acceptable to a sink channel?
//!
//! Descriptors are registered once at startup in a [`DescriptorRegistry`]
//! keyed by descriptor id, which is also how persisted schemes resolve node
//! kinds back to concrete descriptors on load. Everything in this module is
//! read-only at graph-mutation time.
//!
//! # Examples
//!
//! ```
//! use flowscheme::registry::{NodeDescriptor, TypeRegistry};
//!
//! let mut types = TypeRegistry::new();
//! types.register_subtype("Table", "Data");
//!
//! let desc = NodeDescriptor::builder("core.discretize", "Discretize")
//!     .single_input("Data", ["Data"])
//!     .output("Data", "Table")
//!     .build();
//!
//! let input = desc.find_input("Data").unwrap();
//! assert!(types.compatible(&"Table".into(), &input.accepted));
//! ```

mod catalog;
mod descriptor;
mod type_registry;

pub use catalog::DescriptorRegistry;
pub use descriptor::{
    ChannelDirection, InputChannel, InputFlags, NodeDescriptor, NodeDescriptorBuilder,
    OutputChannel,
};
pub use type_registry::{ChannelTypeId, TypeRegistry};
