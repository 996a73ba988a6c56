//! Error taxonomy for workflow graph mutations.
//!
//! Every mutation error is synchronous and leaves the graph exactly as it was
//! before the failing call; none of them is fatal to the process hosting the
//! graph.

use miette::Diagnostic;
use thiserror::Error;

use crate::registry::ChannelDirection;
use crate::types::{AnnotationId, LinkId, NodeId};

/// Errors raised by [`WorkflowGraph`](crate::scheme::WorkflowGraph) mutations.
#[derive(Debug, Error, Diagnostic)]
pub enum SchemeError {
    /// A referenced channel name does not exist on the node's descriptor.
    #[error("no {direction} channel named {channel:?} on descriptor {descriptor:?}")]
    #[diagnostic(
        code(flowscheme::scheme::channel_not_found),
        help("Check the channel names declared by the node's descriptor.")
    )]
    ChannelNotFound {
        descriptor: String,
        channel: String,
        direction: ChannelDirection,
    },

    /// Structural violation: a link may not connect a node to itself,
    /// regardless of channel types.
    #[error("link would connect node {node} to itself")]
    #[diagnostic(code(flowscheme::scheme::topology))]
    SelfLoop { node: NodeId },

    /// The source channel's type is not acceptable to the sink channel.
    #[error(
        "source channel {source_channel:?} ({source_type}) is incompatible with \
         sink channel {sink_channel:?}"
    )]
    #[diagnostic(
        code(flowscheme::scheme::incompatible_channels),
        help("The source type must equal or be a registered subtype of an accepted sink type.")
    )]
    IncompatibleChannels {
        source_channel: String,
        source_type: String,
        sink_channel: String,
    },

    /// A single-input sink channel already has an enabled incoming link.
    #[error("sink channel {channel:?} on node {node} is single-input and already connected")]
    #[diagnostic(
        code(flowscheme::scheme::sink_occupied),
        help("Remove or disable the existing link first.")
    )]
    SinkChannelOccupied {
        node: NodeId,
        channel: String,
        existing: LinkId,
    },

    /// Operation referenced a node that is not in the graph.
    #[error("node {node} is not in the graph")]
    #[diagnostic(code(flowscheme::scheme::node_not_in_graph))]
    NodeNotInGraph { node: NodeId },

    /// Operation referenced a link that is not in the graph.
    #[error("link {link} is not in the graph")]
    #[diagnostic(code(flowscheme::scheme::link_not_in_graph))]
    LinkNotInGraph { link: LinkId },

    /// Operation referenced an annotation that is not in the graph.
    #[error("annotation {annotation} is not in the graph")]
    #[diagnostic(code(flowscheme::scheme::annotation_not_in_graph))]
    AnnotationNotInGraph { annotation: AnnotationId },

    /// A persisted scheme referenced a descriptor id that is not registered.
    #[error("unknown descriptor {id:?}")]
    #[diagnostic(
        code(flowscheme::scheme::unknown_descriptor),
        help("Register the descriptor before restoring the scheme.")
    )]
    UnknownDescriptor { id: String },
}
