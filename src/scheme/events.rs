//! Typed change notifications emitted by the workflow graph.
//!
//! Subscribers receive every mutation as a [`SchemeEvent`] over a dedicated
//! flume channel obtained from
//! [`WorkflowGraph::subscribe`](crate::scheme::WorkflowGraph::subscribe).
//! Events are sent synchronously, before the mutating call returns, in the
//! order the mutations happened; each subscriber drains its receiver at its
//! own pace. Because handlers run outside the graph's call stack, a
//! subscriber can never re-enter the graph while it is mid-mutation.

use std::sync::Arc;

use crate::registry::NodeDescriptor;
use crate::types::{AnnotationId, NodeId};

use super::link::SchemeLink;

/// A single change to the graph's public state.
///
/// Link events carry the full [`SchemeLink`] so that observers of a removal
/// never need a live lookup of an entity that is already gone.
#[derive(Clone, Debug)]
pub enum SchemeEvent {
    NodeAdded {
        node: NodeId,
        descriptor: Arc<NodeDescriptor>,
    },
    NodeRemoved {
        node: NodeId,
    },
    LinkAdded {
        link: SchemeLink,
    },
    LinkRemoved {
        link: SchemeLink,
    },
    LinkEnabledChanged {
        link: SchemeLink,
        enabled: bool,
    },
    TitleChanged {
        title: String,
    },
    DescriptionChanged {
        description: String,
    },
    AnnotationAdded {
        annotation: AnnotationId,
    },
    AnnotationRemoved {
        annotation: AnnotationId,
    },
}

/// Fan-out of [`SchemeEvent`]s to all live subscribers.
#[derive(Debug, Default)]
pub(crate) struct EventHub {
    senders: Vec<flume::Sender<SchemeEvent>>,
}

impl EventHub {
    pub(crate) fn subscribe(&mut self) -> flume::Receiver<SchemeEvent> {
        let (tx, rx) = flume::unbounded();
        self.senders.push(tx);
        rx
    }

    /// Send to every subscriber, pruning the ones that hung up.
    pub(crate) fn emit(&mut self, event: SchemeEvent) {
        tracing::trace!(?event, "scheme event");
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emit_reaches_all_subscribers() {
        let mut hub = EventHub::default();
        let rx1 = hub.subscribe();
        let rx2 = hub.subscribe();

        hub.emit(SchemeEvent::TitleChanged {
            title: "t".to_string(),
        });

        assert!(matches!(
            rx1.try_recv().unwrap(),
            SchemeEvent::TitleChanged { .. }
        ));
        assert!(matches!(
            rx2.try_recv().unwrap(),
            SchemeEvent::TitleChanged { .. }
        ));
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let mut hub = EventHub::default();
        let rx = hub.subscribe();
        drop(rx);
        hub.emit(SchemeEvent::TitleChanged {
            title: "t".to_string(),
        });
        assert!(hub.senders.is_empty());
    }
}
