//! Free-floating display annotations.
//!
//! Annotations carry no dataflow semantics; they exist so that a rendered
//! scheme can show notes and arrows, and they share the graph's add/remove
//! notification protocol and persistence.

use serde::{Deserialize, Serialize};

use crate::types::{AnnotationId, Position};

/// A text box or arrow placed on the canvas.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Annotation {
    Text {
        #[serde(default)]
        id: AnnotationId,
        /// `(x, y, width, height)` of the text box.
        rect: (f64, f64, f64, f64),
        text: String,
    },
    Arrow {
        #[serde(default)]
        id: AnnotationId,
        start: Position,
        end: Position,
        color: String,
    },
}

impl Annotation {
    #[must_use]
    pub fn text(rect: (f64, f64, f64, f64), text: impl Into<String>) -> Self {
        Self::Text {
            id: AnnotationId(0),
            rect,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn arrow(start: Position, end: Position, color: impl Into<String>) -> Self {
        Self::Arrow {
            id: AnnotationId(0),
            start,
            end,
            color: color.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> AnnotationId {
        match self {
            Self::Text { id, .. } | Self::Arrow { id, .. } => *id,
        }
    }

    pub(crate) fn set_id(&mut self, new_id: AnnotationId) {
        match self {
            Self::Text { id, .. } | Self::Arrow { id, .. } => *id = new_id,
        }
    }
}
