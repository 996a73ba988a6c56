//! Core identifier and value types for the flowscheme workflow model.
//!
//! This module defines the fundamental types used throughout the crate for
//! identifying entities in a workflow scheme. These are the core domain
//! concepts that define what a scheme *is made of*.
//!
//! # Key Types
//!
//! - [`NodeId`] / [`LinkId`] / [`AnnotationId`]: graph-scoped entity ids
//! - [`Position`]: canvas placement recorded for persistence
//! - [`ProcessingState`]: whether a node's computation is currently running
//!
//! # Examples
//!
//! ```rust
//! use flowscheme::types::{Position, ProcessingState};
//!
//! let pos = Position::new(120.0, 48.5);
//! assert_eq!(pos.x, 120.0);
//! assert_eq!(ProcessingState::default(), ProcessingState::Idle);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a node instance within a single workflow graph.
///
/// Ids are allocated monotonically by the owning graph and are never reused
/// for the lifetime of that graph, so observers can safely hold them as
/// back-references after the node itself is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// Identifies a link within a single workflow graph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub u64);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "l{}", self.0)
    }
}

/// Identifies a free-floating annotation within a single workflow graph.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct AnnotationId(pub u64);

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

/// Canvas coordinates for a node or annotation endpoint.
///
/// The core never interprets positions; they are carried for the benefit of
/// persistence and whatever renders the scheme.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Whether a node's computation is currently in flight.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessingState {
    #[default]
    Idle,
    Running,
}
