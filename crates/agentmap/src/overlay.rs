//! Manual position overrides.
//!
//! The [`PositionOverlay`] remembers where the user dropped nodes so those
//! positions survive recomputation. Entries are keyed by node id and applied
//! verbatim on top of whatever the active strategy computed.

use std::collections::HashSet;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use agentmap_core::{geometry::Point, identifier::Id};

use crate::layout::LayoutNode;

/// Node positions set by drag gestures, in recording order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionOverlay {
    entries: IndexMap<Id, Point>,
}

impl PositionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an overlay from entries the caller kept from an earlier session.
    pub fn from_entries(entries: impl IntoIterator<Item = (Id, Point)>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Records the final position of a drag gesture, replacing any earlier entry.
    pub fn record(&mut self, id: Id, position: Point) {
        self.entries.insert(id, position);
    }

    pub fn get(&self, id: Id) -> Option<Point> {
        self.entries.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Id, Point)> + '_ {
        self.entries.iter().map(|(id, point)| (*id, *point))
    }

    /// Replaces the position of every node that has an entry.
    ///
    /// Returns the number of nodes that were overridden.
    pub fn apply(&self, nodes: &mut [LayoutNode]) -> usize {
        let mut applied = 0;
        for node in nodes {
            if let Some(position) = self.get(node.id()) {
                node.set_position(position);
                applied += 1;
            }
        }
        applied
    }

    /// Drops entries for nodes that are no longer part of the diagram.
    ///
    /// Returns the number of dropped entries.
    pub fn invalidate(&mut self, current: &HashSet<Id>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| current.contains(id));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(dropped = dropped; "Dropped overlay entries for removed nodes");
        }
        dropped
    }

    /// Drops every entry whose id starts with `prefix`.
    ///
    /// Returns the number of dropped entries.
    pub fn clear_prefix(&mut self, prefix: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|id, _| !id.starts_with(prefix));
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(prefix = prefix, dropped = dropped; "Cleared overlay entries");
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
