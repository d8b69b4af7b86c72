use std::collections::HashMap;

use eframe::egui::Pos2;

use super::NetworkNode;

/// Last settled coordinates per node id.
///
/// Owned by one rendering surface and never cleared while it lives, so
/// regenerated graphs can reuse the layout of nodes that were already placed.
#[derive(Clone, Debug, Default)]
pub struct PositionStore {
    entries: HashMap<usize, Pos2>,
}

impl PositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: usize) -> Option<Pos2> {
        self.entries.get(&id).copied()
    }

    pub fn set(&mut self, id: usize, position: Pos2) {
        if position.x.is_finite() && position.y.is_finite() {
            self.entries.insert(id, position);
        }
    }

    pub fn has(&self, id: usize) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn covers(&self, nodes: &[NetworkNode]) -> bool {
        nodes.iter().all(|node| self.has(node.id))
    }

    pub fn record_settled(&mut self, nodes: &[NetworkNode]) -> usize {
        let mut written = 0;
        for node in nodes {
            if let Some(position) = node.position {
                self.set(node.id, position);
                written += 1;
            }
        }
        written
    }

    pub fn record_missing(&mut self, nodes: &[NetworkNode]) -> usize {
        let mut written = 0;
        for node in nodes {
            if self.has(node.id) {
                continue;
            }
            if let Some(position) = node.position {
                self.set(node.id, position);
                written += 1;
            }
        }
        written
    }
}
