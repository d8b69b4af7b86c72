use std::collections::BTreeSet;

use eframe::egui::{Pos2, Vec2};

pub const PORT_FLAG_COUNT: usize = 5;
pub const MAX_STAGE: u8 = 5;
pub const INFECTED_PER_STAGE: usize = 5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stage(u8);

impl Stage {
    pub fn new(value: u8) -> Self {
        Self(value.min(MAX_STAGE))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn previous(self) -> Self {
        Self(self.0.saturating_sub(1))
    }

    pub fn next(self) -> Self {
        Self::new(self.0.saturating_add(1))
    }

    pub fn infected_count(self, node_count: usize) -> usize {
        (self.0 as usize * INFECTED_PER_STAGE).min(node_count)
    }
}

#[derive(Clone, Debug)]
pub struct NetworkNode {
    pub id: usize,
    pub infected: bool,
    pub open_ports: [bool; PORT_FLAG_COUNT],
    pub position: Option<Pos2>,
    pub velocity: Vec2,
    pub pin: Option<Pos2>,
    pub adjacency: BTreeSet<usize>,
}

impl NetworkNode {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            infected: false,
            open_ports: [false; PORT_FLAG_COUNT],
            position: None,
            velocity: Vec2::ZERO,
            pin: None,
            adjacency: BTreeSet::new(),
        }
    }

    pub fn degree(&self) -> usize {
        self.adjacency.len()
    }

    pub fn open_port_count(&self) -> usize {
        self.open_ports.iter().filter(|open| **open).count()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetworkEdge {
    pub source: usize,
    pub target: usize,
    pub frequency: u32,
    pub scale: u32,
}

impl NetworkEdge {
    pub fn display_weight(&self) -> u32 {
        self.frequency.saturating_mul(self.scale)
    }
}

pub fn canonical_pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

#[derive(Clone, Debug, Default)]
pub struct NetworkGraph {
    pub stage: Stage,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
    pub isolated: BTreeSet<usize>,
}

impl NetworkGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn infected_count(&self) -> usize {
        self.nodes.iter().filter(|node| node.infected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Undirected pairs in canonical orientation, one per adjacency.
    pub fn links(&self) -> Vec<(usize, usize)> {
        self.edges
            .iter()
            .filter(|edge| edge.source < edge.target)
            .map(|edge| (edge.source, edge.target))
            .collect()
    }
}
