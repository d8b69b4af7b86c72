mod forces;
mod quadtree;

use std::f32::consts::PI;

use eframe::egui::{Pos2, Vec2, vec2};

use crate::network::NetworkNode;
use forces::{ChargeParams, Link, apply_center, apply_charge, apply_links};

pub(in crate::app) const LINK_DISTANCE: f32 = 30.0;
const BARNES_HUT_THETA: f32 = 0.9;
const DISTANCE_MIN: f32 = 1.0;
const VELOCITY_DECAY: f32 = 0.4;
const ALPHA_MIN: f32 = 0.001;
const REHEAT_ALPHA_TARGET: f32 = 0.3;
const DECAY_HORIZON_TICKS: f32 = 300.0;
const INITIAL_RADIUS: f32 = 10.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct SimulationParams {
    pub(in crate::app) center: Pos2,
    pub(in crate::app) link_distance: f32,
    pub(in crate::app) attraction_scale: f32,
    pub(in crate::app) charge_strength: f32,
    pub(in crate::app) theta: f32,
    pub(in crate::app) distance_min: f32,
    pub(in crate::app) velocity_decay: f32,
    pub(in crate::app) alpha_min: f32,
    pub(in crate::app) alpha_decay: f32,
    pub(in crate::app) max_ticks: u32,
}

impl SimulationParams {
    pub(in crate::app) fn new(
        center: Pos2,
        node_repulsion: f32,
        edge_attraction: f32,
        max_ticks: u32,
    ) -> Self {
        Self {
            center,
            link_distance: LINK_DISTANCE,
            attraction_scale: edge_attraction / 50.0,
            charge_strength: -node_repulsion / 2.0,
            theta: BARNES_HUT_THETA,
            distance_min: DISTANCE_MIN,
            velocity_decay: VELOCITY_DECAY,
            alpha_min: ALPHA_MIN,
            alpha_decay: 1.0 - ALPHA_MIN.powf(1.0 / DECAY_HORIZON_TICKS),
            max_ticks: max_ticks.max(1),
        }
    }

    fn charge(&self) -> ChargeParams {
        ChargeParams {
            strength: self.charge_strength,
            theta_sq: self.theta * self.theta,
            distance_min_sq: self.distance_min * self.distance_min,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum TickStatus {
    Running,
    Settled,
}

/// One layout run over a fixed node set.
///
/// Node positions, velocities and pins live on the nodes themselves; the
/// simulation only owns the cooling schedule and the precomputed springs.
pub(in crate::app) struct Simulation {
    params: SimulationParams,
    links: Vec<Link>,
    alpha: f32,
    alpha_target: f32,
    ticks: u32,
    /// Ticks spent cooling toward zero. Paused while a node is held.
    cooling_ticks: u32,
    positions: Vec<Pos2>,
    velocities: Vec<Vec2>,
}

impl Simulation {
    pub(in crate::app) fn new(
        params: SimulationParams,
        node_count: usize,
        links: &[(usize, usize)],
    ) -> Self {
        Self {
            params,
            links: Link::build(links, node_count, params.attraction_scale),
            alpha: 1.0,
            alpha_target: 0.0,
            ticks: 0,
            cooling_ticks: 0,
            positions: Vec::with_capacity(node_count),
            velocities: Vec::with_capacity(node_count),
        }
    }

    /// Starts from a cooled state, e.g. to reheat a layout that already settled.
    pub(in crate::app) fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn ticks(&self) -> u32 {
        self.ticks
    }

    pub(in crate::app) fn status(&self) -> TickStatus {
        if self.alpha < self.params.alpha_min || self.cooling_ticks >= self.params.max_ticks {
            TickStatus::Settled
        } else {
            TickStatus::Running
        }
    }

    /// Keeps the layout warm while a node is held. The tick budget starts
    /// over and stays paused until `release`.
    pub(in crate::app) fn reheat(&mut self) {
        self.alpha_target = REHEAT_ALPHA_TARGET;
        self.alpha = self.alpha.max(REHEAT_ALPHA_TARGET);
        self.cooling_ticks = 0;
    }

    fn is_held(&self) -> bool {
        self.alpha_target > 0.0
    }

    pub(in crate::app) fn release(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Places every node without a position on a phyllotaxis spiral around
    /// the center.
    pub(in crate::app) fn initialize_positions(&self, nodes: &mut [NetworkNode]) {
        let angle_step = PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in nodes.iter_mut().enumerate() {
            if let Some(pin) = node.pin {
                node.position = Some(pin);
            }
            if node.position.is_some_and(|position| position.is_finite()) {
                continue;
            }

            let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * angle_step;
            node.position = Some(self.params.center + vec2(angle.cos(), angle.sin()) * radius);
            node.velocity = Vec2::ZERO;
        }
    }

    pub(in crate::app) fn tick(&mut self, nodes: &mut [NetworkNode]) -> TickStatus {
        if nodes.is_empty() {
            self.alpha = 0.0;
            return TickStatus::Settled;
        }
        if self.status() == TickStatus::Settled {
            return TickStatus::Settled;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        self.ticks += 1;
        if !self.is_held() {
            self.cooling_ticks += 1;
        }

        let center = self.params.center;
        self.positions.clear();
        self.velocities.clear();
        for node in nodes.iter() {
            self.positions.push(node.position.unwrap_or(center));
            self.velocities.push(node.velocity);
        }

        apply_links(
            &self.links,
            self.params.link_distance,
            self.alpha,
            &self.positions,
            &mut self.velocities,
        );
        apply_charge(
            &self.positions,
            self.alpha,
            self.params.charge(),
            &mut self.velocities,
        );
        apply_center(&mut self.positions, center);

        let retain = 1.0 - self.params.velocity_decay;
        for ((node, position), velocity) in nodes
            .iter_mut()
            .zip(&self.positions)
            .zip(&self.velocities)
        {
            if let Some(pin) = node.pin {
                node.position = Some(pin);
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = *velocity * retain;
            let next = *position + velocity;
            if next.is_finite() {
                node.velocity = velocity;
                node.position = Some(next);
            } else {
                node.velocity = Vec2::ZERO;
                node.position = Some(center);
            }
        }

        self.status()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;

    const CENTER: Pos2 = pos2(600.0, 300.0);

    fn ring(node_count: usize) -> (Vec<NetworkNode>, Vec<(usize, usize)>) {
        let nodes = (0..node_count).map(NetworkNode::new).collect::<Vec<_>>();
        let links = (0..node_count)
            .map(|index| (index, (index + 1) % node_count))
            .collect::<Vec<_>>();
        (nodes, links)
    }

    fn simulation(node_count: usize, links: &[(usize, usize)], max_ticks: u32) -> Simulation {
        Simulation::new(
            SimulationParams::new(CENTER, 100.0, 50.0, max_ticks),
            node_count,
            links,
        )
    }

    #[test]
    fn decay_reaches_alpha_min_in_three_hundred_ticks() {
        let params = SimulationParams::new(CENTER, 100.0, 50.0, 300);
        let remaining = (1.0 - params.alpha_decay).powi(300);
        assert!((remaining - ALPHA_MIN).abs() < 1e-4);
        assert_eq!(params.charge_strength, -50.0);
        assert_eq!(params.attraction_scale, 1.0);
    }

    #[test]
    fn terminates_within_the_tick_budget() {
        for max_ticks in [1, 40, 300] {
            let (mut nodes, links) = ring(30);
            let mut simulation = simulation(nodes.len(), &links, max_ticks);
            simulation.initialize_positions(&mut nodes);

            let mut ticks = 0;
            while simulation.tick(&mut nodes) == TickStatus::Running {
                ticks += 1;
                assert!(ticks <= max_ticks);
            }
            assert!(simulation.ticks() <= max_ticks);
            assert_eq!(simulation.status(), TickStatus::Settled);
        }
    }

    #[test]
    fn spiral_placement_is_distinct_and_keeps_known_positions() {
        let (mut nodes, links) = ring(20);
        nodes[4].position = Some(pos2(1.0, 2.0));
        let simulation = simulation(nodes.len(), &links, 300);
        simulation.initialize_positions(&mut nodes);

        assert_eq!(nodes[4].position, Some(pos2(1.0, 2.0)));
        for (index, node) in nodes.iter().enumerate() {
            let position = node.position.expect("placed");
            for other in &nodes[index + 1..] {
                assert!((other.position.expect("placed") - position).length() > 1e-3);
            }
        }
    }

    #[test]
    fn pinned_node_never_leaves_its_pin() {
        let (mut nodes, links) = ring(25);
        let pin = pos2(50.0, 75.0);
        nodes[3].pin = Some(pin);
        let mut simulation = simulation(nodes.len(), &links, 300);
        simulation.initialize_positions(&mut nodes);

        for _ in 0..120 {
            simulation.tick(&mut nodes);
            assert_eq!(nodes[3].position, Some(pin));
            assert_eq!(nodes[3].velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn linked_pair_settles_near_link_distance() {
        let mut nodes = (0..2).map(NetworkNode::new).collect::<Vec<_>>();
        let mut simulation = Simulation::new(
            SimulationParams::new(CENTER, 0.0, 50.0, 300),
            2,
            &[(0, 1)],
        );
        simulation.initialize_positions(&mut nodes);
        while simulation.tick(&mut nodes) == TickStatus::Running {}

        let a = nodes[0].position.expect("placed");
        let b = nodes[1].position.expect("placed");
        assert!(((a - b).length() - LINK_DISTANCE).abs() < 3.0);
        assert!(((a + (b - a) * 0.5) - CENTER).length() < 1e-2);
    }

    #[test]
    fn reheat_keeps_alpha_up_until_release() {
        let (mut nodes, links) = ring(10);
        let mut simulation = simulation(nodes.len(), &links, 300);
        simulation.initialize_positions(&mut nodes);
        while simulation.tick(&mut nodes) == TickStatus::Running {}

        simulation.reheat();
        assert_eq!(simulation.status(), TickStatus::Running);
        for _ in 0..200 {
            simulation.tick(&mut nodes);
        }
        assert!(simulation.alpha() > 0.25);

        simulation.release();
        let mut ticks = 0;
        while simulation.tick(&mut nodes) == TickStatus::Running {
            ticks += 1;
        }
        assert!(ticks < 300);
        assert!(simulation.alpha() < 0.3);
    }

    #[test]
    fn held_layout_outlasts_the_tick_budget() {
        let (mut nodes, links) = ring(12);
        let mut simulation = simulation(nodes.len(), &links, 50);
        simulation.initialize_positions(&mut nodes);
        simulation.reheat();

        for _ in 0..200 {
            assert_eq!(simulation.tick(&mut nodes), TickStatus::Running);
        }
        assert_eq!(simulation.ticks(), 200);

        simulation.release();
        let mut ticks = 0;
        while simulation.tick(&mut nodes) == TickStatus::Running {
            ticks += 1;
        }
        assert!(ticks < 50);
        assert_eq!(simulation.status(), TickStatus::Settled);
    }

    #[test]
    fn empty_node_set_settles_immediately() {
        let mut simulation = simulation(0, &[], 300);
        assert_eq!(simulation.tick(&mut []), TickStatus::Settled);
    }
}
