use std::collections::{BTreeSet, HashMap};
use std::ops::{Range, RangeInclusive};

use rand::Rng;
use rand::seq::index;

use super::graph::{NetworkEdge, NetworkGraph, NetworkNode, Stage, canonical_pair};
use super::positions::PositionStore;

const HUB_DEGREE: Range<usize> = 10..30;
const BASELINE_DEGREE: RangeInclusive<usize> = 1..=3;
const INFECTION_ATTEMPTS: RangeInclusive<usize> = 3..=7;
const OPEN_PORT_PROBABILITY: f64 = 0.5;
const ABNORMAL_SCALE: u32 = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct GeneratorParams {
    pub node_count: usize,
    pub hub_fraction: f64,
    pub isolated_fraction: f64,
    pub abnormal: BTreeSet<usize>,
}

impl GeneratorParams {
    pub fn new(node_count: usize) -> Self {
        Self {
            node_count,
            hub_fraction: 0.02,
            isolated_fraction: 0.1,
            abnormal: BTreeSet::new(),
        }
    }

    fn share(&self, fraction: f64) -> usize {
        let fraction = if fraction.is_finite() { fraction.clamp(0.0, 1.0) } else { 0.0 };
        (self.node_count as f64 * fraction).floor() as usize
    }

    pub fn hub_count(&self) -> usize {
        self.share(self.hub_fraction)
    }

    pub fn isolated_count(&self) -> usize {
        self.share(self.isolated_fraction).min(self.node_count)
    }
}

struct Wiring {
    nodes: Vec<NetworkNode>,
    frequencies: HashMap<(usize, usize), u32>,
}

impl Wiring {
    fn connect(&mut self, a: usize, b: usize) {
        self.nodes[a].adjacency.insert(b);
        self.nodes[b].adjacency.insert(a);
        *self.frequencies.entry(canonical_pair(a, b)).or_insert(0) += 1;
    }

    fn degree(&self, id: usize) -> usize {
        self.nodes[id].degree()
    }
}

/// Builds the mock topology for `stage`.
///
/// Nodes already present in `positions` start at their stored coordinates.
/// The same rng seed reproduces the same graph, and two stages generated from
/// the same seed share every edge of the lower stage.
pub fn generate<R: Rng + ?Sized>(
    params: &GeneratorParams,
    stage: Stage,
    positions: &PositionStore,
    rng: &mut R,
) -> NetworkGraph {
    let node_count = params.node_count;
    if node_count == 0 {
        return NetworkGraph {
            stage,
            ..NetworkGraph::default()
        };
    }

    let nodes = (0..node_count)
        .map(|id| {
            let mut node = NetworkNode::new(id);
            for flag in &mut node.open_ports {
                *flag = rng.gen_bool(OPEN_PORT_PROBABILITY);
            }
            node.position = positions.get(id);
            node
        })
        .collect::<Vec<_>>();

    let mut wiring = Wiring {
        nodes,
        frequencies: HashMap::new(),
    };

    for _ in 0..params.hub_count() {
        let hub = rng.gen_range(0..node_count);
        let wanted = rng.gen_range(HUB_DEGREE).min(node_count - 1);
        while wiring.degree(hub) < wanted {
            let target = rng.gen_range(0..node_count);
            if target != hub {
                wiring.connect(hub, target);
            }
        }
    }

    let isolated = index::sample(rng, node_count, params.isolated_count())
        .into_iter()
        .collect::<BTreeSet<_>>();
    let pool = (0..node_count)
        .filter(|id| !isolated.contains(id))
        .collect::<Vec<_>>();

    for &id in &pool {
        let wanted = rng.gen_range(BASELINE_DEGREE);
        let reachable = pool
            .iter()
            .filter(|&&target| target != id && !wiring.nodes[id].adjacency.contains(&target))
            .count();
        let wanted = wanted.min(wiring.degree(id) + reachable);

        while wiring.degree(id) < wanted {
            let target = pool[rng.gen_range(0..pool.len())];
            if target != id {
                wiring.connect(id, target);
            }
        }
    }

    let infected_count = stage.infected_count(node_count);
    for id in 0..infected_count {
        wiring.nodes[id].infected = true;
        let attempts = rng.gen_range(INFECTION_ATTEMPTS);
        for _ in 0..attempts {
            let target = rng.gen_range(0..node_count);
            if target != id && !isolated.contains(&target) {
                wiring.connect(id, target);
            }
        }
    }

    let Wiring { nodes, frequencies } = wiring;
    let edges = nodes
        .iter()
        .flat_map(|node| {
            let source = node.id;
            let frequencies = &frequencies;
            node.adjacency.iter().map(move |&target| {
                let abnormal =
                    params.abnormal.contains(&source) || params.abnormal.contains(&target);
                let scale = if abnormal { ABNORMAL_SCALE } else { 1 };
                NetworkEdge {
                    source,
                    target,
                    frequency: frequencies
                        .get(&canonical_pair(source, target))
                        .copied()
                        .unwrap_or(1),
                    scale,
                }
            })
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        stage = stage.value(),
        nodes = node_count,
        edges = edges.len(),
        isolated = isolated.len(),
        infected = infected_count,
        seeded = nodes.iter().filter(|node| node.position.is_some()).count(),
        "generated network"
    );

    NetworkGraph {
        stage,
        nodes,
        edges,
        isolated,
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::super::graph::MAX_STAGE;
    use super::*;

    fn build(node_count: usize, stage: u8, seed: u64) -> NetworkGraph {
        let mut rng = StdRng::seed_from_u64(seed);
        generate(
            &GeneratorParams::new(node_count),
            Stage::new(stage),
            &PositionStore::new(),
            &mut rng,
        )
    }

    #[test]
    fn node_ids_are_dense_and_ordered() {
        for node_count in [1, 2, 10, 137, 500] {
            let graph = build(node_count, 2, 7);
            assert_eq!(graph.node_count(), node_count);
            for (index, node) in graph.nodes.iter().enumerate() {
                assert_eq!(node.id, index);
            }
        }
    }

    #[test]
    fn zero_nodes_yield_an_empty_graph() {
        let graph = build(0, 3, 1);
        assert!(graph.is_empty());
        assert!(graph.edges.is_empty());
    }

    #[test]
    fn no_self_loops() {
        for seed in 0..8 {
            let graph = build(120, 5, seed);
            assert!(graph.edges.iter().all(|edge| edge.source != edge.target));
        }
    }

    #[test]
    fn every_half_edge_has_its_reciprocal() {
        let graph = build(80, 3, 11);
        for edge in &graph.edges {
            assert!(graph.nodes[edge.target].adjacency.contains(&edge.source));
            assert!(graph.edges.iter().any(|other| {
                other.source == edge.target
                    && other.target == edge.source
                    && other.frequency == edge.frequency
            }));
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_graph() {
        let first = build(200, 4, 99);
        let second = build(200, 4, 99);
        assert_eq!(first.edges, second.edges);
        assert_eq!(first.isolated, second.isolated);
    }

    #[test]
    fn stage_zero_scenario() {
        let graph = build(10, 0, 3);

        assert_eq!(graph.infected_count(), 0);
        assert_eq!(graph.isolated.len(), 1);
        for node in &graph.nodes {
            if graph.isolated.contains(&node.id) {
                assert_eq!(node.degree(), 0);
            } else {
                assert!(node.degree() >= 1);
                assert!(node.adjacency.iter().all(|target| !graph.isolated.contains(target)));
            }
        }
    }

    #[test]
    fn stage_one_infects_first_five_and_only_adds_edges() {
        let before = build(10, 0, 3);
        let after = build(10, 1, 3);

        let infected = after
            .nodes
            .iter()
            .filter(|node| node.infected)
            .map(|node| node.id)
            .collect::<Vec<_>>();
        assert_eq!(infected, vec![0, 1, 2, 3, 4]);
        assert_eq!(before.isolated, after.isolated);

        for (old, new) in before.nodes.iter().zip(&after.nodes) {
            assert!(old.adjacency.is_subset(&new.adjacency));
        }
    }

    #[test]
    fn infected_count_is_monotonic_in_stage() {
        let mut previous = 0;
        for stage in 0..=MAX_STAGE {
            let count = build(23, stage, 5).infected_count();
            assert!(count >= previous);
            assert_eq!(count, Stage::new(stage).infected_count(23));
            previous = count;
        }
    }

    #[test]
    fn stored_positions_seed_nodes_across_stages() {
        let mut store = PositionStore::new();
        store.set(0, pos2(10.0, 20.0));
        store.set(7, pos2(-3.0, 4.5));

        let mut rng = StdRng::seed_from_u64(17);
        let params = GeneratorParams::new(12);
        for stage in [0, 3, 5] {
            let graph = generate(&params, Stage::new(stage), &store, &mut rng);
            assert_eq!(graph.nodes[0].position, Some(pos2(10.0, 20.0)));
            assert_eq!(graph.nodes[7].position, Some(pos2(-3.0, 4.5)));
            assert_eq!(graph.nodes[1].position, None);
        }
    }

    #[test]
    fn hub_and_isolated_counts_floor_the_fractions() {
        for (node_count, hubs, isolated) in [
            (0, 0, 0),
            (10, 0, 1),
            (49, 0, 4),
            (50, 1, 5),
            (100, 2, 10),
            (137, 2, 13),
            (500, 10, 50),
            (1000, 20, 100),
        ] {
            let params = GeneratorParams::new(node_count);
            assert_eq!(params.hub_count(), hubs, "hubs for {node_count} nodes");
            assert_eq!(params.isolated_count(), isolated, "isolated for {node_count} nodes");
        }
    }

    #[test]
    fn generated_isolated_set_matches_the_count() {
        for node_count in [10, 50, 137, 500] {
            let graph = build(node_count, 0, 13);
            let expected = GeneratorParams::new(node_count).isolated_count();
            assert_eq!(graph.isolated.len(), expected);
        }
    }

    #[test]
    fn hubs_reach_high_degree() {
        let mut params = GeneratorParams::new(300);
        params.hub_fraction = 0.02;
        let mut rng = StdRng::seed_from_u64(21);
        let graph = generate(&params, Stage::new(0), &PositionStore::new(), &mut rng);

        let max_degree = graph.nodes.iter().map(NetworkNode::degree).max().unwrap_or(0);
        assert!(max_degree >= 10);
    }

    #[test]
    fn abnormal_endpoints_double_the_scale() {
        let mut params = GeneratorParams::new(40);
        params.abnormal.insert(0);
        let mut rng = StdRng::seed_from_u64(8);
        let graph = generate(&params, Stage::new(1), &PositionStore::new(), &mut rng);

        for edge in &graph.edges {
            let expected = if edge.source == 0 || edge.target == 0 { 2 } else { 1 };
            assert_eq!(edge.scale, expected);
            assert!(edge.frequency >= 1);
        }
    }

    #[test]
    fn tiny_graphs_terminate() {
        let mut params = GeneratorParams::new(2);
        params.hub_fraction = 1.0;
        params.isolated_fraction = 0.0;
        let mut rng = StdRng::seed_from_u64(2);
        let graph = generate(&params, Stage::new(5), &PositionStore::new(), &mut rng);

        assert_eq!(graph.nodes[0].adjacency.len(), 1);
        assert_eq!(graph.nodes[1].adjacency.len(), 1);
    }
}
