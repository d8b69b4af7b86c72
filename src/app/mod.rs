use std::fmt;

use eframe::egui::{Context, Pos2, Vec2, pos2, vec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{RelayoutPolicy, ViewConfig};
use crate::network::{GeneratorParams, NetworkGraph, PositionStore, Stage, generate};

mod graph;
mod inspector;
mod overview;
mod physics;
mod render_utils;
mod ui;
mod viewport;

use inspector::Inspector;
use overview::Overview;
use physics::{Simulation, SimulationParams, TickStatus};
use render_utils::node_radius;
use viewport::{DragTarget, TransformDelta, Viewport};

pub(in crate::app) const MAIN_CANVAS_SIZE: Vec2 = vec2(1200.0, 600.0);
const CANVAS_CENTER: Pos2 = pos2(600.0, 300.0);
const INSPECTOR_SEED_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(in crate::app) struct RunId(pub(in crate::app) u64);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Node positions after one solver tick. The canvas and the overview both
/// draw from the same frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub(in crate::app) struct TickFrame {
    pub(in crate::app) run: Option<RunId>,
    pub(in crate::app) tick: u32,
    pub(in crate::app) alpha: f32,
    pub(in crate::app) positions: Vec<Pos2>,
    pub(in crate::app) settled: bool,
}

struct LayoutRun {
    id: RunId,
    simulation: Simulation,
    /// Nodes pinned at their cached positions for this run only.
    held: Vec<usize>,
}

pub struct NetworkApp {
    model: ViewModel,
}

impl NetworkApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: ViewConfig, seed: u64) -> Self {
        Self {
            model: ViewModel::new(config, seed),
        }
    }
}

impl eframe::App for NetworkApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.model.show(ctx);
    }
}

impl Drop for NetworkApp {
    fn drop(&mut self) {
        self.model.unmount();
    }
}

/// One rendering surface: the current graph, its layout run and the view
/// state layered on top.
pub(in crate::app) struct ViewModel {
    config: ViewConfig,
    generator: GeneratorParams,
    seed: u64,
    inspector_rng: StdRng,
    stage: Stage,
    positions: PositionStore,
    graph: NetworkGraph,
    run: Option<LayoutRun>,
    next_run_id: u64,
    frame: TickFrame,
    overview: Overview,
    inspector: Inspector,
    viewport: Viewport,
    mounted: bool,
}

impl ViewModel {
    pub(in crate::app) fn new(config: ViewConfig, seed: u64) -> Self {
        let mut generator = GeneratorParams::new(config.node_count);
        generator.abnormal = config.abnormal_nodes.clone();

        let mut model = Self {
            stage: Stage::new(config.stage),
            config,
            generator,
            seed,
            inspector_rng: StdRng::seed_from_u64(seed ^ INSPECTOR_SEED_SALT),
            positions: PositionStore::new(),
            graph: NetworkGraph::default(),
            run: None,
            next_run_id: 0,
            frame: TickFrame::default(),
            overview: Overview::default(),
            inspector: Inspector::default(),
            viewport: Viewport::default(),
            mounted: true,
        };

        tracing::info!(
            nodes = model.config.node_count,
            stage = model.stage.value(),
            relayout = model.config.relayout.as_str(),
            seed,
            "mounting network view"
        );
        let graph = model.generate_graph();
        model.render(graph);
        model
    }

    fn generate_graph(&self) -> NetworkGraph {
        let mut rng = StdRng::seed_from_u64(self.seed);
        generate(&self.generator, self.stage, &self.positions, &mut rng)
    }

    fn simulation_params(&self) -> SimulationParams {
        SimulationParams::new(
            CANVAS_CENTER,
            self.config.node_repulsion,
            self.config.edge_attraction,
            self.config.max_ticks,
        )
    }

    pub(in crate::app) fn node_radii(&self) -> Vec<f32> {
        self.graph
            .nodes
            .iter()
            .map(|node| node_radius(node.degree(), self.config.node_radius))
            .collect()
    }

    /// Replaces the displayed graph and lays it out.
    pub(in crate::app) fn render(&mut self, graph: NetworkGraph) {
        self.cancel_run("graph replaced");
        self.inspector.clear();
        if let Some(DragTarget::Node(_)) = self.viewport.drag() {
            self.viewport.end_drag();
        }

        self.stage = graph.stage;
        self.graph = graph;
        let radii = self.node_radii();
        let infected = self.graph.nodes.iter().map(|node| node.infected).collect();
        self.overview.reset(radii, infected, self.graph.links());
        self.start_layout();
    }

    fn start_layout(&mut self) {
        if self.graph.is_empty() {
            tracing::info!(stage = self.stage.value(), "empty graph, nothing to lay out");
            self.publish_frame(None, 0, 0.0, true);
            return;
        }

        let cached = self
            .graph
            .nodes
            .iter()
            .filter(|node| self.positions.has(node.id))
            .count();
        let mut held = Vec::new();
        match self.config.relayout {
            RelayoutPolicy::Frozen => {
                if self.positions.covers(&self.graph.nodes) {
                    tracing::debug!(cached, "every node has a stored position, skipping layout");
                    self.publish_frame(None, 0, 0.0, true);
                    return;
                }
            }
            RelayoutPolicy::Incremental => {
                for node in &mut self.graph.nodes {
                    if node.infected {
                        continue;
                    }
                    if let Some(position) = self.positions.get(node.id) {
                        node.pin = Some(position);
                        held.push(node.id);
                    }
                }
            }
        }

        let simulation = Simulation::new(
            self.simulation_params(),
            self.graph.node_count(),
            &self.graph.links(),
        );
        simulation.initialize_positions(&mut self.graph.nodes);
        let id = self.begin_run(simulation, held);
        tracing::info!(
            run = %id,
            nodes = self.graph.node_count(),
            cached,
            fresh = self.positions.is_empty(),
            policy = self.config.relayout.as_str(),
            "layout run started"
        );
    }

    fn begin_run(&mut self, simulation: Simulation, held: Vec<usize>) -> RunId {
        let id = RunId(self.next_run_id);
        self.next_run_id += 1;
        let alpha = simulation.alpha();
        self.run = Some(LayoutRun {
            id,
            simulation,
            held,
        });
        self.publish_frame(Some(id), 0, alpha, false);
        id
    }

    fn release_held(&mut self, held: &[usize]) {
        let dragged = self.viewport.dragged_node();
        for &id in held {
            if Some(id) == dragged {
                continue;
            }
            if let Some(node) = self.graph.nodes.get_mut(id) {
                node.pin = None;
            }
        }
    }

    fn cancel_run(&mut self, reason: &'static str) {
        let Some(run) = self.run.take() else {
            return;
        };
        self.release_held(&run.held);
        tracing::info!(
            run = %run.id,
            ticks = run.simulation.ticks(),
            reason,
            "layout run cancelled"
        );
    }

    fn finish_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        self.release_held(&run.held);
        let written = self.positions.record_settled(&self.graph.nodes);
        self.publish_frame(
            Some(run.id),
            run.simulation.ticks(),
            run.simulation.alpha(),
            true,
        );
        tracing::info!(
            run = %run.id,
            ticks = run.simulation.ticks(),
            alpha = run.simulation.alpha(),
            written,
            "layout settled"
        );
    }

    fn publish_frame(&mut self, run: Option<RunId>, tick: u32, alpha: f32, settled: bool) {
        let frame = TickFrame {
            run,
            tick,
            alpha,
            positions: self
                .graph
                .nodes
                .iter()
                .map(|node| node.position.unwrap_or(CANVAS_CENTER))
                .collect(),
            settled,
        };
        self.overview.sync(&frame);
        self.frame = frame;
    }

    fn republish(&mut self) {
        let run = self.frame.run;
        let tick = self.frame.tick;
        let alpha = self.frame.alpha;
        let settled = self.run.is_none();
        self.publish_frame(run, tick, alpha, settled);
    }

    /// Runs one solver tick. Returns false when no run is active.
    pub(in crate::app) fn advance(&mut self) -> bool {
        let Some(run) = self.run.as_mut() else {
            return false;
        };

        let status = run.simulation.tick(&mut self.graph.nodes);
        let (id, tick, alpha) = (run.id, run.simulation.ticks(), run.simulation.alpha());
        match status {
            TickStatus::Running => self.publish_frame(Some(id), tick, alpha, false),
            TickStatus::Settled => self.finish_run(),
        }
        true
    }

    pub(in crate::app) fn on_stage_change(&mut self, stage: Stage) -> bool {
        if stage == self.stage {
            return false;
        }

        tracing::info!(from = self.stage.value(), to = stage.value(), "stage changed");
        self.stage = stage;
        let graph = self.generate_graph();
        self.render(graph);
        true
    }

    pub(in crate::app) fn previous_stage(&mut self) -> bool {
        self.on_stage_change(self.stage.previous())
    }

    pub(in crate::app) fn next_stage(&mut self) -> bool {
        self.on_stage_change(self.stage.next())
    }

    pub(in crate::app) fn on_node_hover(&mut self, id: usize, pointer: Pos2) {
        if id >= self.graph.node_count() {
            return;
        }
        if self.inspector.hover(id, pointer, &mut self.inspector_rng) {
            tracing::debug!(node = id, "inspecting node");
        }
    }

    pub(in crate::app) fn on_node_hover_end(&mut self) {
        self.inspector.clear();
    }

    pub(in crate::app) fn on_drag_start(&mut self, id: usize, pointer: Pos2) {
        let Some(node) = self.graph.nodes.get_mut(id) else {
            return;
        };
        let anchor = node.position.filter(|position| position.is_finite()).unwrap_or(pointer);
        node.pin = Some(anchor);
        node.position = Some(anchor);
        self.viewport.begin_drag(DragTarget::Node(id));

        match self.run.as_mut() {
            Some(run) => run.simulation.reheat(),
            None => self.begin_reheated_run(),
        }
        tracing::debug!(node = id, x = anchor.x, y = anchor.y, "drag started");
    }

    pub(in crate::app) fn on_drag_move(&mut self, id: usize, pointer: Pos2) {
        if self.viewport.dragged_node() != Some(id) || !pointer.is_finite() {
            return;
        }
        let Some(node) = self.graph.nodes.get_mut(id) else {
            return;
        };
        node.pin = Some(pointer);
        node.position = Some(pointer);
        self.republish();
    }

    pub(in crate::app) fn on_drag_end(&mut self, id: usize) {
        if self.viewport.dragged_node() != Some(id) {
            return;
        }
        self.viewport.end_drag();
        if let Some(node) = self.graph.nodes.get_mut(id) {
            node.pin = None;
        }
        if self.run.is_none() {
            self.begin_reheated_run();
        }
        if let Some(run) = self.run.as_mut() {
            run.simulation.release();
        }
        tracing::debug!(node = id, "drag ended");
    }

    /// Starts a run on the current layout at the reheat temperature.
    fn begin_reheated_run(&mut self) {
        let mut simulation = Simulation::new(
            self.simulation_params(),
            self.graph.node_count(),
            &self.graph.links(),
        )
        .with_alpha(0.0);
        simulation.reheat();
        let run = self.begin_run(simulation, Vec::new());
        tracing::debug!(run = %run, "layout reheated");
    }

    pub(in crate::app) fn on_zoom(&mut self, delta: TransformDelta) -> bool {
        self.viewport.apply(delta)
    }

    /// Stops the active run and keeps whatever positions were never stored.
    pub(in crate::app) fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.cancel_run("unmounted");
        let written = self.positions.record_missing(&self.graph.nodes);
        self.mounted = false;
        tracing::info!(written, stored = self.positions.len(), "network view unmounted");
    }
}
