//! Routing orchestration: net ordering, per-net search, obstacle commitment
//! and rip-up-and-reroute.
//!
//! Nets of one job are routed strictly one after another. Each committed net
//! becomes an obstacle for every net routed after it, so the order is part
//! of the result.

use rustc_hash::FxHashMap;
use serde::Serialize;
use std::cmp::Reverse;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RouterConfig;
use crate::cost::CostFunction;
use crate::drc::{NoopRuleEngine, RuleEngine, Violation};
use crate::error::{Error, Result};
use crate::geometry::{BoundingBox, Point};
use crate::graph::RoutingGraph;
use crate::net::Net;
use crate::path::RoutingPath;
use crate::router::{GridRouter, PathFinder};
use crate::types::{LayerStack, RoutingNode, DIRECTIONS};

/// Every pin-to-pin search starts and ends on the first layer of the stack.
const START_LAYER: usize = 0;

/// Board description for one routing job.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingJob {
    pub bounds: BoundingBox,
    pub grid_size: i64,
    pub layers: LayerStack,
}

impl RoutingJob {
    pub fn new(bounds: BoundingBox, grid_size: i64, layers: LayerStack) -> Result<Self> {
        if grid_size <= 0 {
            return Err(Error::InvalidGridSize(grid_size));
        }
        if !bounds.is_valid() {
            return Err(Error::InvalidBounds {
                min: bounds.min,
                max: bounds.max,
            });
        }
        Ok(Self {
            bounds,
            grid_size,
            layers,
        })
    }
}

/// Cooperative cancellation flag, checked between nets.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

/// Outcome of one routing job.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingResult {
    /// No net ended up failed
    pub success: bool,
    /// Routed nets, in the order they were accepted
    pub routed_nets: Vec<Net>,
    pub failed_nets: Vec<Net>,
    /// Nets never attempted because the job was cancelled
    pub pending_nets: Vec<Net>,
    pub violations: Vec<Violation>,
    pub elapsed: Duration,
    pub total_vias: usize,
    pub total_length: f64,
    pub cancelled: bool,
    /// Resolves the layer indices stored in paths and vias
    pub layers: LayerStack,
}

impl RoutingResult {
    pub fn routed(&self, name: &str) -> Option<&Net> {
        self.routed_nets.iter().find(|net| net.name == name)
    }

    pub fn failed(&self, name: &str) -> Option<&Net> {
        self.failed_nets.iter().find(|net| net.name == name)
    }
}

/// Routes whole boards with a [`PathFinder`] and reports to a [`RuleEngine`].
#[derive(Debug, Clone)]
pub struct RoutingEngine<F = GridRouter, R = NoopRuleEngine> {
    finder: F,
    rules: R,
    config: RouterConfig,
}

impl RoutingEngine {
    pub fn new(config: RouterConfig) -> Self {
        let finder = GridRouter::new(config.max_iterations);
        Self::with_parts(finder, NoopRuleEngine::default(), config)
    }
}

impl Default for RoutingEngine {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}

impl<F: PathFinder, R: RuleEngine> RoutingEngine<F, R> {
    pub fn with_parts(finder: F, mut rules: R, config: RouterConfig) -> Self {
        rules.load_rules(&config.rules);
        Self {
            finder,
            rules,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Route `nets` on the board described by `job`.
    ///
    /// Cancellation is observed before each net; a cancelled job returns the
    /// nets finished so far and lists the rest as pending.
    pub async fn route_board(
        &self,
        nets: Vec<Net>,
        job: &RoutingJob,
        cancel: &CancellationToken,
    ) -> RoutingResult {
        let mut session = RoutingSession::new(self, nets, job);
        while let Some(idx) = session.next_net() {
            if cancel.is_cancelled() {
                session.cancel();
                break;
            }
            session.route_in_order(idx);
            tokio::task::yield_now().await;
        }
        session.finish()
    }

    /// Same as [`Self::route_board`] without an async runtime.
    pub fn route_board_blocking(
        &self,
        nets: Vec<Net>,
        job: &RoutingJob,
        cancel: &CancellationToken,
    ) -> RoutingResult {
        let mut session = RoutingSession::new(self, nets, job);
        while let Some(idx) = session.next_net() {
            if cancel.is_cancelled() {
                session.cancel();
                break;
            }
            session.route_in_order(idx);
        }
        session.finish()
    }
}

/// Mutable state of one job. Owns the graph and the cost maps so that
/// nothing leaks between jobs.
struct RoutingSession<'a, F, R> {
    engine: &'a RoutingEngine<F, R>,
    graph: RoutingGraph,
    cost: CostFunction,
    /// Nets sorted by descending priority; indices below refer to this order
    nets: Vec<Net>,
    processed: Vec<bool>,
    cursor: usize,
    routed: Vec<usize>,
    failed: Vec<usize>,
    /// How often each node lost its net to a rip-up
    rip_ups: FxHashMap<RoutingNode, u32>,
    cancelled: bool,
    started: Instant,
}

impl<'a, F: PathFinder, R: RuleEngine> RoutingSession<'a, F, R> {
    fn new(engine: &'a RoutingEngine<F, R>, mut nets: Vec<Net>, job: &RoutingJob) -> Self {
        let started = Instant::now();
        // stable: equal priorities keep their input order
        nets.sort_by_key(|net| Reverse(net.priority));

        let count = nets.len();
        let mut session = Self {
            engine,
            graph: RoutingGraph::new(job.bounds, job.grid_size, job.layers.clone()),
            cost: CostFunction::new(engine.config.weights),
            nets,
            processed: vec![false; count],
            cursor: 0,
            routed: Vec::new(),
            failed: Vec::new(),
            rip_ups: FxHashMap::default(),
            cancelled: false,
            started,
        };

        let mut seeded = 0;
        for idx in 0..count {
            let net = &mut session.nets[idx];
            if net.routed && net.route.is_some() {
                session.commit(idx);
                seeded += 1;
            } else {
                net.clear_route();
            }
        }
        log::debug!("routing {count} nets, {seeded} pre-routed");
        session
    }

    fn next_net(&mut self) -> Option<usize> {
        while self.cursor < self.nets.len() {
            let idx = self.cursor;
            self.cursor += 1;
            if !self.processed[idx] {
                return Some(idx);
            }
        }
        None
    }

    fn cancel(&mut self) {
        self.cancelled = true;
        let pending = self.processed.iter().filter(|done| !**done).count();
        log::info!("routing cancelled with {pending} nets pending");
    }

    fn route_in_order(&mut self, idx: usize) {
        self.processed[idx] = true;

        // Only pre-routed nets can still be flagged routed here
        if self.nets[idx].routed {
            log::debug!("net {} keeps its existing route", self.nets[idx].name);
            self.routed.push(idx);
            return;
        }

        if self.route_net(idx) {
            self.commit(idx);
            self.routed.push(idx);
            return;
        }

        log::warn!("net {} could not be routed", self.nets[idx].name);
        self.failed.push(idx);
        if self.engine.config.rip_up {
            self.rip_up_and_reroute(idx);
        }
    }

    /// Chain searches between consecutive pins. On success the route is
    /// stored on the net, but not yet committed to the graph.
    fn route_net(&mut self, idx: usize) -> bool {
        let net = &self.nets[idx];
        if net.pins.len() < 2 {
            let net = &mut self.nets[idx];
            net.routed = true;
            net.route = None;
            return true;
        }

        let mut path = RoutingPath::new(net.name.clone());
        let rules = &self.engine.config.rules;
        path.track_width = rules.track_width;
        path.via_diameter = rules.via_diameter;
        path.via_drill = rules.via_drill;
        for pins in net.pins.windows(2) {
            let start = RoutingNode::new(pins[0], START_LAYER);
            let goal = RoutingNode::new(pins[1], START_LAYER);
            match self.engine.finder.find_path(&start, &goal, &self.graph, &self.cost) {
                Some(leg) => path.extend(leg),
                None => {
                    log::debug!("net {}: no path from {} to {}", net.name, start, goal);
                    return false;
                }
            }
        }

        let net = &mut self.nets[idx];
        net.route = Some(path);
        net.routed = true;
        true
    }

    /// Turn the net's route into obstacles owned by the net.
    fn commit(&mut self, idx: usize) {
        let net = &self.nets[idx];
        let Some(path) = net.route.as_ref() else {
            return;
        };
        for (segment, layer) in path.layered_segments() {
            self.graph.add_net_obstacle_line(&segment, layer, &net.name);
        }
        // vias and single-node routes have no segment of their own
        for node in &path.nodes {
            self.graph.add_net_obstacle(node.position, node.layer, &net.name);
        }
        crowd(&mut self.cost, &self.graph, path, 1);
    }

    /// Remove the net's geometry from the graph and remember where it was.
    fn rip_up(&mut self, idx: usize) -> Option<RoutingPath> {
        let net = &mut self.nets[idx];
        let route = net.clear_route();
        self.graph.clear_obstacles_for_net(&net.name);

        if let Some(path) = &route {
            crowd(&mut self.cost, &self.graph, path, -1);
            for node in &path.nodes {
                let count = self.rip_ups.entry(*node).or_insert(0);
                *count += 1;
                self.cost.update_history(*node, *count);
            }
        }
        route
    }

    /// One recovery attempt for a failed net: displace the lowest-priority
    /// routed net below it, retry, then reroute the displaced net.
    fn rip_up_and_reroute(&mut self, failed_idx: usize) -> bool {
        let priority = self.nets[failed_idx].priority;
        let candidate = self
            .nets
            .iter()
            .enumerate()
            .filter(|(_, net)| {
                net.routed
                    && net.priority < priority
                    && net.route.as_ref().is_some_and(|route| !route.is_empty())
            })
            .min_by_key(|(_, net)| net.priority)
            .map(|(idx, _)| idx);
        let Some(victim) = candidate else {
            log::debug!("no lower-priority net to rip up for {}", self.nets[failed_idx].name);
            return false;
        };

        log::warn!(
            "ripping up net {} to make room for {}",
            self.nets[victim].name,
            self.nets[failed_idx].name
        );
        let slot = self.routed.iter().position(|&i| i == victim);
        if let Some(pos) = slot {
            self.routed.remove(pos);
        }
        let previous = self.rip_up(victim);

        if !self.route_net(failed_idx) {
            // Nothing was committed since the rip-up, so the old route still fits
            let net = &mut self.nets[victim];
            net.route = previous;
            net.routed = true;
            self.commit(victim);
            if let Some(pos) = slot {
                self.routed.insert(pos, victim);
            }
            log::debug!(
                "rip-up did not help {}; restored {}",
                self.nets[failed_idx].name,
                self.nets[victim].name
            );
            return false;
        }

        self.commit(failed_idx);
        self.failed.retain(|&i| i != failed_idx);
        self.routed.push(failed_idx);

        self.processed[victim] = true;
        if self.route_net(victim) {
            self.commit(victim);
            self.routed.push(victim);
        } else {
            log::warn!("displaced net {} could not be rerouted", self.nets[victim].name);
            self.failed.push(victim);
        }
        true
    }

    fn finish(self) -> RoutingResult {
        let mut slots: Vec<Option<Net>> = self.nets.into_iter().map(Some).collect();
        let routed_nets: Vec<Net> = self.routed.iter().filter_map(|&i| slots[i].take()).collect();
        let failed_nets: Vec<Net> = self.failed.iter().filter_map(|&i| slots[i].take()).collect();
        let pending_nets: Vec<Net> = slots.into_iter().flatten().collect();

        let routes = || routed_nets.iter().filter_map(|net| net.route.as_ref());
        let total_vias: usize = routes().map(RoutingPath::via_count).sum();
        let total_length: f64 = routes().map(RoutingPath::length).sum();
        let violations = self.engine.rules.check(&routed_nets);
        let elapsed = self.started.elapsed();

        log::info!(
            "routed {} nets, {} failed, {} pending; {} vias, length {:.0} in {:.2?}",
            routed_nets.len(),
            failed_nets.len(),
            pending_nets.len(),
            total_vias,
            total_length,
            elapsed
        );

        RoutingResult {
            success: failed_nets.is_empty(),
            routed_nets,
            failed_nets,
            pending_nets,
            violations,
            elapsed,
            total_vias,
            total_length,
            cancelled: self.cancelled,
            layers: self.graph.layers().clone(),
        }
    }
}

/// Bump the congestion of every free grid position next to the path
fn crowd(cost: &mut CostFunction, graph: &RoutingGraph, path: &RoutingPath, delta: i32) {
    let step = graph.grid_size();
    for node in &path.nodes {
        for (dx, dy) in DIRECTIONS {
            let position = node.position + Point::new(dx * step, dy * step);
            if graph.bounds().contains(position) {
                cost.update_congestion(RoutingNode::new(position, node.layer), delta);
            }
        }
    }
}
