//! Grid-based A* router implementation.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BinaryHeap;

use crate::cost::CostFunction;
use crate::graph::RoutingGraph;
use crate::path::RoutingPath;
use crate::types::{OpenEntry, RoutingNode};

/// Point-to-point search strategy used by the engine.
pub trait PathFinder {
    /// Lowest-cost node sequence from `start` to `goal`, both inclusive, or
    /// `None` if the goal cannot be reached.
    fn find_path(
        &self,
        start: &RoutingNode,
        goal: &RoutingNode,
        graph: &RoutingGraph,
        cost: &CostFunction,
    ) -> Option<RoutingPath>;
}

/// Counters collected during one search
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SearchStats {
    pub iterations: u32,
    pub cells_pushed: u32,
    pub cells_expanded: u32,
    pub duplicate_skips: u32,
    pub path_length: u32,
    pub path_cost: f64,
}

/// Grid A* Router
#[derive(Debug, Clone, Default)]
pub struct GridRouter {
    /// Pops allowed before giving up (None = unbounded)
    max_iterations: Option<u32>,
}

impl GridRouter {
    pub fn new(max_iterations: Option<u32>) -> Self {
        Self { max_iterations }
    }

    /// Route from `start` to `goal`.
    /// Returns (path, stats) where path is None if the frontier ran dry or the
    /// iteration budget was spent before the goal was popped.
    pub fn route(
        &self,
        start: &RoutingNode,
        goal: &RoutingNode,
        graph: &RoutingGraph,
        cost: &CostFunction,
    ) -> (Option<RoutingPath>, SearchStats) {
        let mut stats = SearchStats::default();

        let mut open_set = BinaryHeap::new();
        let mut g_costs: FxHashMap<RoutingNode, f64> = FxHashMap::default();
        let mut parents: FxHashMap<RoutingNode, RoutingNode> = FxHashMap::default();
        let mut closed: FxHashSet<RoutingNode> = FxHashSet::default();
        let mut counter: u32 = 0;

        g_costs.insert(*start, 0.0);
        open_set.push(OpenEntry {
            f_score: cost.heuristic(start, goal),
            g_score: 0.0,
            node: *start,
            counter,
        });
        counter += 1;
        stats.cells_pushed += 1;

        while let Some(current_entry) = open_set.pop() {
            if self.max_iterations.is_some_and(|limit| stats.iterations >= limit) {
                log::debug!("search {start} -> {goal} hit the iteration limit");
                break;
            }
            stats.iterations += 1;

            let current = current_entry.node;
            let g = current_entry.g_score;

            if !closed.insert(current) {
                stats.duplicate_skips += 1;
                continue;
            }
            stats.cells_expanded += 1;

            // Check if reached target
            if current == *goal {
                let nodes = reconstruct_path(&parents, current);
                stats.path_length = nodes.len() as u32;
                stats.path_cost = g;
                return (Some(RoutingPath::from_nodes(nodes, g)), stats);
            }

            // Parent feeds the turn penalty
            let previous = parents.get(&current).copied();

            for neighbor in graph.neighbors(&current) {
                if closed.contains(&neighbor) {
                    continue;
                }

                let new_g = g + cost.cost(&current, &neighbor, previous.as_ref());
                let existing_g = g_costs.get(&neighbor).copied().unwrap_or(f64::INFINITY);
                if new_g < existing_g {
                    g_costs.insert(neighbor, new_g);
                    parents.insert(neighbor, current);
                    open_set.push(OpenEntry {
                        f_score: new_g + cost.heuristic(&neighbor, goal),
                        g_score: new_g,
                        node: neighbor,
                        counter,
                    });
                    counter += 1;
                    stats.cells_pushed += 1;
                }
            }
        }

        (None, stats)
    }
}

impl PathFinder for GridRouter {
    fn find_path(
        &self,
        start: &RoutingNode,
        goal: &RoutingNode,
        graph: &RoutingGraph,
        cost: &CostFunction,
    ) -> Option<RoutingPath> {
        let (path, stats) = self.route(start, goal, graph, cost);
        log::debug!(
            "search {start} -> {goal}: {} after {} iterations ({} expanded, {} pushed)",
            if path.is_some() { "found" } else { "no path" },
            stats.iterations,
            stats.cells_expanded,
            stats.cells_pushed,
        );
        path
    }
}

/// Reconstruct path from parents map
fn reconstruct_path(
    parents: &FxHashMap<RoutingNode, RoutingNode>,
    goal: RoutingNode,
) -> Vec<RoutingNode> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&parent) = parents.get(&current) {
        path.push(parent);
        current = parent;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{BoundingBox, Point, Segment};
    use crate::types::LayerStack;

    const PITCH: i64 = 100_000;

    fn board(layers: &[&str]) -> RoutingGraph {
        RoutingGraph::new(
            BoundingBox::new(Point::new(0, 0), Point::new(10_000_000, 10_000_000)),
            PITCH,
            LayerStack::new(layers.iter().copied()).unwrap(),
        )
    }

    #[test]
    fn finds_straight_path_on_empty_board() {
        let graph = board(&["F.Cu"]);
        let start = RoutingNode::at(0, 0, 0);
        let goal = RoutingNode::at(1_000_000, 0, 0);

        let path = GridRouter::default()
            .find_path(&start, &goal, &graph, &CostFunction::default())
            .expect("path on empty board");

        assert_eq!(path.nodes.first(), Some(&start));
        assert_eq!(path.nodes.last(), Some(&goal));
        assert_eq!(path.nodes.len(), 11);
        assert!(path.nodes.iter().all(|n| n.position.y == 0));
        assert_eq!(path.total_cost, 1_000_000.0);
    }

    #[test]
    fn detours_around_a_blocked_row() {
        let mut graph = board(&["F.Cu"]);
        graph.add_obstacle_line(
            &Segment::new(Point::new(500_000, -1_000_000), Point::new(500_000, 1_000_000), 0),
            0,
        );
        let start = RoutingNode::at(0, 0, 0);
        let goal = RoutingNode::at(1_000_000, 0, 0);

        let path = GridRouter::default()
            .find_path(&start, &goal, &graph, &CostFunction::default())
            .expect("detour exists");

        assert!(path.nodes.iter().any(|n| n.position.y != 0));
        assert!(path.nodes.iter().all(|n| !graph.is_obstacle(n)));
        assert_eq!(path.nodes.last(), Some(&goal));
    }

    #[test]
    fn full_height_wall_on_single_layer_has_no_path() {
        let mut graph = board(&["F.Cu"]);
        graph.add_obstacle_line(
            &Segment::new(Point::new(500_000, 0), Point::new(500_000, 10_000_000), 0),
            0,
        );
        let start = RoutingNode::at(0, 0, 0);
        let goal = RoutingNode::at(1_000_000, 0, 0);

        let cost = CostFunction::default();
        let (path, stats) = GridRouter::default().route(&start, &goal, &graph, &cost);
        assert!(path.is_none());
        // everything left of the wall was explored
        assert_eq!(stats.cells_expanded, 5 * 101);
    }

    #[test]
    fn second_layer_tunnels_under_a_wall() {
        let mut graph = board(&["F.Cu", "B.Cu"]);
        graph.add_obstacle_line(
            &Segment::new(Point::new(500_000, 0), Point::new(500_000, 10_000_000), 0),
            0,
        );
        let start = RoutingNode::at(0, 0, 0);
        let goal = RoutingNode::at(1_000_000, 0, 0);

        let path = GridRouter::default()
            .find_path(&start, &goal, &graph, &CostFunction::default())
            .expect("path through B.Cu");

        assert_eq!(path.via_count(), 2);
        assert!(path.nodes.iter().any(|n| n.position.x == 500_000 && n.layer == 1));
        assert_eq!(path.nodes.last(), Some(&goal));
    }

    #[test]
    fn start_equal_to_goal_is_a_single_node() {
        let graph = board(&["F.Cu"]);
        let node = RoutingNode::at(300_000, 300_000, 0);
        let path = GridRouter::default()
            .find_path(&node, &node, &graph, &CostFunction::default())
            .expect("trivial path");
        assert_eq!(path.nodes, vec![node]);
        assert_eq!(path.total_cost, 0.0);
    }

    #[test]
    fn iteration_budget_stops_the_search() {
        let graph = board(&["F.Cu"]);
        let start = RoutingNode::at(0, 0, 0);
        let goal = RoutingNode::at(5_000_000, 5_000_000, 0);

        let cost = CostFunction::default();
        let (path, stats) = GridRouter::new(Some(3)).route(&start, &goal, &graph, &cost);
        assert!(path.is_none());
        assert_eq!(stats.iterations, 3);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let mut graph = board(&["F.Cu", "B.Cu"]);
        graph.add_obstacle_line(
            &Segment::new(Point::new(300_000, 0), Point::new(300_000, 800_000), 0),
            0,
        );
        let start = RoutingNode::at(0, 400_000, 0);
        let goal = RoutingNode::at(900_000, 500_000, 0);
        let cost = CostFunction::default();
        let router = GridRouter::default();

        let first = router.find_path(&start, &goal, &graph, &cost);
        for _ in 0..5 {
            assert_eq!(router.find_path(&start, &goal, &graph, &cost), first);
        }
    }
}
