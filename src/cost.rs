//! Hop cost model used by the path search.
//!
//! The congestion and history maps belong to one routing job. The engine
//! creates a fresh [`CostFunction`] per job and hands it to every search by
//! reference.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::types::RoutingNode;

/// Weights of the individual cost terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostWeights {
    /// Multiplier on the Manhattan length of a hop
    pub length: f64,
    /// Flat cost of a layer change
    pub via: f64,
    /// Flat cost when the hop turns relative to the previous hop
    pub direction_change: f64,
    /// Multiplier on the squared congestion count of the target node
    pub congestion: f64,
    /// Multiplier on the rip-up history count of the target node
    pub history: f64,
    /// Multiplier on the hop length when moving against the layer's preferred axis
    pub preferred_direction: f64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            length: 1.0,
            via: 50.0,
            direction_change: 5.0,
            congestion: 10.0,
            history: 20.0,
            preferred_direction: 0.5,
        }
    }
}

impl CostWeights {
    /// All weights zero. Handy as a base for selecting individual terms.
    pub fn zero() -> Self {
        Self {
            length: 0.0,
            via: 0.0,
            direction_change: 0.0,
            congestion: 0.0,
            history: 0.0,
            preferred_direction: 0.0,
        }
    }
}

/// Coarse classification of a hop's travel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Horizontal,
    Vertical,
    Diagonal,
    None,
}

impl Direction {
    pub fn between(from: Point, to: Point) -> Self {
        if from == to {
            return Direction::None;
        }
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        if dx == 0 {
            Direction::Vertical
        } else if dy == 0 {
            Direction::Horizontal
        } else if dx == dy {
            Direction::Diagonal
        } else if dx > dy {
            Direction::Horizontal
        } else {
            Direction::Vertical
        }
    }
}

/// Stateful hop scorer for one routing job.
#[derive(Debug, Clone, Default)]
pub struct CostFunction {
    pub weights: CostWeights,
    congestion: FxHashMap<RoutingNode, i32>,
    history: FxHashMap<RoutingNode, u32>,
}

impl CostFunction {
    pub fn new(weights: CostWeights) -> Self {
        Self {
            weights,
            congestion: FxHashMap::default(),
            history: FxHashMap::default(),
        }
    }

    /// Cost of moving from `from` to `to`. `previous` is the node visited
    /// before `from`, if any. Never negative for non-negative weights.
    pub fn cost(
        &self,
        from: &RoutingNode,
        to: &RoutingNode,
        previous: Option<&RoutingNode>,
    ) -> f64 {
        let w = &self.weights;
        let distance = from.position.manhattan_distance(to.position) as f64;
        let mut cost = distance * w.length;

        if from.layer != to.layer {
            cost += w.via;
        }

        if let Some(prev) = previous {
            if prev.layer == from.layer && from.layer == to.layer {
                let before = Direction::between(prev.position, from.position);
                let after = Direction::between(from.position, to.position);
                if before != after {
                    cost += w.direction_change;
                }
            }
        }

        let congestion = self.congestion_at(to);
        if congestion != 0 {
            cost += f64::from(congestion).powi(2) * w.congestion;
        }

        let history = self.history_at(to);
        if history != 0 {
            cost += f64::from(history) * w.history;
        }

        // Even layers prefer horizontal runs, odd layers vertical ones.
        // Only a penalty, so the total never drops below the base cost.
        if from.layer == to.layer {
            let dx = (to.position.x - from.position.x).abs();
            let dy = (to.position.y - from.position.y).abs();
            let against_grain = if from.layer % 2 == 0 { dy > dx } else { dx > dy };
            if against_grain {
                cost += w.preferred_direction * distance;
            }
        }

        cost
    }

    /// Admissible estimate of the remaining cost from `node` to `goal`
    #[inline]
    pub fn heuristic(&self, node: &RoutingNode, goal: &RoutingNode) -> f64 {
        node.position.manhattan_distance(goal.position) as f64 * self.weights.length
    }

    /// Add `delta` to the congestion count of `node`
    pub fn update_congestion(&mut self, node: RoutingNode, delta: i32) {
        let count = self.congestion.entry(node).or_insert(0);
        *count += delta;
        if *count == 0 {
            self.congestion.remove(&node);
        }
    }

    /// Overwrite the rip-up history count of `node`
    pub fn update_history(&mut self, node: RoutingNode, count: u32) {
        if count == 0 {
            self.history.remove(&node);
        } else {
            self.history.insert(node, count);
        }
    }

    #[inline]
    pub fn congestion_at(&self, node: &RoutingNode) -> i32 {
        self.congestion.get(node).copied().unwrap_or(0)
    }

    #[inline]
    pub fn history_at(&self, node: &RoutingNode) -> u32 {
        self.history.get(node).copied().unwrap_or(0)
    }
}
