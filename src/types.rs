//! Shared types and constants for the grid router.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// 8 directions for octilinear routing, in grid steps
pub const DIRECTIONS: [(i64, i64); 8] = [
    (1, 0),   // East
    (1, -1),  // NE
    (0, -1),  // North
    (-1, -1), // NW
    (-1, 0),  // West
    (-1, 1),  // SW
    (0, 1),   // South
    (1, 1),   // SE
];

/// Ordered, immutable list of copper layer names.
///
/// A layer's index is its position in the stack. Names are unique, so a node
/// can be identified by its layer index and the name looked up when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayerStack {
    names: Vec<String>,
}

impl LayerStack {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::EmptyLayerStack);
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::DuplicateLayer(name.clone()));
            }
        }
        Ok(Self { names })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`; construction rejects empty stacks.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A position on a specific layer.
///
/// Equality and hashing use the layer index; the name comes from the
/// [`LayerStack`] of the job that produced the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize)]
pub struct RoutingNode {
    pub position: Point,
    pub layer: usize,
}

impl RoutingNode {
    #[inline]
    pub const fn new(position: Point, layer: usize) -> Self {
        Self { position, layer }
    }

    #[inline]
    pub fn at(x: i64, y: i64, layer: usize) -> Self {
        Self::new(Point::new(x, y), layer)
    }
}

impl fmt::Display for RoutingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@L{}", self.position, self.layer)
    }
}

/// A* open set entry with reverse ordering for min-heap
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub f_score: f64,
    pub g_score: f64,
    pub node: RoutingNode,
    pub counter: u32, // Tie-breaker for deterministic ordering
}

impl Eq for OpenEntry {}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (lowest f_score first, then oldest entry)
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| other.counter.cmp(&self.counter))
    }
}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BinaryHeap;

    #[test]
    fn layer_stack_rejects_duplicates_and_empty() {
        assert!(matches!(
            LayerStack::new(["F.Cu", "In1.Cu", "F.Cu"]),
            Err(Error::DuplicateLayer(name)) if name == "F.Cu"
        ));
        assert!(matches!(
            LayerStack::new(Vec::<String>::new()),
            Err(Error::EmptyLayerStack)
        ));
    }

    #[test]
    fn layer_stack_resolves_names_and_indices() {
        let stack = LayerStack::new(["F.Cu", "B.Cu"]).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.name(1), Some("B.Cu"));
        assert_eq!(stack.name(2), None);
        assert_eq!(stack.index_of("F.Cu"), Some(0));
        assert_eq!(stack.index_of("In1.Cu"), None);
        assert_eq!(stack.iter().collect::<Vec<_>>(), vec!["F.Cu", "B.Cu"]);
    }

    #[test]
    fn node_identity_includes_layer_index() {
        assert_eq!(RoutingNode::at(1, 2, 0), RoutingNode::at(1, 2, 0));
        assert_ne!(RoutingNode::at(1, 2, 0), RoutingNode::at(1, 2, 1));
    }

    #[test]
    fn open_set_pops_lowest_f_then_oldest() {
        let node = RoutingNode::at(0, 0, 0);
        let mut heap = BinaryHeap::new();
        heap.push(OpenEntry { f_score: 5.0, g_score: 0.0, node, counter: 0 });
        heap.push(OpenEntry { f_score: 3.0, g_score: 0.0, node, counter: 1 });
        heap.push(OpenEntry { f_score: 3.0, g_score: 0.0, node, counter: 2 });
        heap.push(OpenEntry { f_score: 7.5, g_score: 0.0, node, counter: 3 });

        let order: Vec<u32> = std::iter::from_fn(|| heap.pop().map(|e| e.counter)).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
    }
}
