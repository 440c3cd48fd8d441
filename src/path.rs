//! Routed paths and the segment/via views derived from them.

use serde::Serialize;

use crate::geometry::{Point, Segment};
use crate::types::RoutingNode;

pub const DEFAULT_TRACK_WIDTH: i64 = 250_000;
pub const DEFAULT_VIA_DIAMETER: i64 = 600_000;
pub const DEFAULT_VIA_DRILL: i64 = 300_000;

/// A layer change at a fixed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Via {
    pub position: Point,
    pub from_layer: usize,
    pub to_layer: usize,
    pub diameter: i64,
    pub drill: i64,
}

/// Ordered node sequence produced for one net.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingPath {
    pub net_name: String,
    pub nodes: Vec<RoutingNode>,
    pub track_width: i64,
    pub via_diameter: i64,
    pub via_drill: i64,
    pub total_cost: f64,
}

impl RoutingPath {
    pub fn new(net_name: impl Into<String>) -> Self {
        Self {
            net_name: net_name.into(),
            nodes: Vec::new(),
            track_width: DEFAULT_TRACK_WIDTH,
            via_diameter: DEFAULT_VIA_DIAMETER,
            via_drill: DEFAULT_VIA_DRILL,
            total_cost: 0.0,
        }
    }

    pub fn from_nodes(nodes: Vec<RoutingNode>, total_cost: f64) -> Self {
        Self {
            nodes,
            total_cost,
            ..Self::new("")
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append `other`, dropping its first node when it repeats our last one
    pub fn extend(&mut self, other: RoutingPath) {
        let skip = match (self.nodes.last(), other.nodes.first()) {
            (Some(last), Some(first)) if last == first => 1,
            _ => 0,
        };
        self.nodes.extend(other.nodes.into_iter().skip(skip));
        self.total_cost += other.total_cost;
    }

    /// Same-layer hops together with the layer they run on
    pub fn layered_segments(&self) -> impl Iterator<Item = (Segment, usize)> + '_ {
        self.nodes.windows(2).filter_map(move |pair| {
            let (a, b) = (pair[0], pair[1]);
            (a.layer == b.layer)
                .then(|| (Segment::new(a.position, b.position, self.track_width), a.layer))
        })
    }

    /// Same-layer hops as track segments
    pub fn segments(&self) -> Vec<Segment> {
        self.layered_segments().map(|(segment, _)| segment).collect()
    }

    /// Layer-changing hops as vias sized by this path's via geometry
    pub fn vias(&self) -> Vec<Via> {
        self.nodes
            .windows(2)
            .filter(|pair| pair[0].layer != pair[1].layer)
            .map(|pair| Via {
                position: pair[0].position,
                from_layer: pair[0].layer,
                to_layer: pair[1].layer,
                diameter: self.via_diameter,
                drill: self.via_drill,
            })
            .collect()
    }

    pub fn via_count(&self) -> usize {
        self.nodes.windows(2).filter(|pair| pair[0].layer != pair[1].layer).count()
    }

    /// Total Euclidean length of the track segments
    pub fn length(&self) -> f64 {
        self.layered_segments().map(|(segment, _)| segment.length()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(nodes: &[(i64, i64, usize)]) -> RoutingPath {
        RoutingPath::from_nodes(
            nodes.iter().map(|&(x, y, l)| RoutingNode::at(x, y, l)).collect(),
            0.0,
        )
    }

    #[test]
    fn segments_and_vias_split_by_layer_change() {
        let p = path(&[(0, 0, 0), (100, 0, 0), (100, 0, 1), (100, 100, 1), (200, 200, 1)]);

        let segments = p.segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments[0],
            Segment::new(Point::new(0, 0), Point::new(100, 0), DEFAULT_TRACK_WIDTH)
        );
        let layers: Vec<usize> = p.layered_segments().map(|(_, l)| l).collect();
        assert_eq!(layers, vec![0, 1, 1]);

        let vias = p.vias();
        assert_eq!(vias.len(), 1);
        assert_eq!(vias[0].position, Point::new(100, 0));
        assert_eq!((vias[0].from_layer, vias[0].to_layer), (0, 1));
        assert_eq!((vias[0].diameter, vias[0].drill), (DEFAULT_VIA_DIAMETER, DEFAULT_VIA_DRILL));
        assert_eq!(p.via_count(), 1);
    }

    #[test]
    fn vias_carry_the_path_via_geometry() {
        let mut p = path(&[(0, 0, 0), (0, 0, 1), (0, 0, 2)]);
        p.via_diameter = 450_000;
        p.via_drill = 200_000;
        let vias = p.vias();
        assert_eq!(vias.len(), 2);
        assert!(vias.iter().all(|v| (v.diameter, v.drill) == (450_000, 200_000)));
        assert_eq!((vias[1].from_layer, vias[1].to_layer), (1, 2));
    }

    #[test]
    fn length_ignores_vias() {
        let p = path(&[(0, 0, 0), (300, 400, 0), (300, 400, 1), (300, 500, 1)]);
        assert_eq!(p.length(), 600.0);
    }

    #[test]
    fn extend_merges_the_shared_pin() {
        let mut p = path(&[(0, 0, 0), (100, 0, 0)]);
        p.total_cost = 1.0;
        let mut q = path(&[(100, 0, 0), (200, 0, 0)]);
        q.total_cost = 2.0;
        p.extend(q);
        assert_eq!(p.nodes.len(), 3);
        assert_eq!(p.total_cost, 3.0);

        p.extend(path(&[(500, 0, 0)]));
        assert_eq!(p.nodes.len(), 4);
    }

    #[test]
    fn single_node_path_has_no_geometry() {
        let p = path(&[(7, 7, 0)]);
        assert!(p.segments().is_empty());
        assert!(p.vias().is_empty());
        assert_eq!(p.length(), 0.0);
    }
}
