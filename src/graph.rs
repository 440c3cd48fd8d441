//! Grid-based routing graph for PCB routing.
//!
//! The graph is never materialized: neighbors are generated on demand from
//! the bounds, the grid pitch and the obstacle state.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::geometry::{snap_to_grid, BoundingBox, Point, Segment};
use crate::types::{LayerStack, RoutingNode, DIRECTIONS};

/// Snapped cell position plus layer index
type CellKey = (Point, usize);

/// Owner id for fixed board obstacles; never released.
const BOARD_OWNER: u32 = 0;

/// Bounded routing grid over a layer stack.
#[derive(Debug, Clone)]
pub struct RoutingGraph {
    bounds: BoundingBox,
    grid_size: i64,
    layers: LayerStack,
    /// Blocked cells: (snapped position, layer) -> owners that placed an obstacle there
    obstacles: FxHashMap<CellKey, FxHashSet<u32>>,
    /// Net name -> owner id
    net_owners: FxHashMap<String, u32>,
    /// Owner id -> cells it blocked, so a net can be ripped up without a full scan
    owned_cells: FxHashMap<u32, FxHashSet<CellKey>>,
}

impl RoutingGraph {
    pub fn new(bounds: BoundingBox, grid_size: i64, layers: LayerStack) -> Self {
        Self {
            bounds,
            grid_size,
            layers,
            obstacles: FxHashMap::default(),
            net_owners: FxHashMap::default(),
            owned_cells: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn bounds(&self) -> BoundingBox {
        self.bounds
    }

    #[inline]
    pub fn grid_size(&self) -> i64 {
        self.grid_size
    }

    #[inline]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    /// Number of (cell, layer) pairs currently blocked by at least one owner
    pub fn blocked_cell_count(&self) -> usize {
        self.obstacles.len()
    }

    /// Add a fixed obstacle at the grid cell containing `point`
    pub fn add_obstacle(&mut self, point: Point, layer: usize) {
        self.block(point, layer, BOARD_OWNER);
    }

    /// Add fixed obstacles on every grid cell crossed by `segment`
    pub fn add_obstacle_line(&mut self, segment: &Segment, layer: usize) {
        for cell in grid_cells(segment.start, segment.end, self.grid_size) {
            self.block(cell, layer, BOARD_OWNER);
        }
    }

    /// Add an obstacle owned by `net`, removable with [`Self::clear_obstacles_for_net`]
    pub fn add_net_obstacle(&mut self, point: Point, layer: usize, net: &str) {
        let owner = self.owner_for(net);
        self.block(point, layer, owner);
    }

    /// Rasterize `segment` as obstacles owned by `net`
    pub fn add_net_obstacle_line(&mut self, segment: &Segment, layer: usize, net: &str) {
        let owner = self.owner_for(net);
        for cell in grid_cells(segment.start, segment.end, self.grid_size) {
            self.block(cell, layer, owner);
        }
    }

    /// Check if the node's grid cell is blocked on the node's layer
    #[inline]
    pub fn is_obstacle(&self, node: &RoutingNode) -> bool {
        let key = (snap_to_grid(node.position, self.grid_size), node.layer);
        self.obstacles.contains_key(&key)
    }

    /// Free neighbors of `node`: the 8 octilinear grid steps on the same
    /// layer, then the via transitions to the layers directly below and above.
    pub fn neighbors(&self, node: &RoutingNode) -> impl Iterator<Item = RoutingNode> + '_ {
        let node = *node;
        let step = self.grid_size;

        let planar = DIRECTIONS.into_iter().map(move |(dx, dy)| {
            RoutingNode::new(node.position + Point::new(dx * step, dy * step), node.layer)
        });
        let below = node.layer.checked_sub(1);
        let above = Some(node.layer + 1).filter(|&layer| layer < self.layers.len());
        let vias = below
            .into_iter()
            .chain(above)
            .map(move |layer| RoutingNode::new(node.position, layer));

        planar
            .chain(vias)
            .filter(move |n| self.bounds.contains(n.position) && !self.is_obstacle(n))
    }

    /// Remove every obstacle placed on behalf of `net`. Cells that another
    /// net or the board also blocked stay blocked. Returns the number of
    /// cells that became free.
    pub fn clear_obstacles_for_net(&mut self, net: &str) -> usize {
        let Some(&owner) = self.net_owners.get(net) else {
            return 0;
        };
        let Some(cells) = self.owned_cells.remove(&owner) else {
            return 0;
        };

        let mut released = 0;
        for key in cells {
            if let Some(owners) = self.obstacles.get_mut(&key) {
                owners.remove(&owner);
                if owners.is_empty() {
                    self.obstacles.remove(&key);
                    released += 1;
                }
            }
        }
        log::debug!("released {released} cells held by net {net}");
        released
    }

    fn owner_for(&mut self, net: &str) -> u32 {
        if let Some(&owner) = self.net_owners.get(net) {
            return owner;
        }
        let owner = self.net_owners.len() as u32 + 1;
        self.net_owners.insert(net.to_string(), owner);
        owner
    }

    fn block(&mut self, point: Point, layer: usize, owner: u32) {
        let key = (snap_to_grid(point, self.grid_size), layer);
        self.obstacles.entry(key).or_default().insert(owner);
        self.owned_cells.entry(owner).or_default().insert(key);
    }
}

/// Bresenham walk from the snapped start to the snapped end in whole grid
/// steps. Both endpoints are included.
fn grid_cells(start: Point, end: Point, grid_size: i64) -> Vec<Point> {
    let start = snap_to_grid(start, grid_size);
    let end = snap_to_grid(end, grid_size);

    let dx = (end.x - start.x).abs();
    let dy = (end.y - start.y).abs();
    let sx = if start.x < end.x { grid_size } else { -grid_size };
    let sy = if start.y < end.y { grid_size } else { -grid_size };
    let mut err = dx - dy;

    let mut cells = Vec::with_capacity((dx.max(dy) / grid_size) as usize + 1);
    let mut current = start;
    loop {
        cells.push(current);
        if current == end {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            current.x += sx;
        }
        if e2 < dx {
            err += dx;
            current.y += sy;
        }
    }
    cells
}
