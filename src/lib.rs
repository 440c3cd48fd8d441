//! Grid-based A* PCB router.
//!
//! Nets are routed one after another on a discretized multi-layer board.
//! Each routed net becomes an obstacle for the nets after it; when a net
//! cannot be routed the engine may rip up a lower-priority net and retry.
//!
//! ```no_run
//! use pcb_router::{
//!     BoundingBox, CancellationToken, LayerStack, Net, Point, RoutingEngine, RoutingJob,
//! };
//!
//! # fn main() -> pcb_router::Result<()> {
//! let job = RoutingJob::new(
//!     BoundingBox::new(Point::new(0, 0), Point::new(10_000_000, 10_000_000)),
//!     100_000,
//!     LayerStack::new(["F.Cu", "B.Cu"])?,
//! )?;
//! let nets = vec![Net::new("CLK", vec![Point::new(0, 0), Point::new(2_000_000, 0)], 10)];
//! let cancel = CancellationToken::new();
//! let result = RoutingEngine::default().route_board_blocking(nets, &job, &cancel);
//! assert!(result.success);
//! # Ok(())
//! # }
//! ```
//!
//! Python bindings are available behind the `python` feature.

pub mod config;
pub mod cost;
pub mod drc;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod graph;
pub mod net;
pub mod path;
pub mod report;
pub mod router;
pub mod types;

#[cfg(feature = "python")]
mod python;

pub use config::RouterConfig;
pub use cost::{CostFunction, CostWeights};
pub use drc::{DesignRules, NoopRuleEngine, RuleEngine, Violation, ViolationKind};
pub use engine::{CancellationToken, RoutingEngine, RoutingJob, RoutingResult};
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Point, Segment};
pub use graph::RoutingGraph;
pub use net::Net;
pub use path::{RoutingPath, Via};
pub use report::RoutingSummary;
pub use router::{GridRouter, PathFinder, SearchStats};
pub use types::{LayerStack, RoutingNode};

/// Version of the router
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
