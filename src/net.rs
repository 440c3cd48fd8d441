use serde::Serialize;

use crate::geometry::Point;
use crate::path::RoutingPath;

/// A set of pins to connect, in the order they should be chained.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Net {
    pub name: String,
    pub pins: Vec<Point>,
    /// Higher priorities are routed first
    pub priority: i32,
    pub routed: bool,
    pub route: Option<RoutingPath>,
}

impl Net {
    pub fn new(name: impl Into<String>, pins: Vec<Point>, priority: i32) -> Self {
        Self {
            name: name.into(),
            pins,
            priority,
            routed: false,
            route: None,
        }
    }

    /// A net that already carries geometry. The engine keeps it in place
    /// unless a higher-priority net rips it up.
    pub fn pre_routed(
        name: impl Into<String>,
        pins: Vec<Point>,
        priority: i32,
        route: RoutingPath,
    ) -> Self {
        let name = name.into();
        let route = RoutingPath {
            net_name: name.clone(),
            ..route
        };
        Self {
            name,
            pins,
            priority,
            routed: true,
            route: Some(route),
        }
    }

    pub(crate) fn clear_route(&mut self) -> Option<RoutingPath> {
        self.routed = false;
        self.route.take()
    }
}
