//! Design-rule checking hook.
//!
//! The engine calls [`RuleEngine::check`] once per job on the routed nets.
//! The bundled [`NoopRuleEngine`] accepts everything; real checkers plug in
//! through the trait.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::net::Net;
use crate::path::{DEFAULT_TRACK_WIDTH, DEFAULT_VIA_DIAMETER, DEFAULT_VIA_DRILL};

/// Manufacturing rules handed to the checker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRules {
    pub clearance: i64,
    pub track_width: i64,
    pub via_diameter: i64,
    pub via_drill: i64,
}

impl Default for DesignRules {
    fn default() -> Self {
        Self {
            clearance: 200_000,
            track_width: DEFAULT_TRACK_WIDTH,
            via_diameter: DEFAULT_VIA_DIAMETER,
            via_drill: DEFAULT_VIA_DRILL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationKind {
    Clearance,
    TrackWidth,
    ViaSize,
}

/// One rule violation found after routing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub kind: ViolationKind,
    pub net: String,
    pub position: Point,
    pub message: String,
}

pub trait RuleEngine {
    fn load_rules(&mut self, rules: &DesignRules);
    fn check(&self, nets: &[Net]) -> Vec<Violation>;
}

/// Rule engine that reports nothing.
#[derive(Debug, Clone, Default)]
pub struct NoopRuleEngine {
    rules: DesignRules,
}

impl NoopRuleEngine {
    pub fn rules(&self) -> &DesignRules {
        &self.rules
    }
}

impl RuleEngine for NoopRuleEngine {
    fn load_rules(&mut self, rules: &DesignRules) {
        self.rules = *rules;
    }

    fn check(&self, _nets: &[Net]) -> Vec<Violation> {
        Vec::new()
    }
}
