//! Compact summary of a routing job, as text or JSON.

use serde::Serialize;
use std::fmt;

use crate::engine::RoutingResult;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingSummary {
    pub success: bool,
    pub cancelled: bool,
    pub routed_net_count: usize,
    pub failed_net_count: usize,
    pub pending_net_count: usize,
    pub failed_nets: Vec<String>,
    pub total_vias: usize,
    pub total_length: f64,
    pub elapsed_secs: f64,
}

impl RoutingSummary {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl From<&RoutingResult> for RoutingSummary {
    fn from(result: &RoutingResult) -> Self {
        Self {
            success: result.success,
            cancelled: result.cancelled,
            routed_net_count: result.routed_nets.len(),
            failed_net_count: result.failed_nets.len(),
            pending_net_count: result.pending_nets.len(),
            failed_nets: result.failed_nets.iter().map(|net| net.name.clone()).collect(),
            total_vias: result.total_vias,
            total_length: result.total_length,
            elapsed_secs: result.elapsed.as_secs_f64(),
        }
    }
}

impl fmt::Display for RoutingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match (self.success, self.cancelled) {
            (_, true) => "CANCELLED",
            (true, false) => "SUCCESS",
            (false, false) => "PARTIAL",
        };
        writeln!(f, "=== Routing Report ===")?;
        writeln!(f, "Status: {status}")?;
        writeln!(f, "Routed Nets: {}", self.routed_net_count)?;
        writeln!(f, "Failed Nets: {}", self.failed_net_count)?;
        if !self.failed_nets.is_empty() {
            writeln!(f, "  {}", self.failed_nets.join(", "))?;
        }
        if self.pending_net_count > 0 {
            writeln!(f, "Pending Nets: {}", self.pending_net_count)?;
        }
        writeln!(f, "Vias: {}", self.total_vias)?;
        writeln!(f, "Total Length: {:.2} internal units", self.total_length)?;
        write!(f, "Time: {:.2}s", self.elapsed_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary() -> RoutingSummary {
        RoutingSummary {
            success: false,
            cancelled: false,
            routed_net_count: 3,
            failed_net_count: 1,
            pending_net_count: 0,
            failed_nets: vec!["GND".to_string()],
            total_vias: 4,
            total_length: 1_250_000.0,
            elapsed_secs: 0.5,
        }
    }

    #[test]
    fn text_report_lists_counts_and_failures() {
        let text = summary().to_string();
        assert!(text.starts_with("=== Routing Report ===\nStatus: PARTIAL\n"));
        assert!(text.contains("Routed Nets: 3\n"));
        assert!(text.contains("Failed Nets: 1\n  GND\n"));
        assert!(text.contains("Vias: 4\n"));
        assert!(text.contains("Total Length: 1250000.00 internal units"));
        assert!(text.ends_with("Time: 0.50s"));
        assert!(!text.contains("Pending"));
    }

    #[test]
    fn json_uses_camel_case_keys() {
        let json: serde_json::Value = serde_json::from_str(&summary().to_json().unwrap()).unwrap();
        assert_eq!(json["routedNetCount"], 3);
        assert_eq!(json["failedNets"][0], "GND");
        assert_eq!(json["success"], false);
    }
}
