//! Python bindings.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::config::RouterConfig;
use crate::engine::{CancellationToken, RoutingEngine, RoutingJob, RoutingResult};
use crate::error::Error;
use crate::geometry::{BoundingBox, Point};
use crate::net::Net;
use crate::types::LayerStack;
use crate::VERSION;

impl From<Error> for PyErr {
    fn from(err: Error) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

/// Outcome of `Router.route`
#[pyclass(name = "RouteResult")]
#[derive(Clone)]
pub struct PyRouteResult {
    #[pyo3(get)]
    pub success: bool,
    /// (net name, [(x, y, layer), ...]) in routing order
    #[pyo3(get)]
    pub routed: Vec<(String, Vec<(i64, i64, usize)>)>,
    #[pyo3(get)]
    pub failed: Vec<String>,
    #[pyo3(get)]
    pub total_vias: usize,
    #[pyo3(get)]
    pub total_length: f64,
    /// Seconds
    #[pyo3(get)]
    pub elapsed: f64,
}

impl From<RoutingResult> for PyRouteResult {
    fn from(result: RoutingResult) -> Self {
        let routed = result
            .routed_nets
            .iter()
            .map(|net| {
                let nodes = net
                    .route
                    .iter()
                    .flat_map(|path| &path.nodes)
                    .map(|node| (node.position.x, node.position.y, node.layer))
                    .collect();
                (net.name.clone(), nodes)
            })
            .collect();
        Self {
            success: result.success,
            routed,
            failed: result.failed_nets.into_iter().map(|net| net.name).collect(),
            total_vias: result.total_vias,
            total_length: result.total_length,
            elapsed: result.elapsed.as_secs_f64(),
        }
    }
}

#[pymethods]
impl PyRouteResult {
    fn __repr__(&self) -> String {
        format!(
            "RouteResult(success={}, routed={}, failed={}, vias={})",
            self.success,
            self.routed.len(),
            self.failed.len(),
            self.total_vias
        )
    }
}

/// Board router
#[pyclass(name = "Router")]
pub struct PyRouter {
    engine: RoutingEngine,
}

#[pymethods]
impl PyRouter {
    #[new]
    #[pyo3(signature = (length_weight=1.0, via_weight=50.0, max_iterations=None))]
    fn new(length_weight: f64, via_weight: f64, max_iterations: Option<u32>) -> Self {
        let mut config = RouterConfig {
            max_iterations,
            ..RouterConfig::default()
        };
        config.weights.length = length_weight;
        config.weights.via = via_weight;
        Self {
            engine: RoutingEngine::new(config),
        }
    }

    /// Route nets given as (name, [(x, y), ...], priority) tuples.
    /// Runs without the GIL.
    fn route(
        &self,
        py: Python<'_>,
        nets: Vec<(String, Vec<(i64, i64)>, i32)>,
        bounds: ((i64, i64), (i64, i64)),
        grid_size: i64,
        layers: Vec<String>,
    ) -> PyResult<PyRouteResult> {
        let ((min_x, min_y), (max_x, max_y)) = bounds;
        let job = RoutingJob::new(
            BoundingBox::new(Point::new(min_x, min_y), Point::new(max_x, max_y)),
            grid_size,
            LayerStack::new(layers)?,
        )?;
        let nets = nets
            .into_iter()
            .map(|(name, pins, priority)| {
                let pins = pins.into_iter().map(|(x, y)| Point::new(x, y)).collect();
                Net::new(name, pins, priority)
            })
            .collect();

        let result = py.allow_threads(|| {
            self.engine
                .route_board_blocking(nets, &job, &CancellationToken::new())
        });
        Ok(result.into())
    }
}

#[pymodule]
fn pcb_router(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", VERSION)?;
    m.add_class::<PyRouter>()?;
    m.add_class::<PyRouteResult>()?;
    Ok(())
}
