use thiserror::Error;

use crate::geometry::Point;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("layer stack must contain at least one layer")]
    EmptyLayerStack,
    #[error("layer `{0}` appears more than once in the layer stack")]
    DuplicateLayer(String),
    #[error("grid size must be positive, got {0}")]
    InvalidGridSize(i64),
    #[error("bounding box minimum {min} exceeds maximum {max}")]
    InvalidBounds { min: Point, max: Point },
    #[error("invalid router configuration: {0}")]
    Config(#[from] toml::de::Error),
    #[error("failed to serialize routing report: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
