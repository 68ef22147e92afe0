use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjError {
    #[error("Unknown CRS: {0}")]
    UnknownCrs(String),

    #[error("Unknown projection: {0}")]
    UnknownProjection(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Malformed WKT: {0}")]
    MalformedWkt(String),

    #[error("Invalid axis code: {0}")]
    InvalidAxis(String),

    #[error("Coordinate out of range: {0}")]
    OutOfRange(String),

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Failed to converge: {0}")]
    Convergence(String),

    #[error("Unable to find mandatory grid '{0}'")]
    MissingGrid(String),

    #[error("No grid shift table covers ({lon}, {lat}); tried: {tried}")]
    GridCoverage { lon: f64, lat: f64, tried: String },

    #[error("Invalid grid file: {0}")]
    InvalidGrid(String),

    #[error("Non-finite coordinate: ({x}, {y}, {z})")]
    NonFinite { x: f64, y: f64, z: f64 },
}
