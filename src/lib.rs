//! Coordinate reference system transformations.
//!
//! ```no_run
//! use reproj::{Context, Point};
//!
//! let ctx = Context::new();
//! let to_mercator = ctx.converter("EPSG:4326", "EPSG:3857")?;
//! let p = to_mercator.forward(Point::new(-122.4194, 37.7749))?;
//! # Ok::<(), reproj::ProjError>(())
//! ```

pub mod axis;
pub mod context;
pub mod crs;
pub mod datum;
pub mod defs;
pub mod error;
pub mod point;
pub mod proj;
pub mod transform;

pub use axis::AxisOrder;
pub use context::Context;
pub use crs::Crs;
pub use datum::gridshift::{GridShiftTable, Subgrid};
pub use datum::{Datum, DatumType};
pub use defs::ProjDef;
pub use error::ProjError;
pub use point::Point;
pub use proj::ellipsoid::Ellipsoid;
pub use transform::{transform, Converter};
