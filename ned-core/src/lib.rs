//! Conversion between geodetic positions and a local north/east/down
//! frame anchored at a home point.

pub mod coordinate;
pub mod error;

pub use coordinate::{
    global_to_local, local_to_global, FrameConverter, GeodeticPoint, HomeAnchor, LocalPoint,
};
pub use error::{CoordinateError, NedError, Result};
