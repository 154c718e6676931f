//! Geodetic and local NED frame conversions

mod frame;
mod types;
mod utm;

pub use frame::{
    global_to_local, local_to_global,
    FrameConverter,
};
pub use types::{GeodeticPoint, HomeAnchor, LocalPoint};
