//! Regions of interest.
//!
//! A site's region scopes every remote reduction. The orchestration layer
//! only needs a rough area (for batch sizing) and a serializable description
//! to hand to the compute service.

mod region;
mod source;

pub use region::{GeoError, Region, EARTH_RADIUS_M};
pub use source::{PointBuffer, RegionCatalog, RegionSource};
