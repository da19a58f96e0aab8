//! Region geometry.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use thiserror::Error;

/// Mean Earth radius used for area computations.
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Region validation errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeoError {
    #[error("invalid latitude: {0} (must be between -90 and 90)")]
    InvalidLatitude(f64),

    #[error("invalid longitude: {0} (must be between -180 and 180)")]
    InvalidLongitude(f64),

    #[error("buffer radius must be greater than zero, got {0}")]
    InvalidRadius(f64),

    #[error("polygon needs at least one ring with three or more vertices")]
    DegeneratePolygon,
}

/// Region of interest of a site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Region {
    /// Circle of `radius_m` metres around a point.
    BufferedPoint { lat: f64, lon: f64, radius_m: f64 },
    /// One or more polygons; each ring is a list of `[lon, lat]` vertices.
    Polygon { rings: Vec<Vec<[f64; 2]>> },
}

impl Region {
    /// Creates a buffered point, validating coordinates and radius.
    pub fn buffered_point(lat: f64, lon: f64, radius_m: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(GeoError::InvalidLongitude(lon));
        }
        if radius_m <= 0.0 || !radius_m.is_finite() {
            return Err(GeoError::InvalidRadius(radius_m));
        }
        Ok(Region::BufferedPoint { lat, lon, radius_m })
    }

    /// Creates a polygon region from `[lon, lat]` rings.
    pub fn polygon(rings: Vec<Vec<[f64; 2]>>) -> Result<Self, GeoError> {
        if rings.is_empty() || rings.iter().any(|ring| ring.len() < 3) {
            return Err(GeoError::DegeneratePolygon);
        }
        for [lon, lat] in rings.iter().flatten() {
            if !(-90.0..=90.0).contains(lat) {
                return Err(GeoError::InvalidLatitude(*lat));
            }
            if !(-180.0..=180.0).contains(lon) {
                return Err(GeoError::InvalidLongitude(*lon));
            }
        }
        Ok(Region::Polygon { rings })
    }

    /// Re-checks a region built without the constructors (e.g. deserialized).
    pub fn validated(self) -> Result<Self, GeoError> {
        match self {
            Region::BufferedPoint { lat, lon, radius_m } => {
                Region::buffered_point(lat, lon, radius_m)
            }
            Region::Polygon { rings } => Region::polygon(rings),
        }
    }

    /// Approximate area in square metres.
    ///
    /// Buffered points use the planar disc area; polygons use the spherical
    /// excess of each ring, summed over rings.
    pub fn area_m2(&self) -> f64 {
        match self {
            Region::BufferedPoint { radius_m, .. } => PI * radius_m * radius_m,
            Region::Polygon { rings } => rings.iter().map(|ring| ring_area_m2(ring)).sum(),
        }
    }
}

/// Area of a closed ring on the sphere.
///
/// Uses the trapezoid form of the spherical excess; the ring may or may not
/// repeat its first vertex.
fn ring_area_m2(ring: &[[f64; 2]]) -> f64 {
    let n = ring.len();
    if n < 3 {
        return 0.0;
    }

    let mut total = 0.0;
    for i in 0..n {
        let [lon1, lat1] = ring[i];
        let [lon2, lat2] = ring[(i + 1) % n];
        total += (lon2 - lon1).to_radians()
            * (2.0 + lat1.to_radians().sin() + lat2.to_radians().sin());
    }
    (total * EARTH_RADIUS_M * EARTH_RADIUS_M / 2.0).abs()
}
