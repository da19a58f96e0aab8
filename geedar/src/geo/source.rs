//! Region resolution for sites.

use std::collections::HashMap;

use tracing::warn;

use super::region::Region;

/// Resolves the region of interest of a site.
///
/// Returning `None` means the site cannot be queried; the expander logs
/// and skips it.
pub trait RegionSource: Send + Sync {
    /// Returns the region for a site given its identifier and, when the
    /// input has them, its coordinates as `(lat, lon)`.
    fn region_for(&self, site_id: &str, coords: Option<(f64, f64)>) -> Option<Region>;
}

/// Buffers each site's point by a fixed radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointBuffer {
    radius_m: f64,
}

impl PointBuffer {
    pub fn new(radius_m: f64) -> Self {
        Self { radius_m }
    }

    pub fn radius_m(&self) -> f64 {
        self.radius_m
    }
}

impl RegionSource for PointBuffer {
    fn region_for(&self, site_id: &str, coords: Option<(f64, f64)>) -> Option<Region> {
        let (lat, lon) = coords?;
        match Region::buffered_point(lat, lon, self.radius_m) {
            Ok(region) => Some(region),
            Err(e) => {
                warn!(site = site_id, error = %e, "Cannot buffer site coordinates");
                None
            }
        }
    }
}

/// Looks regions up by site identifier.
///
/// Used when sites are polygons (reservoirs, basins) rather than points.
/// An optional fallback buffer covers sites missing from the catalog.
#[derive(Debug, Clone, Default)]
pub struct RegionCatalog {
    regions: HashMap<String, Region>,
    fallback: Option<PointBuffer>,
}

impl RegionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the region of a site.
    pub fn with_region(mut self, site_id: impl Into<String>, region: Region) -> Self {
        self.regions.insert(site_id.into(), region);
        self
    }

    /// Buffers coordinates for sites the catalog does not know.
    pub fn with_fallback(mut self, fallback: PointBuffer) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn insert(&mut self, site_id: impl Into<String>, region: Region) {
        self.regions.insert(site_id.into(), region);
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

impl RegionSource for RegionCatalog {
    fn region_for(&self, site_id: &str, coords: Option<(f64, f64)>) -> Option<Region> {
        if let Some(region) = self.regions.get(site_id) {
            return Some(region.clone());
        }
        self.fallback
            .as_ref()
            .and_then(|buffer| buffer.region_for(site_id, coords))
    }
}
