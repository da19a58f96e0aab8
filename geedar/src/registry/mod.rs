//! Static registries of products, algorithms and reducers.
//!
//! These catalogs are the single source of truth for what a processing code
//! may reference. Each id maps to one static entry; callers look an entry up once
//! per plan instead of branching on ids.
//!
//! ```
//! use geedar::registry;
//!
//! let product = registry::product(201).unwrap();
//! assert_eq!(product.band_for("red"), Some("B4"));
//! assert_eq!(registry::reducer(1).unwrap().name, "median");
//! ```

mod algorithms;
mod products;
mod reducers;

pub use algorithms::{EstimationAlgoSpec, PixelAlgoSpec};
pub use products::{ProductSpec, CANONICAL_BANDS};
pub use reducers::ReducerSpec;

use chrono::NaiveDate;

/// Looks up a product by id.
pub fn product(id: u16) -> Option<&'static ProductSpec> {
    products::PRODUCTS.iter().find(|p| p.id == id)
}

/// Looks up a pixel-selection algorithm by id.
pub fn pixel_algorithm(id: u8) -> Option<&'static PixelAlgoSpec> {
    algorithms::PIXEL_ALGORITHMS.iter().find(|a| a.id == id)
}

/// Looks up an estimation algorithm by id.
pub fn estimation_algorithm(id: u8) -> Option<&'static EstimationAlgoSpec> {
    algorithms::ESTIMATION_ALGORITHMS.iter().find(|a| a.id == id)
}

/// Looks up a reducer by id.
pub fn reducer(id: u8) -> Option<&'static ReducerSpec> {
    reducers::REDUCERS.iter().find(|r| r.id == id)
}

/// All products, ascending by id.
pub fn products() -> &'static [ProductSpec] {
    products::PRODUCTS
}

/// All pixel-selection algorithms, ascending by id.
pub fn pixel_algorithms() -> &'static [PixelAlgoSpec] {
    algorithms::PIXEL_ALGORITHMS
}

/// All estimation algorithms, ascending by id.
pub fn estimation_algorithms() -> &'static [EstimationAlgoSpec] {
    algorithms::ESTIMATION_ALGORITHMS
}

/// All reducers, ascending by id.
pub fn reducers() -> &'static [ReducerSpec] {
    reducers::REDUCERS
}

/// Earliest start date among the given products.
///
/// Falls back to the earliest start of the whole catalog when `ids` names no
/// known product.
pub fn earliest_start(ids: &[u16]) -> NaiveDate {
    let known: Vec<NaiveDate> = ids
        .iter()
        .filter_map(|id| product(*id))
        .map(|p| p.start_date())
        .collect();
    let dates = if known.is_empty() {
        products().iter().map(|p| p.start_date()).collect()
    } else {
        known
    };
    dates.into_iter().min().unwrap_or(NaiveDate::MIN)
}

/// Whether `name` starts with a canonical band name (the part before the
/// first underscore).
pub fn is_canonical_column(name: &str) -> bool {
    let head = name.split('_').next().unwrap_or(name);
    CANONICAL_BANDS.contains(&head)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_known_ids() {
        assert_eq!(product(901).unwrap().sensor, "GPM/IMERG");
        assert_eq!(pixel_algorithm(14).unwrap().id, 14);
        assert_eq!(estimation_algorithm(11).unwrap().param_names.len(), 5);
        assert_eq!(reducer(7).unwrap().suffixes.len(), 5);
    }

    #[test]
    fn test_lookup_unknown_ids() {
        assert!(product(999).is_none());
        assert!(pixel_algorithm(15).is_none());
        assert!(estimation_algorithm(6).is_none());
        assert!(reducer(8).is_none());
    }

    #[test]
    fn test_earliest_start_uses_requested_products() {
        let start = earliest_start(&[201, 303]);
        assert_eq!(start, NaiveDate::from_ymd_opt(2013, 4, 11).unwrap());
    }

    #[test]
    fn test_earliest_start_falls_back_to_catalog() {
        let start = earliest_start(&[]);
        assert_eq!(start, NaiveDate::from_ymd_opt(1982, 8, 22).unwrap());
    }

    #[test]
    fn test_canonical_column_detection() {
        assert!(is_canonical_column("red_median"));
        assert!(is_canonical_column("NIR"));
        assert!(!is_canonical_column("sur_refl_b01_median"));
        assert!(!is_canonical_column("n_selected_pixels"));
    }
}
