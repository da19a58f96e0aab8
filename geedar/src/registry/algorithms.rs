//! Pixel-selection and estimation algorithm catalogs.
//!
//! The algorithms themselves run inside the remote engine. The client only
//! needs to know how many images one call may carry, which products an
//! algorithm accepts, and which bands/parameters an estimation needs and
//! produces.

/// Products every optical algorithm accepts.
const OPTICAL: &[u16] = &[
    101, 102, 103, 104, 105, 106, 107, 111, 112, 113, 114, 115, 116, 117, 151, 152, 201, 202, 301,
    302, 303, 311, 312, 313, 314, 315,
];

/// MODIS-family products with red and NIR at 250/500 m.
const MODIS_LIKE: &[u16] = &[
    101, 102, 103, 104, 105, 106, 107, 111, 112, 113, 114, 115, 116, 117, 151, 152,
];

/// Products with a SWIR band in the 2000 nm range (S2WP family).
const HIGH_RES_SWIR: &[u16] = &[201, 202, 301, 302, 303, 311, 312, 313, 314, 315];

/// Products accepted by the MODIS-tuned S2WP variant.
const S2WP_MODIS: &[u16] = &[
    101, 102, 105, 106, 107, 111, 112, 115, 116, 117, 151, 152, 201, 202, 301, 302, 303, 311, 312,
    313, 314, 315,
];

const ALL_PRODUCTS: &[u16] = &[
    101, 102, 103, 104, 105, 106, 107, 111, 112, 113, 114, 115, 116, 117, 151, 152, 201, 202, 301,
    302, 303, 311, 312, 313, 314, 315, 901,
];

/// Static description of a pixel-selection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelAlgoSpec {
    /// Two-digit id (second field of a processing code)
    pub id: u8,
    pub name: &'static str,
    /// Per-call image ceiling imposed by the engine's complexity limits
    pub max_simultaneous_images: usize,
    /// Product ids the algorithm can run on
    pub applicable_to: &'static [u16],
}

impl PixelAlgoSpec {
    /// Whether the algorithm accepts the product.
    pub fn is_applicable_to(&self, product_id: u16) -> bool {
        self.applicable_to.contains(&product_id)
    }
}

pub(super) static PIXEL_ALGORITHMS: &[PixelAlgoSpec] = &[
    PixelAlgoSpec {
        id: 0,
        name: "No pixel selection",
        max_simultaneous_images: 3000,
        applicable_to: ALL_PRODUCTS,
    },
    PixelAlgoSpec {
        id: 1,
        name: "Quality mask (cloud, shadow, aerosol)",
        max_simultaneous_images: 3000,
        applicable_to: OPTICAL,
    },
    PixelAlgoSpec {
        id: 2,
        name: "MOD3R",
        max_simultaneous_images: 100,
        applicable_to: MODIS_LIKE,
    },
    PixelAlgoSpec {
        id: 3,
        name: "MOD3R (minNDVI clustering)",
        max_simultaneous_images: 100,
        applicable_to: MODIS_LIKE,
    },
    PixelAlgoSpec {
        id: 4,
        name: "MOD3R (no statistical filter)",
        max_simultaneous_images: 100,
        applicable_to: MODIS_LIKE,
    },
    PixelAlgoSpec {
        id: 5,
        name: "Ventura 2018 (reservoirs)",
        max_simultaneous_images: 3000,
        applicable_to: OPTICAL,
    },
    PixelAlgoSpec {
        id: 6,
        name: "S2WP v6",
        max_simultaneous_images: 300,
        applicable_to: HIGH_RES_SWIR,
    },
    PixelAlgoSpec {
        id: 7,
        name: "S2WP v7",
        max_simultaneous_images: 300,
        applicable_to: HIGH_RES_SWIR,
    },
    PixelAlgoSpec {
        id: 8,
        name: "S2WP v8",
        max_simultaneous_images: 300,
        applicable_to: HIGH_RES_SWIR,
    },
    PixelAlgoSpec {
        id: 9,
        name: "S2WP v9 (Sentinel-2/Landsat thresholds)",
        max_simultaneous_images: 300,
        applicable_to: HIGH_RES_SWIR,
    },
    PixelAlgoSpec {
        id: 10,
        name: "S2WP v9 (MODIS thresholds)",
        max_simultaneous_images: 300,
        applicable_to: S2WP_MODIS,
    },
    PixelAlgoSpec {
        id: 11,
        name: "RICO (Red In Cyan Out)",
        max_simultaneous_images: 150,
        applicable_to: OPTICAL,
    },
    PixelAlgoSpec {
        id: 12,
        name: "RICO with MOD3R statistical filter",
        max_simultaneous_images: 150,
        applicable_to: OPTICAL,
    },
    PixelAlgoSpec {
        id: 13,
        name: "minNDVI + Wang et al. 2016",
        max_simultaneous_images: 100,
        applicable_to: OPTICAL,
    },
    PixelAlgoSpec {
        id: 14,
        name: "GPM daily precipitation",
        max_simultaneous_images: 3000,
        applicable_to: &[901],
    },
];

/// Static description of an estimation (inversion) algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimationAlgoSpec {
    /// Two-digit id (third field of a processing code)
    pub id: u8,
    pub name: &'static str,
    /// Canonical bands the product must provide
    pub required_bands: &'static [&'static str],
    /// Parameters the algorithm adds to each image
    pub param_names: &'static [&'static str],
}

pub(super) static ESTIMATION_ALGORITHMS: &[EstimationAlgoSpec] = &[
    EstimationAlgoSpec {
        id: 0,
        name: "No estimation",
        required_bands: &[],
        param_names: &[],
    },
    EstimationAlgoSpec {
        id: 1,
        name: "Chlorophyll-a, northeast Brazil reservoirs",
        required_bands: &["red", "green"],
        param_names: &["chla_surface"],
    },
    EstimationAlgoSpec {
        id: 2,
        name: "Surface suspended solids, Solimões river",
        required_bands: &["red", "NIR"],
        param_names: &["SS_surface"],
    },
    EstimationAlgoSpec {
        id: 3,
        name: "Surface suspended solids, Madeira river",
        required_bands: &["red", "NIR"],
        param_names: &["SS_surface"],
    },
    EstimationAlgoSpec {
        id: 4,
        name: "Surface suspended solids, Amazon river at Óbidos",
        required_bands: &["NIR"],
        param_names: &["SS_surface"],
    },
    EstimationAlgoSpec {
        id: 5,
        name: "Turbidity, Paranapanema reservoirs",
        required_bands: &["red"],
        param_names: &["turbidity"],
    },
    EstimationAlgoSpec {
        id: 10,
        name: "Surface suspended solids, Paraopeba river",
        required_bands: &["NIR", "red", "green"],
        param_names: &["SS_surface"],
    },
    EstimationAlgoSpec {
        id: 11,
        name: "SSS, ISS, OSS and chlorophyll-a, semiarid reservoirs",
        required_bands: &["NIR", "red", "green", "blue"],
        param_names: &["SSS", "ISS", "OSS", "chla", "biomass"],
    },
    EstimationAlgoSpec {
        id: 12,
        name: "Chlorophyll-a, semiarid reservoirs",
        required_bands: &["green", "red"],
        param_names: &["chla"],
    },
    EstimationAlgoSpec {
        id: 99,
        name: "Constant test parameter",
        required_bands: &[],
        param_names: &["test_param"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_algorithm_ids_are_sequential() {
        for (index, algo) in PIXEL_ALGORITHMS.iter().enumerate() {
            assert_eq!(algo.id as usize, index);
            assert!(algo.max_simultaneous_images > 0);
        }
    }

    #[test]
    fn test_precipitation_algorithm_only_accepts_gpm() {
        let gpm = &PIXEL_ALGORITHMS[14];
        assert!(gpm.is_applicable_to(901));
        assert!(!gpm.is_applicable_to(101));
    }

    #[test]
    fn test_estimation_ids_fit_two_digits() {
        assert!(ESTIMATION_ALGORITHMS.iter().all(|a| a.id < 100));
    }
}
