//! Product catalog.
//!
//! A product is one image collection on the remote engine together with the
//! band layout the orchestration layer needs: which band answers to which
//! canonical name, how coarse a pixel roughly is, and when the sensor started
//! delivering imagery.

use chrono::NaiveDate;

/// Canonical band names shared across products.
///
/// The order matters: append-mode output lists canonical columns in this
/// order after the algorithm-specific ones.
pub const CANONICAL_BANDS: &[&str] = &[
    "blue", "green", "red", "NIR", "SWIR", "wl490", "wl560", "wl665", "wl740", "wl780", "wl800",
    "wl900", "wl1200", "wl1500", "wl2000",
];

/// Static description of one product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductSpec {
    /// Three-digit product id (first field of a processing code)
    pub id: u16,
    /// Sensor/platform label written to the `Source` column in append mode
    pub sensor: &'static str,
    /// Collection id on the remote engine
    pub collection: &'static str,
    /// Canonical name → band name
    pub common_bands: &'static [(&'static str, &'static str)],
    /// Bands carrying surface reflectance (or the measured quantity)
    pub spectral_bands: &'static [&'static str],
    /// Rough pixel size in metres, used for batch sizing only
    pub rough_scale_m: f64,
    /// First day with imagery, as (year, month, day)
    start: (i32, u32, u32),
}

impl ProductSpec {
    /// First day with imagery.
    pub fn start_date(&self) -> NaiveDate {
        let (y, m, d) = self.start;
        NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
    }

    /// Band name behind a canonical name, if the product has it.
    pub fn band_for(&self, canonical: &str) -> Option<&'static str> {
        self.common_bands
            .iter()
            .find(|(name, _)| *name == canonical)
            .map(|(_, band)| *band)
    }

    /// Whether the product exposes the canonical band.
    pub fn has_canonical(&self, canonical: &str) -> bool {
        self.band_for(canonical).is_some()
    }

    /// Every band the engine reduces for this product, deduplicated, in
    /// declaration order (common bands first, then spectral bands).
    pub fn reduced_bands(&self) -> Vec<&'static str> {
        let mut bands: Vec<&'static str> = Vec::new();
        for band in self
            .common_bands
            .iter()
            .map(|(_, band)| *band)
            .chain(self.spectral_bands.iter().copied())
        {
            if !bands.contains(&band) {
                bands.push(band);
            }
        }
        bands
    }
}

const MODIS_500M_COMMON: &[(&str, &str)] = &[
    ("blue", "sur_refl_b03"),
    ("green", "sur_refl_b04"),
    ("red", "sur_refl_b01"),
    ("NIR", "sur_refl_b02"),
    ("SWIR", "sur_refl_b06"),
    ("wl490", "sur_refl_b03"),
    ("wl800", "sur_refl_b02"),
    ("wl1200", "sur_refl_b05"),
    ("wl1500", "sur_refl_b06"),
    ("wl2000", "sur_refl_b07"),
];

const MODIS_500M_SPECTRAL: &[&str] = &[
    "sur_refl_b01",
    "sur_refl_b02",
    "sur_refl_b03",
    "sur_refl_b04",
    "sur_refl_b05",
    "sur_refl_b06",
    "sur_refl_b07",
];

const MODIS_250M_COMMON: &[(&str, &str)] = &[
    ("red", "sur_refl_b01"),
    ("NIR", "sur_refl_b02"),
    ("wl800", "sur_refl_b02"),
];

const MODIS_250M_SPECTRAL: &[&str] = &["sur_refl_b01", "sur_refl_b02"];

const MODIS_NBAR_COMMON: &[(&str, &str)] = &[
    ("blue", "Nadir_Reflectance_Band3"),
    ("green", "Nadir_Reflectance_Band4"),
    ("red", "Nadir_Reflectance_Band1"),
    ("NIR", "Nadir_Reflectance_Band2"),
    ("SWIR", "Nadir_Reflectance_Band6"),
    ("wl490", "Nadir_Reflectance_Band3"),
    ("wl800", "Nadir_Reflectance_Band2"),
    ("wl1200", "Nadir_Reflectance_Band5"),
    ("wl1500", "Nadir_Reflectance_Band6"),
    ("wl2000", "Nadir_Reflectance_Band7"),
];

const MODIS_NBAR_SPECTRAL: &[&str] = &[
    "Nadir_Reflectance_Band1",
    "Nadir_Reflectance_Band2",
    "Nadir_Reflectance_Band3",
    "Nadir_Reflectance_Band4",
    "Nadir_Reflectance_Band5",
    "Nadir_Reflectance_Band6",
    "Nadir_Reflectance_Band7",
];

const VIIRS_COMMON: &[(&str, &str)] = &[
    ("blue", "M3"),
    ("green", "M4"),
    ("red", "I1"),
    ("NIR", "I2"),
    ("SWIR", "I3"),
    ("wl490", "M3"),
    ("wl560", "M4"),
    ("wl665", "M5"),
    ("wl740", "M6"),
    ("wl800", "I2"),
    ("wl1200", "M8"),
    ("wl1500", "M10"),
    ("wl2000", "M11"),
];

const VIIRS_SPECTRAL: &[&str] = &[
    "M1", "M2", "M3", "M4", "M5", "M7", "M8", "M10", "M11", "I1", "I2", "I3",
];

const S2_COMMON: &[(&str, &str)] = &[
    ("blue", "B2"),
    ("green", "B3"),
    ("red", "B4"),
    ("NIR", "B8"),
    ("SWIR", "B11"),
    ("wl490", "B2"),
    ("wl560", "B3"),
    ("wl665", "B4"),
    ("wl740", "B6"),
    ("wl780", "B7"),
    ("wl800", "B8"),
    ("wl900", "B8A"),
    ("wl1500", "B11"),
    ("wl2000", "B12"),
];

const S2_SR_SPECTRAL: &[&str] = &[
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B8A", "B9", "B11", "B12",
];

const S2_TOA_SPECTRAL: &[&str] = &[
    "B1", "B2", "B3", "B4", "B5", "B6", "B7", "B8", "B8A", "B9", "B10", "B11", "B12",
];

const TM_ETM_SR_COMMON: &[(&str, &str)] = &[
    ("blue", "B1"),
    ("green", "B2"),
    ("red", "B3"),
    ("NIR", "B4"),
    ("SWIR", "B5"),
    ("wl490", "B1"),
    ("wl560", "B2"),
    ("wl665", "B3"),
    ("wl800", "B4"),
    ("wl1500", "B5"),
    ("wl2000", "B7"),
];

const TM_ETM_SR_SPECTRAL: &[&str] = &["B1", "B2", "B3", "B4", "B5", "B7"];

const OLI_SR_COMMON: &[(&str, &str)] = &[
    ("blue", "B2"),
    ("green", "B3"),
    ("red", "B4"),
    ("NIR", "B5"),
    ("SWIR", "B6"),
    ("wl490", "B2"),
    ("wl560", "B3"),
    ("wl665", "B4"),
    ("wl800", "B5"),
    ("wl1500", "B6"),
    ("wl2000", "B7"),
];

const OLI_SR_SPECTRAL: &[&str] = &["B1", "B2", "B3", "B4", "B5", "B6", "B7"];

const TM_ETM_L2_COMMON: &[(&str, &str)] = &[
    ("blue", "SR_B1"),
    ("green", "SR_B2"),
    ("red", "SR_B3"),
    ("NIR", "SR_B4"),
    ("SWIR", "SR_B5"),
    ("wl490", "SR_B1"),
    ("wl560", "SR_B2"),
    ("wl665", "SR_B3"),
    ("wl800", "SR_B4"),
    ("wl1500", "SR_B5"),
    ("wl2000", "SR_B7"),
];

const TM_ETM_L2_SPECTRAL: &[&str] = &["SR_B1", "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B7"];

const OLI_L2_COMMON: &[(&str, &str)] = &[
    ("blue", "SR_B2"),
    ("green", "SR_B3"),
    ("red", "SR_B4"),
    ("NIR", "SR_B5"),
    ("SWIR", "SR_B6"),
    ("wl490", "SR_B2"),
    ("wl560", "SR_B3"),
    ("wl665", "SR_B4"),
    ("wl800", "SR_B5"),
    ("wl1500", "SR_B6"),
    ("wl2000", "SR_B7"),
];

const OLI_L2_SPECTRAL: &[&str] = &[
    "SR_B1", "SR_B2", "SR_B3", "SR_B4", "SR_B5", "SR_B6", "SR_B7",
];

const fn modis(
    id: u16,
    sensor: &'static str,
    collection: &'static str,
    start: (i32, u32, u32),
) -> ProductSpec {
    ProductSpec {
        id,
        sensor,
        collection,
        common_bands: MODIS_500M_COMMON,
        spectral_bands: MODIS_500M_SPECTRAL,
        rough_scale_m: 500.0,
        start,
    }
}

const fn modis_250m(
    id: u16,
    sensor: &'static str,
    collection: &'static str,
    start: (i32, u32, u32),
) -> ProductSpec {
    ProductSpec {
        id,
        sensor,
        collection,
        common_bands: MODIS_250M_COMMON,
        spectral_bands: MODIS_250M_SPECTRAL,
        rough_scale_m: 250.0,
        start,
    }
}

const TERRA_START: (i32, u32, u32) = (2000, 2, 24);
const AQUA_START: (i32, u32, u32) = (2002, 7, 4);

pub(super) static PRODUCTS: &[ProductSpec] = &[
    modis(101, "MODIS/Terra", "MODIS/006/MOD09GA", TERRA_START),
    modis(102, "MODIS/Aqua", "MODIS/006/MYD09GA", AQUA_START),
    modis_250m(103, "MODIS/Terra", "MODIS/006/MOD09GQ", TERRA_START),
    modis_250m(104, "MODIS/Aqua", "MODIS/006/MYD09GQ", AQUA_START),
    modis(105, "MODIS/Terra", "MODIS/006/MOD09A1", TERRA_START),
    modis(106, "MODIS/Aqua", "MODIS/006/MYD09A1", AQUA_START),
    ProductSpec {
        id: 107,
        sensor: "MODIS/Terra+Aqua",
        collection: "MODIS/006/MCD43A4",
        common_bands: MODIS_NBAR_COMMON,
        spectral_bands: MODIS_NBAR_SPECTRAL,
        rough_scale_m: 500.0,
        start: (2000, 2, 16),
    },
    modis(111, "MODIS/Terra", "MODIS/061/MOD09GA", TERRA_START),
    modis(112, "MODIS/Aqua", "MODIS/061/MYD09GA", AQUA_START),
    modis_250m(113, "MODIS/Terra", "MODIS/061/MOD09GQ", TERRA_START),
    modis_250m(114, "MODIS/Aqua", "MODIS/061/MYD09GQ", AQUA_START),
    modis(115, "MODIS/Terra", "MODIS/061/MOD09A1", TERRA_START),
    modis(116, "MODIS/Aqua", "MODIS/061/MYD09A1", AQUA_START),
    ProductSpec {
        id: 117,
        sensor: "MODIS/Terra+Aqua",
        collection: "MODIS/061/MCD43A4",
        common_bands: MODIS_NBAR_COMMON,
        spectral_bands: MODIS_NBAR_SPECTRAL,
        rough_scale_m: 500.0,
        start: (2000, 2, 16),
    },
    ProductSpec {
        id: 151,
        sensor: "VIIRS/S-NPP",
        collection: "NOAA/VIIRS/001/VNP09GA",
        common_bands: VIIRS_COMMON,
        spectral_bands: VIIRS_SPECTRAL,
        rough_scale_m: 500.0,
        start: (2012, 1, 19),
    },
    ProductSpec {
        id: 152,
        sensor: "VIIRS/S-NPP",
        collection: "NOAA/VIIRS/001/VNP09H1",
        common_bands: VIIRS_COMMON,
        spectral_bands: VIIRS_SPECTRAL,
        rough_scale_m: 500.0,
        start: (2012, 1, 17),
    },
    ProductSpec {
        id: 201,
        sensor: "Sentinel-2/MSI",
        collection: "COPERNICUS/S2_SR",
        common_bands: S2_COMMON,
        spectral_bands: S2_SR_SPECTRAL,
        rough_scale_m: 20.0,
        start: (2017, 3, 28),
    },
    ProductSpec {
        id: 202,
        sensor: "Sentinel-2/MSI",
        collection: "COPERNICUS/S2",
        common_bands: S2_COMMON,
        spectral_bands: S2_TOA_SPECTRAL,
        rough_scale_m: 20.0,
        start: (2015, 6, 23),
    },
    ProductSpec {
        id: 301,
        sensor: "Landsat-5/TM",
        collection: "LANDSAT/LT05/C01/T1_SR",
        common_bands: TM_ETM_SR_COMMON,
        spectral_bands: TM_ETM_SR_SPECTRAL,
        rough_scale_m: 30.0,
        start: (1984, 3, 16),
    },
    ProductSpec {
        id: 302,
        sensor: "Landsat-7/ETM+",
        collection: "LANDSAT/LE07/C01/T1_SR",
        common_bands: TM_ETM_SR_COMMON,
        spectral_bands: TM_ETM_SR_SPECTRAL,
        rough_scale_m: 30.0,
        start: (1999, 5, 28),
    },
    ProductSpec {
        id: 303,
        sensor: "Landsat-8/OLI",
        collection: "LANDSAT/LC08/C01/T1_SR",
        common_bands: OLI_SR_COMMON,
        spectral_bands: OLI_SR_SPECTRAL,
        rough_scale_m: 30.0,
        start: (2013, 4, 11),
    },
    ProductSpec {
        id: 311,
        sensor: "Landsat-4/TM",
        collection: "LANDSAT/LT04/C02/T1_L2",
        common_bands: TM_ETM_L2_COMMON,
        spectral_bands: TM_ETM_L2_SPECTRAL,
        rough_scale_m: 30.0,
        start: (1982, 8, 22),
    },
    ProductSpec {
        id: 312,
        sensor: "Landsat-5/TM",
        collection: "LANDSAT/LT05/C02/T1_L2",
        common_bands: TM_ETM_L2_COMMON,
        spectral_bands: TM_ETM_L2_SPECTRAL,
        rough_scale_m: 30.0,
        start: (1984, 3, 16),
    },
    ProductSpec {
        id: 313,
        sensor: "Landsat-7/ETM+",
        collection: "LANDSAT/LE07/C02/T1_L2",
        common_bands: TM_ETM_L2_COMMON,
        spectral_bands: TM_ETM_L2_SPECTRAL,
        rough_scale_m: 30.0,
        start: (1999, 5, 28),
    },
    ProductSpec {
        id: 314,
        sensor: "Landsat-8/OLI",
        collection: "LANDSAT/LC08/C02/T1_L2",
        common_bands: OLI_L2_COMMON,
        spectral_bands: OLI_L2_SPECTRAL,
        rough_scale_m: 30.0,
        start: (2013, 3, 18),
    },
    ProductSpec {
        id: 315,
        sensor: "Landsat-9/OLI-2",
        collection: "LANDSAT/LC09/C02/T1_L2",
        common_bands: OLI_L2_COMMON,
        spectral_bands: OLI_L2_SPECTRAL,
        rough_scale_m: 30.0,
        start: (2021, 10, 31),
    },
    ProductSpec {
        id: 901,
        sensor: "GPM/IMERG",
        collection: "NASA/GPM_L3/IMERG_V06",
        common_bands: &[],
        spectral_bands: &["precipitationCal"],
        rough_scale_m: 11132.0,
        start: (2000, 6, 1),
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_start_date_is_valid() {
        for product in PRODUCTS {
            assert_ne!(
                product.start_date(),
                NaiveDate::MIN,
                "product {} has an invalid start date",
                product.id
            );
        }
    }

    #[test]
    fn test_product_ids_are_unique_and_three_digits() {
        let mut ids: Vec<u16> = PRODUCTS.iter().map(|p| p.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), PRODUCTS.len());
        assert!(ids.iter().all(|id| (100..1000).contains(id)));
    }

    #[test]
    fn test_common_bands_use_canonical_names() {
        for product in PRODUCTS {
            for (name, _) in product.common_bands {
                assert!(
                    CANONICAL_BANDS.contains(name),
                    "product {} uses non-canonical name {}",
                    product.id,
                    name
                );
            }
        }
    }

    #[test]
    fn test_reduced_bands_are_deduplicated() {
        let terra = PRODUCTS.iter().find(|p| p.id == 101).unwrap();
        let bands = terra.reduced_bands();
        assert_eq!(bands.len(), 7);
        assert_eq!(bands[0], "sur_refl_b03");
        assert!(bands.contains(&"sur_refl_b07"));
    }

    #[test]
    fn test_band_for_canonical_name() {
        let s2 = PRODUCTS.iter().find(|p| p.id == 201).unwrap();
        assert_eq!(s2.band_for("red"), Some("B4"));
        assert_eq!(s2.band_for("wl1200"), None);
        assert!(!PRODUCTS.iter().find(|p| p.id == 901).unwrap().has_canonical("red"));
    }
}
