//! Reducer catalog.

/// Static description of a spatial reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReducerSpec {
    /// One-digit id (last character of a processing code)
    pub id: u8,
    pub name: &'static str,
    /// Names of the statistics the reducer produces per band.
    ///
    /// Single-statistic reducers come back from the engine without a suffix
    /// and are renamed client-side; combined reducers are already suffixed.
    pub suffixes: &'static [&'static str],
}

impl ReducerSpec {
    /// Suffix appended client-side, if the reducer yields exactly one statistic.
    pub fn client_suffix(&self) -> Option<&'static str> {
        match self.suffixes {
            [single] => Some(single),
            _ => None,
        }
    }

    /// Whether the reducer performs a spatial reduction at all.
    pub fn reduces_bands(&self) -> bool {
        !self.suffixes.is_empty()
    }
}

pub(super) static REDUCERS: &[ReducerSpec] = &[
    ReducerSpec {
        id: 0,
        name: "none (image properties only)",
        suffixes: &[],
    },
    ReducerSpec {
        id: 1,
        name: "median",
        suffixes: &["median"],
    },
    ReducerSpec {
        id: 2,
        name: "mean",
        suffixes: &["mean"],
    },
    ReducerSpec {
        id: 3,
        name: "mean and standard deviation",
        suffixes: &["mean", "stdDev"],
    },
    ReducerSpec {
        id: 4,
        name: "minimum and maximum",
        suffixes: &["min", "max"],
    },
    ReducerSpec {
        id: 5,
        name: "count",
        suffixes: &["count"],
    },
    ReducerSpec {
        id: 6,
        name: "sum",
        suffixes: &["sum"],
    },
    ReducerSpec {
        id: 7,
        name: "median, mean, standard deviation, minimum and maximum",
        suffixes: &["median", "mean", "stdDev", "min", "max"],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_suffix_only_for_single_statistic() {
        assert_eq!(REDUCERS[1].client_suffix(), Some("median"));
        assert_eq!(REDUCERS[3].client_suffix(), None);
        assert_eq!(REDUCERS[0].client_suffix(), None);
        assert!(!REDUCERS[0].reduces_bands());
    }
}
