//! Request and result types exchanged with the compute service.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::geo::Region;

/// The image expression to evaluate: which product, which pixel-selection
/// and estimation algorithms, and for which dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSpec {
    pub product: u16,
    pub pixel_algo: u8,
    pub estimation_algo: u8,
    pub dates: Vec<NaiveDate>,
}

/// A spatial reduction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReduceRequest {
    pub expression: ExpressionSpec,
    pub region: Region,
    pub reducer: u8,
    /// Nominal pixel size in metres.
    pub scale_m: f64,
    /// Engine tiling factor; larger values trade speed for memory.
    pub tile_scale: u32,
    pub best_effort: bool,
}

/// A retrieved value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", n),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Sparse results of one reduction: date → name → value.
///
/// Absent entries mean "no value". Dates and names iterate in ascending
/// order. On decode, `null` entries are dropped and so are dates left
/// without any value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fragment {
    values: BTreeMap<NaiveDate, BTreeMap<String, Value>>,
}

impl<'de> Deserialize<'de> for Fragment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<NaiveDate, BTreeMap<String, Option<Value>>>::deserialize(deserializer)?;
        let values = raw
            .into_iter()
            .map(|(date, row)| {
                let row: BTreeMap<String, Value> = row
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, v)))
                    .collect();
                (date, row)
            })
            .filter(|(_, row)| !row.is_empty())
            .collect();
        Ok(Self { values })
    }
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value unless one is already present.
    pub fn insert(&mut self, date: NaiveDate, name: impl Into<String>, value: Value) {
        self.values
            .entry(date)
            .or_default()
            .entry(name.into())
            .or_insert(value);
    }

    pub fn get(&self, date: NaiveDate, name: &str) -> Option<&Value> {
        self.values.get(&date).and_then(|row| row.get(name))
    }

    /// Number of dates.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Union of the names used on any date, ascending.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .values
            .values()
            .flat_map(|row| row.keys().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Merges `other` into `self`; values already present win.
    pub fn merge(&mut self, other: Fragment) {
        for (date, row) in other.values {
            let target = self.values.entry(date).or_default();
            for (name, value) in row {
                target.entry(name).or_insert(value);
            }
        }
    }

    /// Appends `_<suffix>` to every key listed in `names`.
    pub fn suffix_names(&mut self, names: &[String], suffix: &str) {
        for row in self.values.values_mut() {
            let renamed: Vec<String> = row
                .keys()
                .filter(|k| names.contains(*k))
                .cloned()
                .collect();
            for key in renamed {
                if let Some(value) = row.remove(&key) {
                    row.insert(format!("{}_{}", key, suffix), value);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2021, 1, day).unwrap()
    }

    #[test]
    fn test_first_write_wins() {
        let mut fragment = Fragment::new();
        fragment.insert(d(1), "red", Value::Number(1.0));
        fragment.insert(d(1), "red", Value::Number(2.0));
        assert_eq!(fragment.get(d(1), "red"), Some(&Value::Number(1.0)));
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut a = Fragment::new();
        a.insert(d(1), "red", Value::Number(1.0));
        let mut b = Fragment::new();
        b.insert(d(1), "red", Value::Number(9.0));
        b.insert(d(1), "nir", Value::Number(3.0));
        b.insert(d(2), "red", Value::Number(4.0));

        a.merge(b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.get(d(1), "red"), Some(&Value::Number(1.0)));
        assert_eq!(a.get(d(1), "nir"), Some(&Value::Number(3.0)));
        assert_eq!(a.names(), vec!["nir", "red"]);
    }

    #[test]
    fn test_suffix_names_only_touches_listed_keys() {
        let mut fragment = Fragment::new();
        fragment.insert(d(1), "sur_refl_b01", Value::Number(0.1));
        fragment.insert(d(1), "img_time", Value::from("10:30"));
        fragment.suffix_names(&["sur_refl_b01".to_string()], "median");

        assert_eq!(fragment.names(), vec!["img_time", "sur_refl_b01_median"]);
    }

    #[test]
    fn test_fragment_json_shape() {
        let json = r#"{"2021-01-02":{"red":0.25,"img_time":"10:30"}}"#;
        let fragment: Fragment = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.get(d(2), "red"), Some(&Value::Number(0.25)));
        assert_eq!(fragment.get(d(2), "img_time"), Some(&Value::from("10:30")));
    }

    #[test]
    fn test_null_values_are_dropped() {
        let json = r#"{"2021-01-02":{"B4":0.5,"B8":null},"2021-01-03":{"B4":null}}"#;
        let fragment: Fragment = serde_json::from_str(json).unwrap();
        assert_eq!(fragment.get(d(2), "B4"), Some(&Value::Number(0.5)));
        assert_eq!(fragment.get(d(2), "B8"), None);
        assert_eq!(fragment.len(), 1);
        assert_eq!(fragment.names(), vec!["B4"]);
    }

    #[test]
    fn test_request_serializes() {
        let request = ReduceRequest {
            expression: ExpressionSpec {
                product: 201,
                pixel_algo: 9,
                estimation_algo: 0,
                dates: vec![d(1)],
            },
            region: Region::buffered_point(0.0, 0.0, 100.0).unwrap(),
            reducer: 1,
            scale_m: 20.0,
            tile_scale: 1,
            best_effort: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["expression"]["dates"][0], "2021-01-01");
        assert_eq!(json["region"]["type"], "buffered_point");
        assert_eq!(json["tile_scale"], 1);
    }
}
