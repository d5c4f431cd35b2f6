//! Unit → native-trait lookup built from the static game dataset.
//!
//! The dataset is a large JSON document; any object carrying both an
//! `apiName` string and a non-empty `traits` array is treated as a unit
//! definition. The first definition seen for a unit wins.

use std::collections::HashMap;

use serde_json::Value;

/// Native traits per unit id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeTraitIndex {
    units: HashMap<String, Vec<String>>,
}

impl NativeTraitIndex {
    /// An index with no units; every lookup yields no native traits.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from explicit `(unit, traits)` pairs.
    pub fn from_entries<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
        T: IntoIterator<Item = String>,
    {
        let mut units = HashMap::new();
        for (unit, traits) in entries {
            units
                .entry(unit)
                .or_insert_with(|| traits.into_iter().collect());
        }
        Self { units }
    }

    /// Walk a dataset document and collect every unit definition.
    pub fn from_dataset(dataset: &Value) -> Self {
        let mut units = HashMap::new();
        collect_units(dataset, &mut units);
        Self { units }
    }

    /// Native traits for `unit`; empty when the unit is unknown.
    pub fn native_traits(&self, unit: &str) -> &[String] {
        self.units.get(unit).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

fn collect_units(value: &Value, units: &mut HashMap<String, Vec<String>>) {
    match value {
        Value::Object(map) => {
            if let (Some(Value::String(api_name)), Some(Value::Array(traits))) =
                (map.get("apiName"), map.get("traits"))
            {
                let traits: Vec<String> = traits
                    .iter()
                    .filter_map(|t| t.as_str().map(str::to_string))
                    .collect();
                if !traits.is_empty() {
                    units.entry(api_name.clone()).or_insert(traits);
                }
            }
            for child in map.values() {
                collect_units(child, units);
            }
        }
        Value::Array(items) => {
            for child in items {
                collect_units(child, units);
            }
        }
        _ => {}
    }
}
