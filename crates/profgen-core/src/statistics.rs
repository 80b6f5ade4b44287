//! Annual hydro generation reference used to normalise modelled inflow.

use std::collections::BTreeMap;

/// Country × year table of annual generation in MWh. Missing entries stand
/// for years without a published value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnualGeneration {
    values: BTreeMap<String, BTreeMap<i32, f64>>,
}

impl AnnualGeneration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a country column, even if every year turns out missing.
    pub fn add_country(&mut self, country: &str) {
        self.values.entry(country.to_string()).or_default();
    }

    pub fn insert(&mut self, country: &str, year: i32, value: f64) {
        self.values
            .entry(country.to_string())
            .or_default()
            .insert(year, value);
    }

    pub fn get(&self, country: &str, year: i32) -> Option<f64> {
        self.values.get(country)?.get(&year).copied()
    }

    pub fn has_country(&self, country: &str) -> bool {
        self.values.contains_key(country)
    }

    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Multiply every value by `factor`.
    pub fn scaled(mut self, factor: f64) -> Self {
        for years in self.values.values_mut() {
            for v in years.values_mut() {
                *v *= factor;
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_keeps_empty_countries() {
        let mut g = AnnualGeneration::new();
        g.insert("NG", 2013, 100.0);
        g.add_country("TG");

        let g = g.scaled(2.0);

        assert_eq!(g.get("NG", 2013), Some(200.0));
        assert!(g.has_country("TG"));
        assert_eq!(g.get("TG", 2013), None);
        assert_eq!(g.countries().collect::<Vec<_>>(), vec!["NG", "TG"]);
    }
}
