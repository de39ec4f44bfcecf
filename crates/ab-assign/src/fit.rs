//! How closely assigned commuting shares follow the observed ones.

use std::collections::BTreeMap;

/// Share RMSE for one origin.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OriginFit {
    pub origin: String,
    pub persons: usize,
    /// `None` when the origin has no observed flows.
    pub rmse: Option<f64>,
}

impl OriginFit {
    /// Compare assigned counts per destination area with observed counts.
    /// Both are normalised to shares; cells present on either side count.
    pub fn compute(
        origin: &str,
        assigned: &BTreeMap<String, usize>,
        observed: &BTreeMap<String, f64>,
    ) -> Self {
        let persons: usize = assigned.values().sum();
        let observed_total: f64 = observed.values().sum();
        if observed_total <= 0.0 || persons == 0 {
            return OriginFit { origin: origin.to_string(), persons, rmse: None };
        }

        let mut cells: Vec<&String> = assigned.keys().chain(observed.keys()).collect();
        cells.sort();
        cells.dedup();

        let sq: f64 = cells
            .iter()
            .map(|c| {
                let a = assigned.get(*c).copied().unwrap_or(0) as f64 / persons as f64;
                let o = observed.get(*c).copied().unwrap_or(0.0) / observed_total;
                (a - o).powi(2)
            })
            .sum();
        OriginFit {
            origin: origin.to_string(),
            persons,
            rmse: Some((sq / cells.len() as f64).sqrt()),
        }
    }
}

/// Fit across all origins.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkFit {
    /// Ascending by origin.
    pub origins: Vec<OriginFit>,
}

impl WorkFit {
    /// Person-weighted mean RMSE over origins that have observed flows.
    pub fn overall(&self) -> Option<f64> {
        let (sum, n) = self
            .origins
            .iter()
            .filter_map(|o| o.rmse.map(|r| (r * o.persons as f64, o.persons)))
            .fold((0.0, 0usize), |(s, n), (r, p)| (s + r, n + p));
        (n > 0).then(|| sum / n as f64)
    }
}
