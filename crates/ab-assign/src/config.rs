//! Assignment configuration.
//!
//! Plain structs with `Default` values and a `validate()` per stage.  Loading
//! them from files is left to the caller (enable the `serde` feature).

use std::collections::BTreeMap;

use ab_core::{Category, Purpose};
use ab_population::{AgeBand, EducationTiers};
use ab_spatial::{CommuteLevel, DetourModel};

use crate::{AssignError, AssignResult, FacilityFallback, ZoneFallback};

fn non_negative(name: &str, v: f64) -> AssignResult<()> {
    if v.is_finite() && v >= 0.0 {
        Ok(())
    } else {
        Err(AssignError::Config(format!("{name} must be a non-negative number, got {v}")))
    }
}

// ── Feasibility ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeasibilityConfig {
    /// Proportional tolerance around the reported time/distance for work.
    pub tolerance_work: f64,
    /// Proportional tolerance around the reported time/distance for
    /// education.
    pub tolerance_edu: f64,
    pub detour: DetourModel,
    /// Applied in order when a feasible set comes back empty.
    pub zone_fallbacks: Vec<ZoneFallback>,
}

impl Default for FeasibilityConfig {
    fn default() -> Self {
        Self {
            tolerance_work: 0.3,
            tolerance_edu:  0.3,
            detour:         DetourModel::default(),
            zone_fallbacks: vec![
                ZoneFallback::ClosestToReported,
                ZoneFallback::RelaxCategory,
                ZoneFallback::NearestWithPoi,
            ],
        }
    }
}

impl FeasibilityConfig {
    pub fn validate(&self) -> AssignResult<()> {
        non_negative("tolerance_work", self.tolerance_work)?;
        non_negative("tolerance_edu", self.tolerance_edu)?;
        self.detour.validate()?;
        Ok(())
    }
}

// ── Work ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WorkConfig {
    pub commute_level: CommuteLevel,
    /// Compare shares of each origin's total instead of raw counts.
    pub use_percentages: bool,
    pub weight_max_dev: f64,
    pub weight_total_dev: f64,
    /// Candidate destinations kept per person, nearest first.
    pub max_zones: usize,
    /// Origins needing more integer variables than this are assigned by the
    /// iterative weighted draw instead of the solver.
    pub max_problem_size: usize,
    /// Wall-clock budget of one origin's solve, in seconds.
    pub solve_time_limit_s: f64,
}

impl Default for WorkConfig {
    fn default() -> Self {
        Self {
            commute_level:      CommuteLevel::Zone,
            use_percentages:    false,
            weight_max_dev:     0.2,
            weight_total_dev:   0.8,
            max_zones:          8,
            max_problem_size:   5_000,
            solve_time_limit_s: 5.0,
        }
    }
}

impl WorkConfig {
    pub fn validate(&self) -> AssignResult<()> {
        non_negative("weight_max_dev", self.weight_max_dev)?;
        non_negative("weight_total_dev", self.weight_total_dev)?;
        non_negative("solve_time_limit_s", self.solve_time_limit_s)?;
        let sum = self.weight_max_dev + self.weight_total_dev;
        if (sum - 1.0).abs() > 1e-6 {
            return Err(AssignError::Config(format!(
                "weight_max_dev + weight_total_dev must be 1, got {sum}"
            )));
        }
        if self.max_zones == 0 {
            return Err(AssignError::Config("max_zones must be at least 1".into()));
        }
        if self.max_problem_size == 0 {
            return Err(AssignError::Config("max_problem_size must be at least 1".into()));
        }
        Ok(())
    }
}

// ── Secondary ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SecondaryConfig {
    /// Exponent on distance in the visit weight `floor_area / distance^p`.
    pub visit_probability_power: f64,
    /// Distances below this (metres) are clamped, so the anchor's own zone
    /// does not get an unbounded weight.
    pub min_distance_m: f64,
    /// Extra fraction of the reported travel time a detour may use.
    pub time_slack: f64,
}

impl Default for SecondaryConfig {
    fn default() -> Self {
        Self { visit_probability_power: 2.0, min_distance_m: 250.0, time_slack: 0.25 }
    }
}

impl SecondaryConfig {
    pub fn validate(&self) -> AssignResult<()> {
        non_negative("visit_probability_power", self.visit_probability_power)?;
        non_negative("time_slack", self.time_slack)?;
        if !(self.min_distance_m.is_finite() && self.min_distance_m > 0.0) {
            return Err(AssignError::Config(format!(
                "min_distance_m must be positive, got {}",
                self.min_distance_m
            )));
        }
        Ok(())
    }
}

// ── Facility ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FacilityMode {
    /// Probability proportional to floor area (uniform when no area is known).
    #[default]
    FloorArea,
    Uniform,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FacilityConfig {
    pub mode: FacilityMode,
    pub fallbacks: Vec<FacilityFallback>,
}

impl Default for FacilityConfig {
    fn default() -> Self {
        Self {
            mode:      FacilityMode::FloorArea,
            fallbacks: vec![
                FacilityFallback::FallbackCategory,
                FacilityFallback::NeighbouringZones(5),
                FacilityFallback::AnyInZone,
            ],
        }
    }
}

// ── CategoryMap ───────────────────────────────────────────────────────────────

/// Which POI category each activity purpose needs.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CategoryMap {
    pub work: Category,
    pub education: EducationTiers,
    /// Categories for discretionary purposes.  Purposes missing here are
    /// left unassigned.
    pub discretionary: BTreeMap<Purpose, Category>,
}

impl Default for CategoryMap {
    fn default() -> Self {
        let discretionary = [
            (Purpose::Shop, "shop"),
            (Purpose::Medical, "medical"),
            (Purpose::Visit, "visit"),
            (Purpose::Escort, "escort"),
            (Purpose::Other, "other"),
        ]
        .into_iter()
        .map(|(p, c)| (p, Category::new(c)))
        .collect();

        Self {
            work: Category::new("work"),
            education: EducationTiers::default(),
            discretionary,
        }
    }
}

impl CategoryMap {
    /// Category for an activity of `purpose` by someone in `band`.  `None`
    /// for home and unmapped purposes.
    pub fn category_for(&self, purpose: Purpose, band: AgeBand) -> Option<&Category> {
        match purpose {
            Purpose::Home      => None,
            Purpose::Work      => Some(&self.work),
            Purpose::Education => Some(self.education.category_for(band)),
            p                  => self.discretionary.get(&p),
        }
    }
}
