//! Crow-fly to network distance conversion.
//!
//! Without a travel-time matrix the only geometry available is the straight
//! line between centroids.  Real trips are longer, and proportionally more so
//! for short hops, so the detour is modelled as a factor that decays with
//! distance:
//!
//! ```text
//! actual(d) = d · (1 + (f − 1) · e^(−k·d))
//! ```
//!
//! with detour factor `f` and decay rate `k` (per metre).  `actual(0) = 0`.
//! The derivative is `1 + (f − 1)·e^(−kd)·(1 − kd)`, whose minimum over
//! `d ≥ 0` is `1 − (f − 1)·e^(−2)`, so the curve is non-decreasing whenever
//! `f − 1 ≤ e²`; [`DetourModel::validate`] enforces that bound.

use crate::{SpatialError, SpatialResult};

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DetourModel {
    pub detour_factor: f64,
    /// Per metre.
    pub decay_rate: f64,
}

impl Default for DetourModel {
    fn default() -> Self {
        Self { detour_factor: 1.56, decay_rate: 0.0001 }
    }
}

impl DetourModel {
    pub fn new(detour_factor: f64, decay_rate: f64) -> Self {
        Self { detour_factor, decay_rate }
    }

    pub fn validate(&self) -> SpatialResult<()> {
        let f = self.detour_factor;
        if !f.is_finite() || f < 1.0 {
            return Err(SpatialError::InvalidValue(format!("detour_factor {f} must be >= 1")));
        }
        if f - 1.0 > std::f64::consts::E.powi(2) {
            return Err(SpatialError::InvalidValue(format!(
                "detour_factor {f} too large: actual distance would not be monotone"
            )));
        }
        let k = self.decay_rate;
        if !k.is_finite() || k < 0.0 {
            return Err(SpatialError::InvalidValue(format!("decay_rate {k} must be >= 0")));
        }
        Ok(())
    }

    /// Estimated network distance for a straight-line distance, both in metres.
    #[inline]
    pub fn actual_distance(&self, crow_fly_m: f64) -> f64 {
        let d = crow_fly_m.max(0.0);
        d * (1.0 + (self.detour_factor - 1.0) * (-self.decay_rate * d).exp())
    }
}
