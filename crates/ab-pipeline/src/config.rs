//! Run-wide configuration.

use ab_assign::{
    CategoryMap, FacilityConfig, FacilityFallback, FeasibilityConfig, SecondaryConfig, WorkConfig,
};
use ab_matching::MatchingConfig;
use ab_population::DiaryFilter;

use crate::{PipelineError, PipelineResult};

/// Everything a run needs besides its inputs.  Each stage's section is
/// validated by that stage's own `validate()`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PipelineConfig {
    /// Root of every per-unit RNG stream.
    pub seed:         u64,
    /// Applied to the diary sample before matching.
    pub diary_filter: DiaryFilter,
    pub matching:     MatchingConfig,
    pub feasibility:  FeasibilityConfig,
    pub work:         WorkConfig,
    pub secondary:    SecondaryConfig,
    pub facility:     FacilityConfig,
    pub categories:   CategoryMap,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed:         0,
            diary_filter: DiaryFilter::default(),
            matching:     MatchingConfig::default(),
            feasibility:  FeasibilityConfig::default(),
            work:         WorkConfig::default(),
            secondary:    SecondaryConfig::default(),
            facility:     FacilityConfig::default(),
            categories:   CategoryMap::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> PipelineResult<()> {
        self.matching.validate()?;
        self.feasibility.validate()?;
        self.work.validate()?;
        self.secondary.validate()?;

        let fallbacks = &self.facility.fallbacks;
        for (i, fb) in fallbacks.iter().enumerate() {
            if fallbacks[..i].contains(fb) {
                return Err(PipelineError::Config(format!("facility fallback {} listed twice", fb.as_str())));
            }
            if *fb == FacilityFallback::NeighbouringZones(0) {
                return Err(PipelineError::Config("neighbouring_zones fallback needs k > 0".into()));
            }
        }
        Ok(())
    }
}
