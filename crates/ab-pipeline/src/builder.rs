//! Fluent builder for constructing a [`Pipeline`].

use log::info;

use ab_assign::AssignError;
use ab_population::{DiarySample, Population};
use ab_spatial::{OdMatrix, PoiIndex, TravelTimes, ZoneIndex};

use crate::{Pipeline, PipelineConfig, PipelineError, PipelineResult};

/// Fluent builder for [`Pipeline`].
///
/// # Required inputs
///
/// - [`PipelineConfig`]
/// - [`ZoneIndex`] (non-empty)
/// - [`Population`] and the unfiltered [`DiarySample`]
/// - a [`PoiIndex`] via [`.pois(..)`](Self::pois); `build` fails without one
///
/// # Optional inputs
///
/// | Method               | Default                                          |
/// |----------------------|--------------------------------------------------|
/// | `.travel_times(t)`   | none: feasibility uses estimated distances       |
/// | `.od_matrix(m)`      | empty matrix: every work origin draws uniformly  |
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = PipelineBuilder::new(config, zones, population, diary)
///     .pois(pois)
///     .od_matrix(od)
///     .build()?;
/// let output = pipeline.run(&mut LogObserver)?;
/// ```
pub struct PipelineBuilder {
    config:     PipelineConfig,
    zones:      ZoneIndex,
    population: Population,
    diary:      DiarySample,
    pois:       Option<PoiIndex>,
    travel:     Option<Box<dyn TravelTimes>>,
    od:         Option<OdMatrix>,
}

impl PipelineBuilder {
    pub fn new(
        config:     PipelineConfig,
        zones:      ZoneIndex,
        population: Population,
        diary:      DiarySample,
    ) -> Self {
        Self {
            config,
            zones,
            population,
            diary,
            pois:   None,
            travel: None,
            od:     None,
        }
    }

    pub fn pois(mut self, pois: PoiIndex) -> Self {
        self.pois = Some(pois);
        self
    }

    /// Any [`TravelTimes`] source, e.g. a [`TravelTimeMatrix`](ab_spatial::TravelTimeMatrix).
    pub fn travel_times(mut self, travel: impl TravelTimes + 'static) -> Self {
        self.travel = Some(Box::new(travel));
        self
    }

    /// Observed commuting flows.  Must be at the configured `commute_level`.
    pub fn od_matrix(mut self, od: OdMatrix) -> Self {
        self.od = Some(od);
        self
    }

    /// Validate inputs, filter the diary sample and return a ready-to-run
    /// [`Pipeline`].
    pub fn build(self) -> PipelineResult<Pipeline> {
        self.config.validate()?;

        if self.zones.is_empty() {
            return Err(PipelineError::NoZones);
        }
        let pois = self.pois.ok_or(AssignError::MissingPoiIndex)?;

        let level = self.config.work.commute_level;
        let od = match self.od {
            Some(od) if od.level() != level => {
                return Err(PipelineError::CommuteLevelMismatch { expected: level, got: od.level() });
            }
            Some(od) => od,
            None => OdMatrix::new(level),
        };

        let diary = self.diary.filtered(&self.config.diary_filter);
        info!(
            "pipeline: {} zones, {} facilities, {} households, {} diary households after filter",
            self.zones.len(),
            pois.len(),
            self.population.household_count(),
            diary.household_count(),
        );

        Ok(Pipeline {
            config:     self.config,
            zones:      self.zones,
            pois,
            travel:     self.travel,
            od,
            population: self.population,
            diary,
        })
    }
}
