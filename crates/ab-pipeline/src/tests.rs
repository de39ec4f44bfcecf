//! Unit tests for ab-pipeline.

#[cfg(test)]
mod fixtures {
    use ab_core::{
        Category, DiaryHouseholdId, DiaryPersonId, GeoPoint, HouseholdId, PersonId, Purpose,
        TravelMode, ZoneId,
    };
    use ab_matching::MatchingConfig;
    use ab_population::{Attributes, DiaryPerson, DiarySample, DiaryTrip, Person, Population, Sex};
    use ab_spatial::{PoiIndex, ZoneIndex, ZoneIndexBuilder};

    use crate::PipelineConfig;

    pub const H: ZoneId = ZoneId(0);
    pub const A: ZoneId = ZoneId(1);
    pub const B: ZoneId = ZoneId(2);
    pub const S: ZoneId = ZoneId(3);

    const M_PER_DEG: f64 = 111_194.93;

    fn north_of_h(metres: f64) -> GeoPoint {
        GeoPoint::new(53.80 + metres / M_PER_DEG, -1.55)
    }

    fn attrs(adults: &str) -> Attributes {
        [("adults".to_string(), adults.to_string())].into_iter().collect()
    }

    /// H home, A 2000 m north, B 2100 m south, S 1112 m north.
    pub fn zones() -> ZoneIndex {
        let mut b = ZoneIndexBuilder::new();
        b.add_zone("H", north_of_h(0.0), Some("P1")).unwrap();
        b.add_zone("A", north_of_h(2000.0), Some("P1")).unwrap();
        b.add_zone("B", north_of_h(-2100.0), Some("P2")).unwrap();
        b.add_zone("S", GeoPoint::new(53.81, -1.55), Some("P1")).unwrap();
        b.build()
    }

    /// Workplaces at A and B, one shop at S.
    pub fn pois(zones: &ZoneIndex) -> PoiIndex {
        let mut p = PoiIndex::new();
        for z in [A, B] {
            p.insert(z, zones.centroid(z).unwrap(), Some(500.0), vec![Category::new("work")]).unwrap();
        }
        p.insert(S, zones.centroid(S).unwrap(), Some(150.0), vec![Category::new("shop")]).unwrap();
        p
    }

    pub fn trip(seq: u16, from: Purpose, to: Purpose, start: u32, minutes: f64, metres: f64) -> DiaryTrip {
        DiaryTrip {
            person:              DiaryPersonId(500),
            seq,
            origin_purpose:      from,
            destination_purpose: to,
            mode:                TravelMode::Car,
            day_of_week:         2,
            start_minute:        start,
            travel_minutes:      Some(minutes),
            distance_m:          Some(metres),
        }
    }

    /// One single-adult respondent: home → work → shop → home.
    pub fn diary() -> DiarySample {
        let mut s = DiarySample::new();
        s.add_household(DiaryHouseholdId(100), 2019, "r", attrs("1")).unwrap();
        s.add_person(DiaryPerson {
            id:        DiaryPersonId(500),
            household: DiaryHouseholdId(100),
            age:       35,
            sex:       Sex::Male,
        })
        .unwrap();
        s.add_trip(trip(0, Purpose::Home, Purpose::Work, 480, 10.0, 3000.0)).unwrap();
        s.add_trip(trip(1, Purpose::Work, Purpose::Shop, 1020, 6.0, 1500.0)).unwrap();
        s.add_trip(trip(2, Purpose::Shop, Purpose::Home, 1080, 5.0, 1112.0)).unwrap();
        s
    }

    /// Synthetic single-adult households at H, `n` of them, plus one
    /// three-adult household with no diary counterpart when `orphan`.
    pub fn population(n: u32, orphan: bool) -> Population {
        let mut pop = Population::new();
        for i in 0..n {
            pop.add_household(HouseholdId(i), H, attrs("1")).unwrap();
            pop.add_person(Person { id: PersonId(i), household: HouseholdId(i), age: 33, sex: Sex::Male })
                .unwrap();
        }
        if orphan {
            pop.add_household(HouseholdId(n), H, attrs("3")).unwrap();
            pop.add_person(Person { id: PersonId(n), household: HouseholdId(n), age: 50, sex: Sex::Female })
                .unwrap();
        }
        pop
    }

    pub fn config() -> PipelineConfig {
        PipelineConfig {
            seed: 11,
            matching: MatchingConfig {
                required: vec!["adults".into()],
                optional: Vec::new(),
                ..MatchingConfig::default()
            },
            ..PipelineConfig::default()
        }
    }
}

#[cfg(test)]
mod config {
    use ab_assign::{FacilityConfig, FacilityFallback};

    use crate::{PipelineConfig, PipelineError};

    #[test]
    fn default_validates() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn duplicate_facility_fallback_rejected() {
        let cfg = PipelineConfig {
            facility: FacilityConfig {
                fallbacks: vec![FacilityFallback::AnyInZone, FacilityFallback::AnyInZone],
                ..FacilityConfig::default()
            },
            ..PipelineConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn stage_errors_propagate() {
        let mut cfg = PipelineConfig::default();
        cfg.matching.n_matches = Some(0);
        assert!(matches!(cfg.validate(), Err(PipelineError::Matching(_))));
    }
}

#[cfg(test)]
mod builder {
    use ab_assign::AssignError;
    use ab_spatial::{CommuteLevel, OdMatrix, ZoneIndexBuilder};

    use super::fixtures::{config, diary, pois, population, zones};
    use crate::{PipelineBuilder, PipelineError};

    #[test]
    fn missing_pois_is_fatal() {
        let err = PipelineBuilder::new(config(), zones(), population(1, false), diary())
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::Assign(AssignError::MissingPoiIndex)));
    }

    #[test]
    fn empty_zone_index_is_fatal() {
        let z = zones();
        let err = PipelineBuilder::new(config(), ZoneIndexBuilder::new().build(), population(1, false), diary())
            .pois(pois(&z))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, PipelineError::NoZones));
    }

    #[test]
    fn od_level_must_match_config() {
        let z = zones();
        let p = pois(&z);
        let err = PipelineBuilder::new(config(), z, population(1, false), diary())
            .pois(p)
            .od_matrix(OdMatrix::new(CommuteLevel::Aggregate))
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            PipelineError::CommuteLevelMismatch { expected: CommuteLevel::Zone, got: CommuteLevel::Aggregate }
        ));
    }

    #[test]
    fn diary_is_filtered_on_build() {
        let z = zones();
        let p = pois(&z);
        let mut cfg = config();
        cfg.diary_filter.years = vec![2020];
        let pipeline = PipelineBuilder::new(cfg, z, population(1, false), diary()).pois(p).build().unwrap();
        assert_eq!(pipeline.diary.household_count(), 0);
    }
}

#[cfg(test)]
mod run {
    use ab_assign::AssignMethod;
    use ab_core::{ActivityId, Purpose};
    use ab_spatial::OdMatrix;

    use ab_population::DiaryTrip;

    use super::fixtures::{config, diary, pois, population, trip, zones, A, B, H, S};
    use crate::{NoopObserver, Pipeline, PipelineBuilder, PipelineObserver, RunOutput, Stage};

    fn pipeline(households: u32, orphan: bool) -> Pipeline {
        let z = zones();
        let p = pois(&z);
        let mut od = OdMatrix::new(ab_spatial::CommuteLevel::Zone);
        od.add("H", "A", 3.0).unwrap();
        od.add("H", "B", 1.0).unwrap();
        PipelineBuilder::new(config(), z, population(households, orphan), diary())
            .pois(p)
            .od_matrix(od)
            .build()
            .unwrap()
    }

    #[test]
    fn every_activity_is_placed() {
        let out = pipeline(1, false).run(&mut NoopObserver).unwrap();
        assert_eq!(out.matches.persons.len(), 1);
        assert_eq!(out.assignments.len(), 3);

        let ids: Vec<ActivityId> = out.assignments.iter().map(|a| a.activity).collect();
        assert_eq!(ids, vec![ActivityId(0), ActivityId(1), ActivityId(2)]);

        let work = &out.assignments[0];
        assert_eq!(work.purpose, Purpose::Work);
        assert!(matches!(work.zone, Some(z) if z == A || z == B));
        assert!(work.facility.is_some());

        let shop = &out.assignments[1];
        assert_eq!(shop.zone, Some(S));
        assert_eq!(shop.zone_code.as_deref(), Some("S"));
        assert!(shop.facility.is_some());

        let home = &out.assignments[2];
        assert_eq!(home.zone, Some(H));
        assert_eq!(home.method, AssignMethod::Home);
        assert!(home.facility.is_none());
        assert_eq!(home.location, pipeline(1, false).zones.centroid(H));
    }

    #[test]
    fn chain_covers_first_travel_day_only() {
        let z = zones();
        let p = pois(&z);
        let mut d = diary();
        // A later day: home → shop → home.
        let later = [(0, Purpose::Home, Purpose::Shop, 600), (1, Purpose::Shop, Purpose::Home, 660)];
        for (seq, from, to, start) in later {
            d.add_trip(DiaryTrip { day_of_week: 4, ..trip(seq, from, to, start, 5.0, 1112.0) }).unwrap();
        }
        let pipeline = PipelineBuilder::new(config(), z, population(1, false), d).pois(p).build().unwrap();
        let out = pipeline.run(&mut NoopObserver).unwrap();

        let purposes: Vec<Purpose> = out.assignments.iter().map(|a| a.purpose).collect();
        assert_eq!(purposes, vec![Purpose::Work, Purpose::Shop, Purpose::Home]);
    }

    #[test]
    fn identical_output_for_same_seed() {
        let p = pipeline(20, false);
        let a = p.run(&mut NoopObserver).unwrap();
        let b = p.run(&mut NoopObserver).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn work_fit_covers_each_origin() {
        let out = pipeline(20, false).run(&mut NoopObserver).unwrap();
        assert_eq!(out.work_fit.origins.len(), 1);
        assert_eq!(out.work_fit.origins[0].persons, 20);
    }

    #[test]
    fn unmatched_household_reported_not_fatal() {
        let out = pipeline(2, true).run(&mut NoopObserver).unwrap();
        assert_eq!(out.matches.persons.len(), 2);
        assert_eq!(out.diagnostics.summary().get("unmatched_household"), Some(&1));
        let (kind, unit, _) = out.diagnostics.records().next().unwrap();
        assert_eq!(kind, "unmatched_household");
        assert_eq!(unit, "HouseholdId(2)");
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<Stage>,
        ended:   Vec<(Stage, usize)>,
        runs:    usize,
    }

    impl PipelineObserver for Recorder {
        fn on_stage_start(&mut self, stage: Stage) {
            self.started.push(stage);
        }

        fn on_stage_end(&mut self, stage: Stage, units: usize) {
            self.ended.push((stage, units));
        }

        fn on_run_end(&mut self, _output: &RunOutput) {
            self.runs += 1;
        }
    }

    #[test]
    fn observer_sees_every_stage_in_order() {
        let mut rec = Recorder::default();
        pipeline(3, false).run(&mut rec).unwrap();
        assert_eq!(rec.started, Stage::ALL.to_vec());
        assert_eq!(rec.ended[0], (Stage::Matching, 3));
        assert_eq!(rec.ended[4], (Stage::Facility, 9));
        assert_eq!(rec.runs, 1);
    }
}
