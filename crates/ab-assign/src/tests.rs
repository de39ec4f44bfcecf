//! Unit tests for ab-assign.

#[cfg(test)]
mod fixtures {
    use ab_core::{
        ActivityId, Category, DayType, DiaryPersonId, GeoPoint, HouseholdId, PersonId, Purpose,
        TimeOfDay, TravelMode, ZoneId,
    };
    use ab_population::{Activity, ActivityChain};
    use ab_spatial::{PoiIndex, ZoneIndex, ZoneIndexBuilder};

    /// Metres per degree of latitude on the haversine sphere.
    const M_PER_DEG: f64 = 111_194.93;

    pub const H: ZoneId = ZoneId(0);
    pub const A: ZoneId = ZoneId(1);
    pub const B: ZoneId = ZoneId(2);
    pub const F: ZoneId = ZoneId(3);
    pub const S1: ZoneId = ZoneId(4);
    pub const S2: ZoneId = ZoneId(5);

    fn north_of_h(metres: f64) -> GeoPoint {
        GeoPoint::new(53.80 + metres / M_PER_DEG, -1.55)
    }

    /// Zones on one meridian:
    /// - H home, A 2000 m north, B 2100 m south, F 10 km north,
    /// - S1 1112 m north, S2 about 22 km north.
    pub fn zones() -> ZoneIndex {
        let mut b = ZoneIndexBuilder::new();
        b.add_zone("H", north_of_h(0.0), Some("P1")).unwrap();
        b.add_zone("A", north_of_h(2000.0), Some("P1")).unwrap();
        b.add_zone("B", north_of_h(-2100.0), Some("P2")).unwrap();
        b.add_zone("F", north_of_h(10_000.0), Some("P3")).unwrap();
        b.add_zone("S1", GeoPoint::new(53.81, -1.55), Some("P1")).unwrap();
        b.add_zone("S2", GeoPoint::new(54.00, -1.55), Some("P3")).unwrap();
        b.build()
    }

    /// Work and school at A and B, shops at S1 (100 and 300 m²) and S2.
    pub fn pois(zones: &ZoneIndex) -> PoiIndex {
        let mut p = PoiIndex::new();
        for z in [A, B] {
            let at = zones.centroid(z).unwrap();
            p.insert(z, at, Some(500.0), vec![Category::new("work")]).unwrap();
            p.insert(z, at, Some(800.0), vec![Category::new("education_school")]).unwrap();
        }
        let s1 = zones.centroid(S1).unwrap();
        p.insert(S1, s1, Some(100.0), vec![Category::new("shop")]).unwrap();
        p.insert(S1, s1, Some(300.0), vec![Category::new("shop")]).unwrap();
        p.insert(S2, zones.centroid(S2).unwrap(), Some(200.0), vec![Category::new("shop")]).unwrap();
        p
    }

    pub fn activity(id: u32, seq: u16, purpose: Purpose, minutes: Option<f64>, metres: Option<f64>) -> Activity {
        Activity {
            id:             ActivityId(id),
            person:         PersonId(0),
            seq,
            purpose,
            origin_purpose: Purpose::Home,
            mode:           TravelMode::Car,
            day:            DayType::Weekday,
            time:           TimeOfDay::Morning,
            start_minute:   480,
            travel_minutes: minutes,
            distance_m:     metres,
        }
    }

    pub fn chain(person: u32, activities: Vec<Activity>) -> ActivityChain {
        let activities = activities
            .into_iter()
            .map(|a| Activity { person: PersonId(person), ..a })
            .collect();
        ActivityChain {
            person: PersonId(person),
            household: HouseholdId(person),
            home_zone: H,
            diary_person: DiaryPersonId(0),
            activities,
        }
    }
}

#[cfg(test)]
mod config {
    use ab_core::Purpose;
    use ab_population::AgeBand;

    use crate::{CategoryMap, FeasibilityConfig, SecondaryConfig, WorkConfig};

    #[test]
    fn defaults_validate() {
        assert!(FeasibilityConfig::default().validate().is_ok());
        assert!(WorkConfig::default().validate().is_ok());
        assert!(SecondaryConfig::default().validate().is_ok());
    }

    #[test]
    fn work_weights_must_sum_to_one() {
        let cfg = WorkConfig { weight_max_dev: 0.5, weight_total_dev: 0.6, ..WorkConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = WorkConfig { max_zones: 0, ..WorkConfig::default() };
        assert!(cfg.validate().is_err());
        let cfg = WorkConfig { solve_time_limit_s: -1.0, ..WorkConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_tolerance_rejected() {
        let cfg = FeasibilityConfig { tolerance_edu: -0.1, ..FeasibilityConfig::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn categories_by_purpose() {
        let map = CategoryMap::default();
        assert!(map.category_for(Purpose::Home, AgeBand::from_age(30)).is_none());
        assert_eq!(map.category_for(Purpose::Work, AgeBand::from_age(30)).unwrap().as_str(), "work");
        assert_eq!(
            map.category_for(Purpose::Education, AgeBand::from_age(8)).unwrap().as_str(),
            "education_school"
        );
        assert_eq!(map.category_for(Purpose::Shop, AgeBand::from_age(8)).unwrap().as_str(), "shop");
    }
}

#[cfg(test)]
mod feasibility {
    use ab_core::{Category, Purpose, TravelMode};
    use ab_spatial::{DetourModel, TravelTimeMatrix, TravelTimes};

    use super::fixtures::{activity, pois, zones, A, B, F, H};
    use crate::{AssignError, FeasibilitySource, ZoneFeasibility};

    #[test]
    fn missing_poi_index_is_fatal() {
        let zones = zones();
        assert!(matches!(
            ZoneFeasibility::new(&zones, None, None, DetourModel::default()),
            Err(AssignError::MissingPoiIndex)
        ));
    }

    #[test]
    fn distance_band_and_poi_filter() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let act = activity(1, 0, Purpose::Work, None, Some(3000.0));

        let set = feas.feasible(H, &act, &Category::new("work"), 0.3);
        assert_eq!(set.source, FeasibilitySource::Distance);
        assert!(set.contains(A));
        assert!(set.contains(B));
        // F is out of range, H has no work POI.
        assert!(!set.contains(F));
        assert!(!set.contains(H));
    }

    #[test]
    fn travel_time_band() {
        let zones = zones();
        let pois = pois(&zones);
        let mut tt = TravelTimeMatrix::new();
        tt.insert(H, A, TravelMode::Car, None, None, 20.0).unwrap();
        tt.insert(H, B, TravelMode::Car, None, None, 40.0).unwrap();
        tt.insert(H, F, TravelMode::Car, None, None, 21.0).unwrap();
        let feas = ZoneFeasibility::new(
            &zones,
            Some(&pois),
            Some(&tt as &dyn TravelTimes),
            DetourModel::default(),
        )
        .unwrap();
        let act = activity(1, 0, Purpose::Work, Some(22.0), Some(3000.0));

        let set = feas.feasible(H, &act, &Category::new("work"), 0.3);
        assert_eq!(set.source, FeasibilitySource::TravelTime);
        assert_eq!(set.candidates.iter().map(|c| c.zone).collect::<Vec<_>>(), vec![A]);
        assert_eq!(set.candidates[0].travel_minutes, Some(20.0));
    }

    #[test]
    fn unreported_trip_has_no_feasible_zone() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let act = activity(1, 0, Purpose::Work, None, None);
        let set = feas.feasible(H, &act, &Category::new("work"), 0.3);
        assert_eq!(set.source, FeasibilitySource::Unreported);
        assert!(set.is_empty());
    }
}

#[cfg(test)]
mod policy {
    use ab_core::{Category, Purpose};
    use ab_spatial::DetourModel;

    use super::fixtures::{activity, pois, zones, A, B, H};
    use crate::policy::resolve_empty;
    use crate::{ZoneFallback, ZoneFeasibility};

    #[test]
    fn fallbacks_in_configured_order() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        // Far beyond every zone: the tolerance band is empty.
        let act = activity(1, 0, Purpose::Work, None, Some(50_000.0));
        let work = Category::new("work");
        assert!(feas.feasible(H, &act, &work, 0.3).is_empty());

        let (c, fb) = resolve_empty(&feas, H, &act, &work, 0.3, &[ZoneFallback::NearestWithPoi]).unwrap();
        assert_eq!(fb, ZoneFallback::NearestWithPoi);
        assert_eq!(c.iter().map(|c| c.zone).collect::<Vec<_>>(), vec![A]);

        let (c, fb) = resolve_empty(
            &feas,
            H,
            &act,
            &work,
            0.3,
            &[ZoneFallback::RelaxCategory, ZoneFallback::ClosestToReported],
        )
        .unwrap();
        assert_eq!(fb, ZoneFallback::ClosestToReported);
        // B is slightly further than A, so closer to 50 km.
        assert_eq!(c[0].zone, B);
    }

    #[test]
    fn relax_category_uses_siblings() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let act = activity(1, 0, Purpose::Education, None, Some(2917.0));
        // Nobody offers university; school shares the parent.
        let uni = Category::new("education_university");
        assert!(feas.feasible(H, &act, &uni, 0.3).is_empty());
        let (c, fb) = resolve_empty(&feas, H, &act, &uni, 0.3, &[ZoneFallback::RelaxCategory]).unwrap();
        assert_eq!(fb, ZoneFallback::RelaxCategory);
        assert_eq!(c.iter().map(|c| c.zone).collect::<Vec<_>>(), vec![A, B]);
    }

    #[test]
    fn every_policy_failing_gives_none() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let act = activity(1, 0, Purpose::Other, None, Some(1000.0));
        let none = Category::new("cinema");
        assert!(resolve_empty(
            &feas,
            H,
            &act,
            &none,
            0.3,
            &[ZoneFallback::ClosestToReported, ZoneFallback::NearestWithPoi],
        )
        .is_none());
    }
}

#[cfg(test)]
mod education {
    use ab_core::Purpose;
    use ab_population::AgeBand;
    use ab_spatial::DetourModel;

    use super::fixtures::{activity, chain, pois, zones, A, H};
    use crate::{
        assign_education, AssignDiagnostic, AssignMethod, CategoryMap, FeasibilityConfig,
        ZoneFeasibility,
    };

    #[test]
    fn closest_to_reported_distance() {
        let zones = zones();
        let pois = pois(&zones);
        let detour = DetourModel::new(1.56, 0.0001);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, detour).unwrap();
        let c = chain(1, vec![
            activity(10, 0, Purpose::Education, None, Some(2917.0)),
            activity(11, 1, Purpose::Home, None, Some(2917.0)),
            activity(12, 2, Purpose::Education, None, Some(2917.0)),
        ]);

        let out = assign_education(
            &feas,
            &c,
            AgeBand::from_age(8),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
        );
        assert!(out.diagnostics.is_empty());
        assert_eq!(out.assignments.len(), 2);
        assert_eq!(out.assignments[0].zone, Some(A));
        assert_eq!(out.assignments[0].method, AssignMethod::Feasible);
        assert_eq!(out.assignments[1].zone, Some(A));
        assert_eq!(out.assignments[1].method, AssignMethod::Repeat);

        // 2000 m crow-fly ≈ 2916.98 m estimated, inside the tolerance band.
        let d = feas.estimated_distance_m(H, A).unwrap();
        assert!((d - 2000.0 * (1.0 + 0.56 * (-0.2f64).exp())).abs() < 1.0, "got {d}");
        assert!((d - 2916.0).abs() <= 0.3 * 2916.0);
    }

    #[test]
    fn empty_set_recorded_and_resolved() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let c = chain(1, vec![activity(10, 0, Purpose::Education, None, Some(40_000.0))]);

        let out = assign_education(
            &feas,
            &c,
            AgeBand::from_age(8),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
        );
        assert_eq!(out.assignments.len(), 1);
        assert!(out.assignments[0].zone.is_some());
        assert!(matches!(out.assignments[0].method, AssignMethod::Fallback(_)));
        assert!(matches!(
            out.diagnostics[0],
            AssignDiagnostic::EmptyFeasibleSet { fallback: Some(_), .. }
        ));
    }

    #[test]
    fn no_education_no_output() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let c = chain(1, vec![activity(10, 0, Purpose::Shop, None, Some(1000.0))]);
        let out = assign_education(
            &feas,
            &c,
            AgeBand::from_age(8),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
        );
        assert!(out.assignments.is_empty());
    }
}

#[cfg(test)]
mod work {
    use ab_core::{ActivityId, PersonId, Purpose, ZoneId};
    use ab_population::ActivityChain;
    use ab_spatial::{CommuteLevel, DetourModel, OdMatrix};

    use super::fixtures::{activity, chain, pois, zones, A, B, H};
    use crate::work::{solve_origin, OriginProblem, WorkDemand};
    use crate::{
        assign_work, AssignDiagnostic, AssignError, AssignMethod, Candidate, CategoryMap,
        FeasibilityConfig, WorkConfig, ZoneFeasibility,
    };

    fn commuters(n: u32, metres: f64) -> Vec<ActivityChain> {
        (0..n)
            .map(|p| chain(p, vec![activity(100 + p, 0, Purpose::Work, None, Some(metres))]))
            .collect()
    }

    fn observed_six_four() -> OdMatrix {
        let mut od = OdMatrix::new(CommuteLevel::Zone);
        od.add("H", "A", 6.0).unwrap();
        od.add("H", "B", 4.0).unwrap();
        od
    }

    fn split(assignments: &[crate::ZoneAssignment]) -> (usize, usize) {
        let a = assignments.iter().filter(|x| x.zone == Some(A)).count();
        let b = assignments.iter().filter(|x| x.zone == Some(B)).count();
        (a, b)
    }

    fn even_weights() -> WorkConfig {
        WorkConfig { weight_max_dev: 0.5, weight_total_dev: 0.5, ..WorkConfig::default() }
    }

    #[test]
    fn optimised_split_follows_observed_flows() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &even_weights(),
            42,
        )
        .unwrap();
        assert_eq!(out.assignments.len(), 10);
        assert!(out.assignments.iter().all(|a| a.method == AssignMethod::Optimised));
        assert_eq!(split(&out.assignments), (6, 4));
        assert!(out.diagnostics.is_empty());
        assert!(out.fit.overall().unwrap() < 1e-9);
    }

    #[test]
    fn single_zone_takes_everyone() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);
        let cfg = WorkConfig { max_zones: 1, ..even_weights() };

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &cfg,
            42,
        )
        .unwrap();
        // A is the nearer candidate.
        assert_eq!(split(&out.assignments), (10, 0));
    }

    #[test]
    fn iterative_draw_for_oversized_origins() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);
        let cfg = WorkConfig { max_problem_size: 1, ..even_weights() };

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &cfg,
            7,
        )
        .unwrap();
        assert!(out.assignments.iter().all(|a| a.method == AssignMethod::Iterative));
        // Every draw consumes one unit of a positive remaining flow.
        assert_eq!(split(&out.assignments), (6, 4));
        assert!(matches!(
            out.diagnostics[0],
            AssignDiagnostic::IterativeFallback { persons: 10, variables: 2, .. }
        ));
    }

    #[test]
    fn no_observed_flows_draws_uniformly() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);
        let od = OdMatrix::new(CommuteLevel::Zone);

        let out = assign_work(
            &feas,
            &chains,
            &od,
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &WorkConfig::default(),
            1,
        )
        .unwrap();
        assert_eq!(out.assignments.len(), 10);
        assert!(out.assignments.iter().all(|a| a.method == AssignMethod::Uniform));
        let (a, b) = split(&out.assignments);
        assert_eq!(a + b, 10);
        assert_eq!(out.fit.origins[0].rmse, None);
    }

    #[test]
    fn unreachable_person_relaxed_outside_problem() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let mut chains = commuters(4, 3000.0);
        chains.push(chain(9, vec![activity(900, 0, Purpose::Work, None, Some(80_000.0))]));

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &even_weights(),
            3,
        )
        .unwrap();
        assert_eq!(out.assignments.len(), 5);
        let relaxed = out.assignments.iter().find(|a| a.activity.0 == 900).unwrap();
        assert!(matches!(relaxed.method, AssignMethod::Fallback(_)));
        assert!(out.diagnostics.iter().any(|d| matches!(d, AssignDiagnostic::RelaxedToNearest { .. })));
        // The origin problem itself still covers the other four.
        assert_eq!(out.fit.origins[0].persons, 4);
    }

    #[test]
    fn later_work_activities_repeat() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = vec![chain(0, vec![
            activity(1, 0, Purpose::Work, None, Some(3000.0)),
            activity(2, 1, Purpose::Shop, None, Some(500.0)),
            activity(3, 2, Purpose::Work, None, Some(500.0)),
        ])];

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &even_weights(),
            3,
        )
        .unwrap();
        assert_eq!(out.assignments.len(), 2);
        assert_eq!(out.assignments[1].method, AssignMethod::Repeat);
        assert_eq!(out.assignments[0].zone, out.assignments[1].zone);
    }

    #[test]
    fn same_seed_same_result() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);
        let od = OdMatrix::new(CommuteLevel::Zone);
        let run = |seed| {
            assign_work(
                &feas,
                &chains,
                &od,
                &CategoryMap::default(),
                &FeasibilityConfig::default(),
                &WorkConfig::default(),
                seed,
            )
            .unwrap()
            .assignments
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn solve_without_solution_in_time_takes_nearest() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let chains = commuters(10, 3000.0);
        // A zero budget stops the solver before it finds any integer solution.
        let cfg = WorkConfig { solve_time_limit_s: 0.0, ..even_weights() };

        let out = assign_work(
            &feas,
            &chains,
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &cfg,
            42,
        )
        .unwrap();
        assert_eq!(out.assignments.len(), 10);
        assert!(out.assignments.iter().all(|a| a.method == AssignMethod::Nearest));
        assert_eq!(split(&out.assignments), (10, 0));
        assert_eq!(out.fit.origins[0].persons, 10);
        assert_eq!(out.diagnostics.len(), 1);
        match &out.diagnostics[0] {
            AssignDiagnostic::InfeasibleSubproblem { origin, persons, reason } => {
                assert_eq!(origin, "H");
                assert_eq!(*persons, 10);
                assert!(reason.contains("no integer solution"), "{reason}");
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }

    #[test]
    fn invalid_config_rejected_on_entry() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let cfg = WorkConfig { max_zones: 0, ..even_weights() };

        let err = assign_work(
            &feas,
            &commuters(2, 3000.0),
            &observed_six_four(),
            &CategoryMap::default(),
            &FeasibilityConfig::default(),
            &cfg,
            42,
        )
        .unwrap_err();
        assert!(matches!(err, AssignError::Config(_)));
    }

    fn demand(person: u32, zones: &[ZoneId]) -> WorkDemand {
        WorkDemand {
            person:     PersonId(person),
            activity:   ActivityId(person),
            home_zone:  H,
            candidates: zones
                .iter()
                .map(|&zone| Candidate {
                    zone,
                    distance_m:     1000.0,
                    travel_minutes: None,
                    floor_area:     500.0,
                    deviation:      0.0,
                })
                .collect(),
        }
    }

    #[test]
    fn origin_with_unusable_lists_does_not_panic() {
        let zones = zones();
        let problem = OriginProblem {
            origin:  "H".into(),
            demands: vec![demand(0, &[]), demand(1, &[A, B])],
        };
        // Unvalidated: zero zones kept per person behaves like one.
        let cfg = WorkConfig { max_zones: 0, ..even_weights() };

        for od in [observed_six_four(), OdMatrix::new(CommuteLevel::Zone)] {
            let out = solve_origin(&problem, &zones, &od, &cfg, 9);
            assert_eq!(out.assignments.len(), 2);
            assert_eq!(out.assignments[0].zone, None);
            assert_eq!(out.assignments[0].method, AssignMethod::Unassigned);
            assert_eq!(out.assignments[1].zone, Some(A));
            assert!(out
                .diagnostics
                .iter()
                .any(|d| matches!(d, AssignDiagnostic::Unassigned { activity, .. } if activity.0 == 0)));
        }
    }
}

#[cfg(test)]
mod flow_problem {
    use std::time::{Duration, Instant};

    use crate::flow_problem::{repair_total, FlowError, FlowGroup, FlowProblem};

    fn problem(groups: Vec<FlowGroup>, observed: Vec<f64>, use_percentages: bool) -> FlowProblem {
        FlowProblem {
            groups,
            observed,
            use_percentages,
            weight_max_dev: 0.2,
            weight_total_dev: 0.8,
            time_limit: Duration::from_secs(5),
        }
    }

    #[test]
    fn grouped_flows_sum_to_group_size() {
        let problem = problem(
            vec![
                FlowGroup { size: 3, cells: vec![0, 1] },
                FlowGroup { size: 2, cells: vec![1] },
            ],
            vec![2.0, 3.0],
            false,
        );
        assert_eq!(problem.variable_count(), 3);
        let solution = problem.solve().unwrap();
        assert!(solution.optimal);
        let flows = solution.flows;
        assert_eq!(flows[0].iter().sum::<u32>(), 3);
        assert_eq!(flows[1], vec![2]);
        // Cell 1 already has 2 from the second group.
        assert_eq!(flows[0], vec![2, 1]);
    }

    #[test]
    fn percentages_scale_by_persons() {
        let problem = FlowProblem {
            weight_max_dev: 0.0,
            weight_total_dev: 1.0,
            ..problem(vec![FlowGroup { size: 4, cells: vec![0, 1] }], vec![30.0, 10.0], true)
        };
        assert_eq!(problem.solve().unwrap().flows, vec![vec![3, 1]]);
    }

    #[test]
    fn zero_budget_is_time_limit_error() {
        let problem = FlowProblem {
            time_limit: Duration::ZERO,
            ..problem(vec![FlowGroup { size: 3, cells: vec![0, 1] }], vec![2.0, 1.0], false)
        };
        assert_eq!(problem.solve(), Err(FlowError::TimeLimit(Duration::ZERO)));
    }

    /// Seven groups of eight overlapping cells out of forty, compared as
    /// shares: branch-and-bound on this runs for minutes without a limit.
    #[test]
    fn overlapping_share_problem_stops_at_limit() {
        let groups: Vec<FlowGroup> = (0..7)
            .map(|g| FlowGroup {
                size:  13 + g as u32,
                cells: (0..8).map(|k| (g * 5 + k * 3) % 40).collect(),
            })
            .collect();
        let observed: Vec<f64> = (0..40).map(|c| (7 + c * 13 % 17) as f64).collect();
        let problem = FlowProblem {
            time_limit: Duration::from_millis(200),
            ..problem(groups, observed, true)
        };
        assert_eq!(problem.variable_count(), 56);

        let started = Instant::now();
        let result = problem.solve();
        assert!(started.elapsed() < Duration::from_secs(20), "took {:?}", started.elapsed());
        match result {
            Ok(solution) => {
                for (g, flows) in problem.groups.iter().zip(&solution.flows) {
                    assert_eq!(flows.iter().sum::<u32>(), g.size);
                }
            }
            Err(e) => assert!(matches!(e, FlowError::TimeLimit(_)), "{e}"),
        }
    }

    #[test]
    fn repair_rounding_drift() {
        let mut up = vec![3, 1, 0];
        repair_total(&mut up, 5);
        assert_eq!(up.iter().sum::<u32>(), 5);
        assert_eq!(up, vec![4, 1, 0]);

        let mut down = vec![3, 3];
        repair_total(&mut down, 4);
        assert_eq!(down.iter().sum::<u32>(), 4);
    }
}

#[cfg(test)]
mod fit {
    use std::collections::BTreeMap;

    use crate::{OriginFit, WorkFit};

    #[test]
    fn share_rmse() {
        let assigned: BTreeMap<String, usize> = [("A".to_string(), 10)].into_iter().collect();
        let observed: BTreeMap<String, f64> =
            [("A".to_string(), 6.0), ("B".to_string(), 4.0)].into_iter().collect();
        let fit = OriginFit::compute("H", &assigned, &observed);
        // Shares (1, 0) vs (0.6, 0.4).
        assert!((fit.rmse.unwrap() - 0.4).abs() < 1e-12);

        let matching: BTreeMap<String, usize> =
            observed.iter().map(|(k, v)| (k.clone(), *v as usize)).collect();
        let perfect = OriginFit::compute("G", &matching, &observed);
        assert_eq!(perfect.rmse, Some(0.0));

        let all = WorkFit { origins: vec![fit, perfect] };
        assert!((all.overall().unwrap() - 0.2).abs() < 1e-12);
    }
}

#[cfg(test)]
mod secondary {
    use ab_core::Purpose;
    use ab_population::AgeBand;
    use ab_spatial::DetourModel;

    use super::fixtures::{activity, chain, pois, zones, A, S1};
    use crate::{
        assign_secondary, AssignDiagnostic, AssignMethod, CategoryMap, SecondaryConfig,
        ZoneAssignment, ZoneFeasibility, ZoneMap,
    };

    fn anchored(work_minutes: f64) -> (ab_population::ActivityChain, ZoneMap) {
        let c = chain(1, vec![
            activity(1, 0, Purpose::Work, Some(10.0), Some(3000.0)),
            activity(2, 1, Purpose::Shop, Some(work_minutes), None),
            activity(3, 2, Purpose::Home, Some(work_minutes), None),
        ]);
        let mut anchors = ZoneMap::new();
        anchors.insert(c.activities[0].id, ZoneAssignment::new(c.activities[0].id, A, AssignMethod::Optimised));
        (c, anchors)
    }

    #[test]
    fn reachable_zone_between_anchors() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let (c, anchors) = anchored(10.0);

        let out = assign_secondary(
            &feas,
            &c,
            &anchors,
            AgeBand::from_age(35),
            &CategoryMap::default(),
            &SecondaryConfig::default(),
            11,
        );
        assert_eq!(out.assignments.len(), 1);
        // S2 is over an hour away by car.
        assert_eq!(out.assignments[0].zone, Some(S1));
        assert_eq!(out.assignments[0].method, AssignMethod::Gravity);
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn budget_dropped_when_nothing_fits() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let (c, anchors) = anchored(1.0);

        let out = assign_secondary(
            &feas,
            &c,
            &anchors,
            AgeBand::from_age(35),
            &CategoryMap::default(),
            &SecondaryConfig::default(),
            11,
        );
        assert_eq!(out.assignments[0].method, AssignMethod::GravityUnbounded);
        assert!(out.assignments[0].zone.is_some());
        assert_eq!(out.diagnostics, vec![AssignDiagnostic::SecondaryBudgetRelaxed { activity: c.activities[1].id }]);
    }

    #[test]
    fn unmapped_purpose_unassigned() {
        let zones = zones();
        let pois = pois(&zones);
        let feas = ZoneFeasibility::new(&zones, Some(&pois), None, DetourModel::default()).unwrap();
        let (c, anchors) = anchored(10.0);
        let mut categories = CategoryMap::default();
        categories.discretionary.clear();

        let out = assign_secondary(
            &feas,
            &c,
            &anchors,
            AgeBand::from_age(35),
            &categories,
            &SecondaryConfig::default(),
            11,
        );
        assert_eq!(out.assignments[0].zone, None);
        assert!(matches!(out.diagnostics[0], AssignDiagnostic::Unassigned { .. }));
    }
}

#[cfg(test)]
mod facility {
    use ab_core::{ActivityId, Category, FacilityId};

    use super::fixtures::{pois, zones, A, H, S1};
    use crate::{AssignDiagnostic, FacilityConfig, FacilityFallback, FacilityMode, FacilitySampler};

    #[test]
    fn floor_area_proportional() {
        let zones = zones();
        let pois = pois(&zones);
        let config = FacilityConfig::default();
        let sampler = FacilitySampler::new(&zones, &pois, &config);
        let shop = Category::new("shop");
        let small = pois.facilities_in(S1, &shop).next().unwrap().id;

        let n = 4000;
        let small_hits = (0..n)
            .filter(|&i| sampler.sample(ActivityId(i), S1, &shop, 9).facility == Some(small))
            .count();
        let share = small_hits as f64 / n as f64;
        assert!((share - 0.25).abs() < 0.03, "small facility share {share}");
    }

    #[test]
    fn uniform_mode_ignores_area() {
        let zones = zones();
        let pois = pois(&zones);
        let config = FacilityConfig { mode: FacilityMode::Uniform, ..FacilityConfig::default() };
        let sampler = FacilitySampler::new(&zones, &pois, &config);
        let shop = Category::new("shop");
        let small = pois.facilities_in(S1, &shop).next().unwrap().id;

        let n = 4000;
        let small_hits = (0..n)
            .filter(|&i| sampler.sample(ActivityId(i), S1, &shop, 9).facility == Some(small))
            .count();
        let share = small_hits as f64 / n as f64;
        assert!((share - 0.5).abs() < 0.03, "small facility share {share}");
    }

    #[test]
    fn neighbouring_zone_fallback() {
        let zones = zones();
        let pois = pois(&zones);
        let config = FacilityConfig::default();
        let sampler = FacilitySampler::new(&zones, &pois, &config);

        // H has no facilities at all; its five neighbours include A and B.
        let out = sampler.sample(ActivityId(1), H, &Category::new("work"), 9);
        assert_eq!(out.fallback, Some(FacilityFallback::NeighbouringZones(5)));
        assert!(matches!(out.diagnostic, Some(AssignDiagnostic::FacilityFallback { .. })));

        // The two nearest are S1 and A; only A has work.
        let near = FacilityConfig {
            fallbacks: vec![FacilityFallback::NeighbouringZones(2)],
            ..FacilityConfig::default()
        };
        let sampler = FacilitySampler::new(&zones, &pois, &near);
        let out = sampler.sample(ActivityId(1), H, &Category::new("work"), 9);
        let f = pois.facility(out.facility.unwrap()).unwrap();
        assert_eq!(f.zone, A);
    }

    #[test]
    fn any_in_zone_then_nothing() {
        let zones = zones();
        let pois = pois(&zones);
        let any = FacilityConfig { fallbacks: vec![FacilityFallback::AnyInZone], ..FacilityConfig::default() };
        let sampler = FacilitySampler::new(&zones, &pois, &any);
        let out = sampler.sample(ActivityId(1), S1, &Category::new("work"), 9);
        assert_eq!(out.fallback, Some(FacilityFallback::AnyInZone));
        assert!(matches!(out.facility, Some(FacilityId(_))));

        let none = FacilityConfig { fallbacks: Vec::new(), ..FacilityConfig::default() };
        let sampler = FacilitySampler::new(&zones, &pois, &none);
        let out = sampler.sample(ActivityId(1), S1, &Category::new("work"), 9);
        assert_eq!(out.facility, None);
        assert!(matches!(out.diagnostic, Some(AssignDiagnostic::NoFacility { .. })));
    }

    #[test]
    fn deterministic_per_activity() {
        let zones = zones();
        let pois = pois(&zones);
        let config = FacilityConfig::default();
        let sampler = FacilitySampler::new(&zones, &pois, &config);
        let shop = Category::new("shop");
        let a = sampler.sample(ActivityId(77), S1, &shop, 3);
        let b = sampler.sample(ActivityId(77), S1, &shop, 3);
        assert_eq!(a, b);
    }
}
