//! Unit tests for ab-core primitives.

#[cfg(test)]
mod ids {
    use crate::{PersonId, ZoneId};

    #[test]
    fn index_roundtrip() {
        let id = PersonId(42);
        assert_eq!(id.index(), 42);
        assert_eq!(PersonId::try_from(42usize).unwrap(), id);
    }

    #[test]
    fn invalid_sentinel_is_default() {
        assert_eq!(ZoneId::INVALID.0, u32::MAX);
        assert_eq!(ZoneId::default(), ZoneId::INVALID);
    }

    #[test]
    fn display() {
        assert_eq!(ZoneId(7).to_string(), "ZoneId(7)");
    }
}

#[cfg(test)]
mod geo {
    use crate::GeoPoint;

    #[test]
    fn zero_distance() {
        let p = GeoPoint::new(53.800, -1.549);
        assert!(p.distance_m(p) < 0.01);
    }

    #[test]
    fn one_degree_of_latitude() {
        let a = GeoPoint::new(53.0, -1.5);
        let b = GeoPoint::new(54.0, -1.5);
        let d = a.distance_m(b);
        assert!((d - 111_195.0).abs() < 500.0, "got {d}");
    }
}

#[cfg(test)]
mod time {
    use crate::{DayType, TimeOfDay};

    #[test]
    fn bucket_boundaries() {
        assert_eq!(TimeOfDay::from_minutes(0), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_minutes(299), TimeOfDay::Night);
        assert_eq!(TimeOfDay::from_minutes(300), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_minutes(719), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_minutes(720), TimeOfDay::Afternoon);
        assert_eq!(TimeOfDay::from_minutes(1080), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_minutes(1439), TimeOfDay::Evening);
    }

    #[test]
    fn minutes_wrap_past_midnight() {
        assert_eq!(TimeOfDay::from_minutes(1440 + 400), TimeOfDay::Morning);
    }

    #[test]
    fn day_type_from_code() {
        assert_eq!(DayType::from_day_of_week(1).unwrap(), DayType::Weekday);
        assert_eq!(DayType::from_day_of_week(5).unwrap(), DayType::Weekday);
        assert_eq!(DayType::from_day_of_week(6).unwrap(), DayType::Weekend);
        assert_eq!(DayType::from_day_of_week(7).unwrap(), DayType::Weekend);
        assert!(DayType::from_day_of_week(0).is_err());
        assert!(DayType::from_day_of_week(8).is_err());
    }

    #[test]
    fn parse_roundtrip_labels() {
        assert_eq!(TimeOfDay::parse("Morning").unwrap(), TimeOfDay::Morning);
        assert_eq!(DayType::parse("weekend").unwrap(), DayType::Weekend);
        assert!(TimeOfDay::parse("noon").is_err());
    }
}

#[cfg(test)]
mod rng {
    use crate::{Stream, UnitRng};

    #[test]
    fn deterministic_same_seed() {
        let mut r1 = UnitRng::new(12345, Stream::Matching, 0);
        let mut r2 = UnitRng::new(12345, Stream::Matching, 0);
        for _ in 0..100 {
            let a: f64 = r1.random();
            let b: f64 = r2.random();
            assert_eq!(a, b);
        }
    }

    #[test]
    fn different_units_differ() {
        let mut r0 = UnitRng::new(1, Stream::Facility, 0);
        let mut r1 = UnitRng::new(1, Stream::Facility, 1);
        let a: u64 = r0.random();
        let b: u64 = r1.random();
        assert_ne!(a, b, "seeds for adjacent units should diverge");
    }

    #[test]
    fn streams_are_independent() {
        let mut a = UnitRng::new(9, Stream::Secondary, 3);
        let mut b = UnitRng::new(9, Stream::Facility, 3);
        let x: u64 = a.random();
        let y: u64 = b.random();
        assert_ne!(x, y);
    }

    #[test]
    fn weighted_index_rejects_degenerate_weights() {
        let mut rng = UnitRng::new(0, Stream::Facility, 0);
        assert_eq!(rng.choose_weighted_index(&[]), None);
        assert_eq!(rng.choose_weighted_index(&[0.0, 0.0]), None);
        assert_eq!(rng.choose_weighted_index(&[1.0, f64::NAN]), None);
        assert_eq!(rng.choose_weighted_index(&[0.0, 2.0]), Some(1));
    }

    #[test]
    fn choose_empty_is_none() {
        let mut rng = UnitRng::new(0, Stream::Matching, 0);
        let empty: [u8; 0] = [];
        assert!(rng.choose(&empty).is_none());
    }
}

#[cfg(test)]
mod transport {
    use crate::TravelMode;

    #[test]
    fn passenger_modes_use_car_times() {
        assert_eq!(TravelMode::CarPassenger.matrix_mode(), TravelMode::Car);
        assert_eq!(TravelMode::Taxi.matrix_mode(), TravelMode::Car);
        assert_eq!(TravelMode::Walk.matrix_mode(), TravelMode::Walk);
    }

    #[test]
    fn speed_conversions() {
        // walk: 5 km/h → 12 minutes per km
        assert!((TravelMode::Walk.minutes_for_distance(1000.0) - 12.0).abs() < 1e-9);
        // car: 20 km/h → 30 minutes covers 10 km
        assert!((TravelMode::Car.distance_for_minutes(30.0) - 10_000.0).abs() < 1e-9);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("car_passenger".parse::<TravelMode>().unwrap(), TravelMode::CarPassenger);
        assert_eq!(TravelMode::Pt.to_string(), "pt");
        assert!("hovercraft".parse::<TravelMode>().is_err());
    }
}

#[cfg(test)]
mod purpose {
    use crate::{Category, Purpose};

    #[test]
    fn primary_purposes() {
        assert!(Purpose::Home.is_primary());
        assert!(Purpose::Work.is_primary());
        assert!(Purpose::Education.is_primary());
        assert!(!Purpose::Shop.is_primary());
    }

    #[test]
    fn category_parent() {
        assert_eq!(Category::new("education_school").parent(), Some(Category::new("education")));
        assert_eq!(Category::new("work").parent(), None);
    }

    #[test]
    fn category_within() {
        let school = Category::new("education_school");
        assert!(school.is_within(&Category::new("education")));
        assert!(school.is_within(&school));
        assert!(!Category::new("educationx").is_within(&Category::new("education")));
    }
}
