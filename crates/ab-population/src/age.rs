//! Age bands and education tiers.
//!
//! Individuals are matched on the travel survey's published age bands, not
//! on exact age:
//!
//! | Band | Ages    |
//! |------|---------|
//! | 0    | 0 – 4   |
//! | 1    | 5 – 10  |
//! | 2    | 11 – 16 |
//! | 3    | 17 – 20 |
//! | 4    | 21 – 29 |
//! | 5    | 30 – 39 |
//! | 6    | 40 – 49 |
//! | 7    | 50 – 59 |
//! | 8    | 60 +    |

use ab_core::Category;

/// Lower bound (inclusive) of each band.
const BAND_STARTS: [u8; 9] = [0, 5, 11, 17, 21, 30, 40, 50, 60];

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgeBand(u8);

impl AgeBand {
    pub const COUNT: u8 = BAND_STARTS.len() as u8;

    pub fn from_age(age: u8) -> Self {
        let idx = BAND_STARTS.partition_point(|&start| start <= age);
        AgeBand((idx - 1) as u8)
    }

    /// Band by index; `None` past the last band.
    pub fn from_index(i: u8) -> Option<Self> {
        (i < Self::COUNT).then_some(AgeBand(i))
    }

    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    /// Number of bands between `self` and `other`.
    #[inline]
    pub fn distance(self, other: AgeBand) -> u8 {
        self.0.abs_diff(other.0)
    }

    pub fn label(self) -> String {
        let i = self.0 as usize;
        match BAND_STARTS.get(i + 1) {
            Some(next) => format!("{}-{}", BAND_STARTS[i], next - 1),
            None => format!("{}+", BAND_STARTS[i]),
        }
    }
}

// ── EducationTiers ────────────────────────────────────────────────────────────

/// Which education POI category serves which age band.
///
/// Bands below `school_from` use `kindergarten`; bands below
/// `university_from` use `school`; everyone older uses `university`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EducationTiers {
    pub kindergarten: Category,
    pub school: Category,
    pub university: Category,
    pub school_from: AgeBand,
    pub university_from: AgeBand,
}

impl Default for EducationTiers {
    fn default() -> Self {
        Self {
            kindergarten:    Category::new("education_kg"),
            school:          Category::new("education_school"),
            university:      Category::new("education_university"),
            school_from:     AgeBand(1),
            university_from: AgeBand(3),
        }
    }
}

impl EducationTiers {
    pub fn category_for(&self, band: AgeBand) -> &Category {
        if band < self.school_from {
            &self.kindergarten
        } else if band < self.university_from {
            &self.school
        } else {
            &self.university
        }
    }
}
