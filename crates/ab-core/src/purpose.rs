//! Activity purposes and POI categories.

use std::fmt;
use std::str::FromStr;

use crate::CoreError;

/// Why a diary respondent travelled to a destination.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Purpose {
    Home,
    Work,
    Education,
    Shop,
    Medical,
    Visit,
    Escort,
    Other,
}

impl Purpose {
    /// Anchor activities placed before any discretionary ones.
    #[inline]
    pub fn is_primary(self) -> bool {
        matches!(self, Purpose::Home | Purpose::Work | Purpose::Education)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Purpose::Home      => "home",
            Purpose::Work      => "work",
            Purpose::Education => "education",
            Purpose::Shop      => "shop",
            Purpose::Medical   => "medical",
            Purpose::Visit     => "visit",
            Purpose::Escort    => "escort",
            Purpose::Other     => "other",
        }
    }
}

impl FromStr for Purpose {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home"      => Ok(Purpose::Home),
            "work"      => Ok(Purpose::Work),
            "education" => Ok(Purpose::Education),
            "shop"      => Ok(Purpose::Shop),
            "medical"   => Ok(Purpose::Medical),
            "visit"     => Ok(Purpose::Visit),
            "escort"    => Ok(Purpose::Escort),
            "other"     => Ok(Purpose::Other),
            other => Err(CoreError::Parse(format!("unknown purpose {other:?}"))),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Category ──────────────────────────────────────────────────────────────────

/// A POI category label such as `work`, `shop` or `education_school`.
///
/// Labels form a two-level hierarchy by prefix: the parent of
/// `education_school` is `education`.
#[derive(Clone, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category(String);

impl Category {
    pub fn new(label: impl Into<String>) -> Self {
        Category(label.into().trim().to_ascii_lowercase())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The text before the first `_`, or `None` for a top-level label.
    pub fn parent(&self) -> Option<Category> {
        self.0
            .split_once('_')
            .map(|(head, _)| Category(head.to_string()))
    }

    /// `true` if `self` is `other` or one of its children.
    pub fn is_within(&self, other: &Category) -> bool {
        self == other
            || self
                .0
                .strip_prefix(other.as_str())
                .is_some_and(|rest| rest.starts_with('_'))
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        Category::new(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
