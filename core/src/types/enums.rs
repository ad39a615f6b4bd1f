use crate::error::OverxrptError;
use std::fmt;
use std::str::FromStr;

/// Body region a dosimeter badge reports on
///
/// Decides which dose column of the report is read and which category
/// headers of the levels sheet are searched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum DoseCategory {
    WholeBody,
    Extremity,
    Lens,
}

impl DoseCategory {
    /// Report column holding the dose for this category
    pub fn dose_column(&self) -> &'static str {
        match self {
            DoseCategory::WholeBody => "Whole Body",
            DoseCategory::Extremity => "Total Extremity",
            DoseCategory::Lens => "Lens",
        }
    }

    /// Category header terms shared by all badges in this category
    ///
    /// Ordered from most to least specific.
    pub fn header_terms(&self) -> &'static [&'static str] {
        match self {
            DoseCategory::WholeBody => &["DDE", "WHOLE BODY"],
            DoseCategory::Extremity => &["EXTREMITY"],
            DoseCategory::Lens => &["LDE", "LENS", "EYES"],
        }
    }
}

/// Dosimeter badge position, as written in the report's "Use" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum BadgeType {
    Collar,
    OtherWholeBody,
    Chest,
    Waist,
    LeftFinger,
    RightFinger,
    Lens,
}

impl BadgeType {
    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            BadgeType::Collar => "collar",
            BadgeType::OtherWholeBody => "other whole body",
            BadgeType::Chest => "chest",
            BadgeType::Waist => "waist",
            BadgeType::LeftFinger => "left finger",
            BadgeType::RightFinger => "right finger",
            BadgeType::Lens => "lens",
        }
    }

    /// Body region this badge measures
    pub fn category(&self) -> DoseCategory {
        match self {
            BadgeType::Collar | BadgeType::OtherWholeBody | BadgeType::Chest | BadgeType::Waist => {
                DoseCategory::WholeBody
            }
            BadgeType::LeftFinger | BadgeType::RightFinger => DoseCategory::Extremity,
            BadgeType::Lens => DoseCategory::Lens,
        }
    }

    /// Category header terms to try, most specific first
    ///
    /// Whole body badges may have a column of their own (e.g. "Collar"),
    /// so the badge name is tried before the shared whole body terms.
    ///
    /// # Example
    ///
    /// ```
    /// use overxrpt_core::BadgeType;
    ///
    /// assert_eq!(BadgeType::Chest.header_hierarchy(), vec!["chest", "DDE", "WHOLE BODY"]);
    /// assert_eq!(BadgeType::LeftFinger.header_hierarchy(), vec!["EXTREMITY"]);
    /// ```
    pub fn header_hierarchy(&self) -> Vec<&'static str> {
        let category = self.category();
        let mut terms = Vec::with_capacity(category.header_terms().len() + 1);
        if category == DoseCategory::WholeBody {
            terms.push(self.simple_name());
        }
        terms.extend_from_slice(category.header_terms());
        terms
    }
}

impl FromStr for BadgeType {
    type Err = OverxrptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "collar" => Ok(BadgeType::Collar),
            "other whole body" => Ok(BadgeType::OtherWholeBody),
            "chest" => Ok(BadgeType::Chest),
            "waist" => Ok(BadgeType::Waist),
            "left finger" => Ok(BadgeType::LeftFinger),
            "right finger" => Ok(BadgeType::RightFinger),
            "lens" => Ok(BadgeType::Lens),
            _ => Err(OverxrptError::UnsupportedBadge(s.to_string())),
        }
    }
}

impl fmt::Display for BadgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Wear period of a report row, derived from the "Frequency" column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum PeriodType {
    Monthly,
    Quarterly,
    YearToDate,
}

impl PeriodType {
    /// Parses the report frequency code (`1MO`, `3MO`, empty for year to date)
    pub fn from_frequency(freq: &str) -> crate::Result<Self> {
        match freq.trim().to_uppercase().as_str() {
            "1MO" => Ok(PeriodType::Monthly),
            "3MO" => Ok(PeriodType::Quarterly),
            "" => Ok(PeriodType::YearToDate),
            other => Err(OverxrptError::InvalidValue(format!(
                "unknown report frequency '{}'",
                other
            ))),
        }
    }

    /// Subcategory header terms to try, most specific first
    pub fn header_hierarchy(&self) -> &'static [&'static str] {
        match self {
            PeriodType::Monthly => &["MONTHLY", "WEAR PERIOD"],
            PeriodType::Quarterly => &["QUARTERLY", "WEAR PERIOD"],
            PeriodType::YearToDate => &["ANNUAL"],
        }
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            PeriodType::Monthly => "monthly",
            PeriodType::Quarterly => "quarterly",
            PeriodType::YearToDate => "YTD",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// Classification of a dose against its investigation level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum Outcome {
    /// Dose is below the level
    NoAction,
    /// Dose reached the level
    InvestigationRequired,
}

impl Outcome {
    /// Returns whether the row needs investigating
    pub fn requires_investigation(&self) -> bool {
        matches!(self, Outcome::InvestigationRequired)
    }

    /// Returns simple name for display
    pub fn simple_name(&self) -> &'static str {
        match self {
            Outcome::NoAction => "no action",
            Outcome::InvestigationRequired => "investigation required",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.simple_name())
    }
}

/// How a dose exactly equal to a level is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(rename_all = "kebab-case"))]
pub enum BoundaryPolicy {
    /// `dose >= level` reaches the level
    #[default]
    Inclusive,
    /// `dose > level` reaches the level
    Exclusive,
}

impl BoundaryPolicy {
    /// Returns whether `dose` reaches `level` under this policy
    pub fn reaches(&self, dose: f64, level: f64) -> bool {
        match self {
            BoundaryPolicy::Inclusive => dose >= level,
            BoundaryPolicy::Exclusive => dose > level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("collar", BadgeType::Collar)]
    #[case("OTHER WHOLE BODY", BadgeType::OtherWholeBody)]
    #[case(" chest ", BadgeType::Chest)]
    #[case("waist", BadgeType::Waist)]
    #[case("left finger", BadgeType::LeftFinger)]
    #[case("Right Finger", BadgeType::RightFinger)]
    #[case("lens", BadgeType::Lens)]
    fn test_badge_from_str(#[case] input: &str, #[case] expected: BadgeType) {
        assert_eq!(input.parse::<BadgeType>().unwrap(), expected);
    }

    #[test]
    fn test_badge_unsupported() {
        let err = "ankle".parse::<BadgeType>().unwrap_err();
        assert!(matches!(err, OverxrptError::UnsupportedBadge(ref s) if s == "ankle"));
    }

    #[test]
    fn test_badge_categories() {
        assert_eq!(BadgeType::Waist.category(), DoseCategory::WholeBody);
        assert_eq!(BadgeType::RightFinger.category(), DoseCategory::Extremity);
        assert_eq!(BadgeType::Lens.category(), DoseCategory::Lens);
        assert_eq!(BadgeType::Lens.category().dose_column(), "Lens");
        assert_eq!(
            BadgeType::LeftFinger.category().dose_column(),
            "Total Extremity"
        );
    }

    #[test]
    fn test_lens_hierarchy_skips_badge_name() {
        assert_eq!(BadgeType::Lens.header_hierarchy(), vec!["LDE", "LENS", "EYES"]);
    }

    #[rstest]
    #[case("1MO", PeriodType::Monthly)]
    #[case("3mo", PeriodType::Quarterly)]
    #[case("", PeriodType::YearToDate)]
    #[case("  ", PeriodType::YearToDate)]
    fn test_period_type_from_frequency(#[case] input: &str, #[case] expected: PeriodType) {
        assert_eq!(PeriodType::from_frequency(input).unwrap(), expected);
    }

    #[test]
    fn test_period_type_unknown_frequency() {
        assert!(PeriodType::from_frequency("2WK").is_err());
    }

    #[rstest]
    #[case(BoundaryPolicy::Inclusive, 0.8, 1.0, false)]
    #[case(BoundaryPolicy::Inclusive, 1.0, 1.0, true)]
    #[case(BoundaryPolicy::Inclusive, 1.2, 1.0, true)]
    #[case(BoundaryPolicy::Exclusive, 1.0, 1.0, false)]
    #[case(BoundaryPolicy::Exclusive, 1.2, 1.0, true)]
    fn test_boundary_policy(
        #[case] policy: BoundaryPolicy,
        #[case] dose: f64,
        #[case] level: f64,
        #[case] expected: bool,
    ) {
        assert_eq!(policy.reaches(dose, level), expected);
    }

    #[test]
    fn test_default_boundary_is_inclusive() {
        assert_eq!(BoundaryPolicy::default(), BoundaryPolicy::Inclusive);
    }
}
