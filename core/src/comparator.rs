//! Dose comparison
//!
//! Classifies each resolved row against its investigation level. The
//! decision itself is [`classify`]; [`Comparator`] adds the urgent level and
//! the year-to-date notification history on top.

use crate::error::Result;
use crate::history::NotificationHistory;
use crate::levels::{Levels, ThresholdEntry};
use crate::report::ReportRow;
use crate::resolver::ResolvedRow;
use crate::types::{BoundaryPolicy, Outcome, PeriodType};
use log::debug;

/// Classifies a dose against a level
///
/// # Example
///
/// ```
/// use overxrpt_core::{classify, BoundaryPolicy, Outcome};
///
/// assert_eq!(classify(0.8, 1.0, BoundaryPolicy::Inclusive), Outcome::NoAction);
/// assert_eq!(classify(1.0, 1.0, BoundaryPolicy::Inclusive), Outcome::InvestigationRequired);
/// assert_eq!(classify(1.0, 1.0, BoundaryPolicy::Exclusive), Outcome::NoAction);
/// ```
pub fn classify(dose: f64, level: f64, policy: BoundaryPolicy) -> Outcome {
    if policy.reaches(dose, level) {
        Outcome::InvestigationRequired
    } else {
        Outcome::NoAction
    }
}

/// Outcome of comparing one report row with its levels
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ComparisonResult {
    /// The compared row
    pub row: ReportRow,

    /// Code of the threshold entry the levels came from
    pub entry_code: String,

    /// Levels the dose was compared with
    pub levels: Levels,

    /// Classification against the investigation level
    pub outcome: Outcome,

    /// Dose reached the urgent level
    pub urgent: bool,

    /// Year-to-date exceedance already notified in an earlier report
    pub previously_notified: bool,

    /// The formal investigation template should go with the notification
    pub attach_template: bool,
}

impl ComparisonResult {
    /// Returns whether the row needs investigating
    pub fn requires_investigation(&self) -> bool {
        self.outcome.requires_investigation()
    }
}

/// Compares rows under one boundary policy and notification history
pub struct Comparator<'h> {
    policy: BoundaryPolicy,
    history: &'h NotificationHistory,
}

impl<'h> Comparator<'h> {
    /// Creates a comparator
    pub fn new(policy: BoundaryPolicy, history: &'h NotificationHistory) -> Self {
        Self { policy, history }
    }

    /// Compares one row with its threshold entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry has no usable level for the row's
    /// badge and wear period.
    pub fn compare(&self, row: &ReportRow, entry: &ThresholdEntry) -> Result<ComparisonResult> {
        let levels = entry.levels_for(row.badge, row.period_type())?;
        Ok(self.compare_with_levels(row, &entry.code, levels))
    }

    /// Compares every resolved row, in order
    pub fn compare_all(&self, resolved: &[ResolvedRow<'_>]) -> Result<Vec<ComparisonResult>> {
        resolved
            .iter()
            .map(|r| self.compare(r.row, r.entry))
            .collect()
    }

    /// Applies the decision rules to already-resolved levels
    pub fn compare_with_levels(
        &self,
        row: &ReportRow,
        entry_code: &str,
        levels: Levels,
    ) -> ComparisonResult {
        let outcome = classify(row.dose, levels.level, self.policy);
        let urgent = levels
            .urgent
            .map(|urgent| self.policy.reaches(row.dose, urgent))
            .unwrap_or(false);

        let is_ytd_exceedance =
            outcome.requires_investigation() && row.period_type() == PeriodType::YearToDate;
        let previously_notified = is_ytd_exceedance && self.history.already_notified(row);
        let attach_template = is_ytd_exceedance && !previously_notified;

        debug!(
            "Participant {} {} {}: {} mSv vs {} mSv → {}{}",
            row.participant,
            row.badge,
            row.period,
            row.dose,
            levels.level,
            outcome,
            if urgent { " (urgent)" } else { "" }
        );

        ComparisonResult {
            row: row.clone(),
            entry_code: entry_code.to_string(),
            levels,
            outcome,
            urgent,
            previously_notified,
            attach_template,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::levels::LevelHeader;
    use crate::types::{BadgeType, Period};
    use rstest::rstest;

    pub(crate) fn row(id: &str, badge: BadgeType, period_type: PeriodType, dose: f64) -> ReportRow {
        let (begin, end) = match period_type {
            PeriodType::Monthly => ("2024-03-01", "2024-03-31"),
            PeriodType::Quarterly => ("2024-01-01", "2024-03-31"),
            PeriodType::YearToDate => ("2024-01-01", "2024-03-31"),
        };
        ReportRow {
            participant: id.to_string(),
            name: format!("Wearer {}", id),
            badge,
            dose,
            frequency: String::new(),
            begin_date: begin.to_string(),
            end_date: end.to_string(),
            period: Period::from_dates(period_type, begin, end).unwrap(),
            account_code: "123456".to_string(),
            subaccount_code: "A1".to_string(),
        }
    }

    pub(crate) fn levels(level: f64, urgent: Option<f64>) -> Levels {
        Levels {
            level,
            urgent,
            header: LevelHeader::new("Whole Body (DDE)", "Monthly"),
        }
    }

    #[rstest]
    #[case(0.0)]
    #[case(0.5)]
    #[case(0.999)]
    fn test_below_level_is_no_action(#[case] dose: f64) {
        assert_eq!(classify(dose, 1.0, BoundaryPolicy::Inclusive), Outcome::NoAction);
        assert_eq!(classify(dose, 1.0, BoundaryPolicy::Exclusive), Outcome::NoAction);
    }

    #[rstest]
    #[case(1.0)]
    #[case(1.2)]
    #[case(100.0)]
    fn test_at_or_above_level_requires_investigation(#[case] dose: f64) {
        assert_eq!(
            classify(dose, 1.0, BoundaryPolicy::Inclusive),
            Outcome::InvestigationRequired
        );
    }

    #[test]
    fn test_scenario_row_42_no_action() {
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::default(), &history);

        let result = comparator.compare_with_levels(
            &row("42", BadgeType::Collar, PeriodType::Monthly, 0.8),
            "A1",
            levels(1.0, None),
        );
        assert_eq!(result.outcome, Outcome::NoAction);
        assert!(!result.urgent);
        assert!(!result.attach_template);
    }

    #[test]
    fn test_scenario_row_43_investigation_required() {
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::default(), &history);

        let result = comparator.compare_with_levels(
            &row("43", BadgeType::Collar, PeriodType::Monthly, 1.2),
            "A1",
            levels(1.0, None),
        );
        assert_eq!(result.outcome, Outcome::InvestigationRequired);
        assert!(result.requires_investigation());
        assert_eq!(result.entry_code, "A1");
    }

    #[test]
    fn test_urgent_flag() {
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::Inclusive, &history);

        let urgent = comparator.compare_with_levels(
            &row("1", BadgeType::Chest, PeriodType::Monthly, 10.0),
            "A1",
            levels(1.0, Some(10.0)),
        );
        assert!(urgent.urgent);

        let not_urgent = comparator.compare_with_levels(
            &row("2", BadgeType::Chest, PeriodType::Monthly, 9.9),
            "A1",
            levels(1.0, Some(10.0)),
        );
        assert!(!not_urgent.urgent);
    }

    #[test]
    fn test_exclusive_policy_applies_to_urgent() {
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::Exclusive, &history);

        let result = comparator.compare_with_levels(
            &row("1", BadgeType::Chest, PeriodType::Monthly, 10.0),
            "A1",
            levels(10.0, Some(10.0)),
        );
        assert_eq!(result.outcome, Outcome::NoAction);
        assert!(!result.urgent);
    }

    #[test]
    fn test_new_ytd_exceedance_attaches_template() {
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::Inclusive, &history);

        let result = comparator.compare_with_levels(
            &row("7", BadgeType::Lens, PeriodType::YearToDate, 16.0),
            "A1",
            levels(15.0, None),
        );
        assert!(result.requires_investigation());
        assert!(!result.previously_notified);
        assert!(result.attach_template);
    }

    #[test]
    fn test_notified_ytd_exceedance_keeps_outcome() {
        let past = row("7", BadgeType::Lens, PeriodType::YearToDate, 15.5);
        let history = NotificationHistory::from_rows(vec![past]);
        let comparator = Comparator::new(BoundaryPolicy::Inclusive, &history);

        let result = comparator.compare_with_levels(
            &row("7", BadgeType::Lens, PeriodType::YearToDate, 16.0),
            "A1",
            levels(15.0, None),
        );
        assert_eq!(result.outcome, Outcome::InvestigationRequired);
        assert!(result.previously_notified);
        assert!(!result.attach_template);
    }

    #[test]
    fn test_monthly_exceedance_ignores_history() {
        let past = row("7", BadgeType::Collar, PeriodType::Monthly, 1.0);
        let history = NotificationHistory::from_rows(vec![past]);
        let comparator = Comparator::new(BoundaryPolicy::Inclusive, &history);

        let result = comparator.compare_with_levels(
            &row("7", BadgeType::Collar, PeriodType::Monthly, 2.0),
            "A1",
            levels(1.0, None),
        );
        assert!(!result.previously_notified);
        assert!(!result.attach_template);
    }

    #[test]
    fn test_compare_reads_entry_levels() {
        let table = crate::levels::tests::table();
        let history = NotificationHistory::empty();
        let comparator = Comparator::new(BoundaryPolicy::Inclusive, &history);

        let result = comparator
            .compare(
                &row("9", BadgeType::Collar, PeriodType::Monthly, 1.5),
                &table.entries[1],
            )
            .unwrap();
        assert_eq!(result.levels.level, 0.5);
        assert_eq!(result.entry_code, "0A1");
        assert!(result.requires_investigation());
    }
}
