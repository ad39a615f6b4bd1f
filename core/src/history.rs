//! Earlier notifications for the same subaccount
//!
//! Reports are saved side by side in one folder per subaccount and year, so
//! the reports in the current report's folder that predate it tell us which
//! year-to-date exceedances have already been communicated.

use crate::error::Result;
use crate::report::{Report, ReportCodes, ReportRow};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name marker of overexposure report exports
pub const REPORT_MARKER: &str = "OVXRPT_";

/// Rows of earlier reports
#[derive(Debug, Clone, Default)]
pub struct NotificationHistory {
    rows: Vec<ReportRow>,
}

impl NotificationHistory {
    /// Creates an empty history
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates a history from already-loaded rows
    pub fn from_rows(rows: Vec<ReportRow>) -> Self {
        Self { rows }
    }

    /// Loads every earlier report next to `current`
    ///
    /// A past report that cannot be read is logged and skipped; it only
    /// affects the wording of year-to-date notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder or the current report's metadata
    /// cannot be read.
    pub fn load_for(current: &Path, codes: &ReportCodes) -> Result<Self> {
        let dir = match current.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self::load_from(&dir, current, codes)
    }

    /// Loads every report in `dir` older than `current`
    pub fn load_from(dir: &Path, current: &Path, codes: &ReportCodes) -> Result<Self> {
        let past = past_report_paths(dir, current)?;
        info!(
            "Found {} earlier reports in {}",
            past.len(),
            dir.display()
        );

        let mut rows = Vec::new();
        for path in past {
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let past_codes = ReportCodes::from_file_name(&file_name).unwrap_or_else(|_| codes.clone());

            match Report::load(&path, &past_codes) {
                Ok(report) => {
                    debug!("{} rows from {}", report.rows.len(), path.display());
                    rows.extend(report.rows);
                }
                Err(e) => warn!("Skipping earlier report {}: {}", path.display(), e),
            }
        }

        Ok(Self { rows })
    }

    /// Rows of all earlier reports
    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    /// Returns whether the history holds no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Checks whether an exceedance has already been notified
    ///
    /// True when an earlier row has the same wearer, badge and period, and
    /// its dose does not exceed the current dose.
    pub fn already_notified(&self, row: &ReportRow) -> bool {
        self.rows.iter().any(|past| {
            past.name == row.name
                && past.badge == row.badge
                && past.period == row.period
                && row.dose >= past.dose
        })
    }
}

/// Lists earlier reports in `dir`, oldest first
///
/// Candidates contain [`REPORT_MARKER`] in their name, share the current
/// report's extension, and were modified before it.
pub fn past_report_paths(dir: &Path, current: &Path) -> Result<Vec<PathBuf>> {
    let current_name = current.file_name();
    let current_ext = extension_lowercase(current);
    let current_modified = std::fs::metadata(current)?.modified()?;

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() || path.file_name() == current_name {
            continue;
        }
        let is_report = path
            .file_name()
            .map(|n| n.to_string_lossy().contains(REPORT_MARKER))
            .unwrap_or(false);
        if !is_report || extension_lowercase(&path) != current_ext {
            continue;
        }

        let modified = entry.metadata()?.modified()?;
        if modified < current_modified {
            found.push((modified, path));
        }
    }

    found.sort();
    Ok(found.into_iter().map(|(_, path)| path).collect())
}

fn extension_lowercase(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BadgeType, Period, PeriodType};
    use std::fs::File;
    use std::time::Duration;
    use tempfile::TempDir;

    fn ytd_row(name: &str, badge: BadgeType, dose: f64) -> ReportRow {
        ReportRow {
            participant: "42".to_string(),
            name: name.to_string(),
            badge,
            dose,
            frequency: String::new(),
            begin_date: "2024-01-01".to_string(),
            end_date: "2024-06-30".to_string(),
            period: Period::from_dates(PeriodType::YearToDate, "2024-01-01", "").unwrap(),
            account_code: "123456".to_string(),
            subaccount_code: "0A1".to_string(),
        }
    }

    #[test]
    fn test_already_notified() {
        let history = NotificationHistory::from_rows(vec![ytd_row("J. Smith", BadgeType::Lens, 16.0)]);

        assert!(history.already_notified(&ytd_row("J. Smith", BadgeType::Lens, 17.5)));
        assert!(history.already_notified(&ytd_row("J. Smith", BadgeType::Lens, 16.0)));
        // Lower than the earlier notification
        assert!(!history.already_notified(&ytd_row("J. Smith", BadgeType::Lens, 15.0)));
        assert!(!history.already_notified(&ytd_row("A. Jones", BadgeType::Lens, 17.5)));
        assert!(!history.already_notified(&ytd_row("J. Smith", BadgeType::Collar, 17.5)));
    }

    #[test]
    fn test_different_period_not_notified() {
        let mut past = ytd_row("J. Smith", BadgeType::Lens, 16.0);
        past.period = Period::from_dates(PeriodType::YearToDate, "2023-01-01", "").unwrap();
        let history = NotificationHistory::from_rows(vec![past]);

        assert!(!history.already_notified(&ytd_row("J. Smith", BadgeType::Lens, 17.0)));
    }

    #[test]
    fn test_empty_history() {
        let history = NotificationHistory::empty();
        assert!(history.is_empty());
        assert!(!history.already_notified(&ytd_row("J. Smith", BadgeType::Lens, 1.0)));
    }

    fn touch(path: &Path, age_secs: u64) {
        let file = File::create(path).unwrap();
        let modified = SystemTime::now() - Duration::from_secs(age_secs);
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_past_report_paths_filters_and_orders() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let current = dir.join("OVXRPT_AC123456_SUB0A1_june.xlsx");
        touch(&current, 100);
        touch(&dir.join("OVXRPT_AC123456_SUB0A1_april.xlsx"), 300);
        touch(&dir.join("OVXRPT_AC123456_SUB0A1_may.XLSX"), 200);
        // Newer than the current report
        touch(&dir.join("OVXRPT_AC123456_SUB0A1_july.xlsx"), 10);
        // Not a report export
        touch(&dir.join("levels.xlsx"), 500);
        // Different extension
        touch(&dir.join("OVXRPT_AC123456_SUB0A1_march.pdf"), 400);

        let paths = past_report_paths(dir, &current).unwrap();
        let names: Vec<String> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(
            names,
            vec![
                "OVXRPT_AC123456_SUB0A1_april.xlsx",
                "OVXRPT_AC123456_SUB0A1_may.XLSX",
            ]
        );
    }

    #[test]
    fn test_load_for_skips_unreadable_reports() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();

        let current = dir.join("OVXRPT_AC123456_SUB0A1_june.xlsx");
        touch(&current, 100);
        // Empty file, not a valid workbook
        touch(&dir.join("OVXRPT_AC123456_SUB0A1_may.xlsx"), 200);

        let history = NotificationHistory::load_for(&current, &ReportCodes::new("123456", "0A1")).unwrap();
        assert!(history.is_empty());
    }
}
