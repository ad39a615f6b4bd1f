use crate::comparator::{Comparator, ComparisonResult};
use crate::config::RunConfig;
use crate::email::{EmailComposer, EmailDraft};
use crate::error::{OverxrptError, Result};
use crate::history::NotificationHistory;
use crate::levels::LevelsTable;
use crate::report::{Report, ReportCodes};
use crate::resolver::resolve;
use chrono::Timelike;
use log::{info, warn};
use std::path::Path;

/// Runs the whole overexposure analysis for one report
///
/// Reads the report and the investigation levels workbook, compares every
/// dose with its level and drafts the notification email. The first
/// failure aborts the run; no partial result is returned.
///
/// # Example
///
/// ```no_run
/// use overxrpt_core::{OverexposureAnalyser, RunConfig};
/// use std::path::Path;
///
/// let config = RunConfig::default().with_levels("levels.xlsx");
/// let analysis = OverexposureAnalyser::analyse(
///     Path::new("OVXRPT_AC123456_SUB0A1_2024.xlsx"),
///     &config,
/// ).unwrap();
///
/// println!("{}", analysis.email);
/// ```
pub struct OverexposureAnalyser;

impl OverexposureAnalyser {
    /// Analyses a report file, greeting by the current local time
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The configuration is incomplete
    /// - The report name does not carry account and subaccount codes, and
    ///   none are configured
    /// - Either workbook cannot be read or is malformed
    /// - A row has no single threshold entry, or no usable level
    pub fn analyse(report_path: &Path, config: &RunConfig) -> Result<OverexposureAnalysis> {
        Self::analyse_at(report_path, config, chrono::Local::now().hour())
    }

    /// Analyses a report file at a given local hour of day
    pub fn analyse_at(report_path: &Path, config: &RunConfig, hour: u32) -> Result<OverexposureAnalysis> {
        config.validate()?;
        let codes = ReportCodes::resolve(
            report_path,
            config.account.as_deref(),
            config.subaccount.as_deref(),
        )?;
        info!("Analysing report for {}", codes);

        let table = LevelsTable::load(config.levels_path()?, &codes.account)?;
        let report = Report::load(report_path, &codes)?;

        let history = if config.use_history {
            match &config.history_dir {
                Some(dir) => NotificationHistory::load_from(dir, report_path, &codes)?,
                None => NotificationHistory::load_for(report_path, &codes)?,
            }
        } else {
            NotificationHistory::empty()
        };

        Self::analyse_report(&report, &table, &history, config, hour)
    }

    /// Analyses an already-loaded report against a levels table
    pub fn analyse_report(
        report: &Report,
        table: &LevelsTable,
        history: &NotificationHistory,
        config: &RunConfig,
        hour: u32,
    ) -> Result<OverexposureAnalysis> {
        let levels = table.crop(&report.codes)?;
        if report.rows.is_empty() {
            warn!("Report for {} has no dose rows", report.codes);
        }

        let resolved = resolve(&report.rows, &levels)?;
        let comparator = Comparator::new(config.boundary, history);
        let results = comparator.compare_all(&resolved)?;

        let report_path = report.path.clone().ok_or_else(|| {
            OverxrptError::Config("report has no file to attach to the notification".into())
        })?;
        let composer = EmailComposer {
            subaccount: report.codes.subaccount.clone(),
            provider: config.provider.clone(),
            to: levels.contact()?.to_string(),
            cc: levels.cc()?.map(str::to_string),
            sender: config.sender.clone(),
            report_path,
            template: config.template.clone(),
            signature: config.signature.clone(),
        };
        let email = composer.compose(&results, hour);

        let analysis = OverexposureAnalysis {
            codes: report.codes.clone(),
            levels_sheet: levels.sheet_name.clone(),
            results,
            email,
        };
        info!(
            "{} rows compared, {} need investigation{}",
            analysis.results.len(),
            analysis.investigation_count(),
            if analysis.is_urgent() { " (urgent)" } else { "" }
        );
        Ok(analysis)
    }
}

/// Result of analysing one report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct OverexposureAnalysis {
    /// Account and subaccount the report belongs to
    pub codes: ReportCodes,

    /// Levels sheet the thresholds were read from
    pub levels_sheet: String,

    /// One result per report row, in report order
    pub results: Vec<ComparisonResult>,

    /// Drafted notification
    pub email: EmailDraft,
}

impl OverexposureAnalysis {
    /// Number of rows needing investigation
    pub fn investigation_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.requires_investigation())
            .count()
    }

    /// Checks if any dose reached an urgent level
    pub fn is_urgent(&self) -> bool {
        self.results.iter().any(|r| r.urgent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::tests::table;
    use crate::types::{BoundaryPolicy, Outcome};
    use crate::workbook::SheetGrid;
    use std::path::PathBuf;

    const HEADER: &[&str] = &[
        "Participant",
        "Name",
        "Use",
        "Frequency",
        "Begin Date",
        "End Date",
        "Whole Body",
        "Lens",
        "Total Extremity",
    ];

    fn report(rows: &[&[&str]]) -> Report {
        let mut all: Vec<&[&str]> = vec![HEADER];
        all.extend_from_slice(rows);
        let grid = SheetGrid::from_rows("Report", &all);
        let mut report = Report::from_grid(&grid, &ReportCodes::new("123456", "0A1")).unwrap();
        report.path = Some(PathBuf::from("OVXRPT_AC123456_SUB0A1.xlsx"));
        report
    }

    #[test]
    fn test_analyse_report() {
        let report = report(&[
            &["42", "SMITH, JOHN", "Collar", "1MO", "2024-03-01", "2024-03-31", "0.4", "", ""],
            &["43", "JONES, ANN", "Collar", "1MO", "2024-03-01", "2024-03-31", "1.2", "", ""],
        ]);
        let config = RunConfig::default().with_levels("levels.xlsx");

        let analysis = OverexposureAnalyser::analyse_report(
            &report,
            &table(),
            &NotificationHistory::empty(),
            &config,
            10,
        )
        .unwrap();

        assert_eq!(analysis.levels_sheet, "123456");
        assert_eq!(analysis.results.len(), 2);
        assert_eq!(analysis.results[0].outcome, Outcome::NoAction);
        assert_eq!(analysis.results[1].outcome, Outcome::InvestigationRequired);
        assert_eq!(analysis.investigation_count(), 1);
        assert!(!analysis.is_urgent());

        assert_eq!(analysis.email.to, "cardio@trust.nhs.uk");
        assert_eq!(analysis.email.cc.as_deref(), Some("lead@trust.nhs.uk"));
        assert!(analysis.email.body_text().contains("participant 43"));
    }

    #[test]
    fn test_boundary_policy_from_config() {
        let report = report(&[&["7", "SMITH, JOHN", "Collar", "1MO", "2024-03-01", "2024-03-31", "0.5", "", ""]]);
        let history = NotificationHistory::empty();

        let inclusive = RunConfig::default().with_levels("levels.xlsx");
        let analysis =
            OverexposureAnalyser::analyse_report(&report, &table(), &history, &inclusive, 10).unwrap();
        assert!(analysis.results[0].requires_investigation());

        let exclusive = inclusive.with_boundary(BoundaryPolicy::Exclusive);
        let analysis =
            OverexposureAnalyser::analyse_report(&report, &table(), &history, &exclusive, 10).unwrap();
        assert!(!analysis.results[0].requires_investigation());
    }

    #[test]
    fn test_missing_level_aborts_run() {
        // The sheet has no monthly extremity column
        let report = report(&[&["8", "SMITH, JOHN", "RFINGER", "1MO", "2024-03-01", "2024-03-31", "", "", "3"]]);
        let config = RunConfig::default().with_levels("levels.xlsx");

        let result = OverexposureAnalyser::analyse_report(
            &report,
            &table(),
            &NotificationHistory::empty(),
            &config,
            10,
        );
        assert!(matches!(result, Err(OverxrptError::Lookup(_))));
    }

    #[test]
    fn test_analyse_requires_levels_path() {
        let result = OverexposureAnalyser::analyse_at(
            Path::new("OVXRPT_AC123456_SUB0A1.xlsx"),
            &RunConfig::default(),
            10,
        );
        assert!(matches!(result, Err(OverxrptError::Config(_))));
    }

    fn write_sheet(path: &Path, name: &str, rows: &[&[&str]]) {
        let mut writer = rust_xlsxwriter::Workbook::new();
        let sheet = writer.add_worksheet();
        sheet.set_name(name).unwrap();
        for (r, row) in rows.iter().enumerate() {
            for (c, text) in row.iter().enumerate() {
                if !text.is_empty() {
                    sheet.write_string(r as u32, c as u16, *text).unwrap();
                }
            }
        }
        writer.save(path).unwrap();
    }

    fn set_age(path: &Path, age_secs: u64) {
        let file = std::fs::File::options().write(true).open(path).unwrap();
        let modified = std::time::SystemTime::now() - std::time::Duration::from_secs(age_secs);
        file.set_modified(modified).unwrap();
    }

    #[test]
    fn test_analyse_files_with_history() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let dir = temp_dir.path();

        let levels_path = dir.join("levels.xlsx");
        let grid = crate::levels::tests::levels_grid();
        let rows: Vec<Vec<&str>> = (0..grid.height())
            .map(|r| grid.row(r).iter().map(String::as_str).collect())
            .collect();
        let rows: Vec<&[&str]> = rows.iter().map(Vec::as_slice).collect();
        write_sheet(&levels_path, "123456", &rows);

        let past = dir.join("OVXRPT_AC123456_SUB0A1_may.xlsx");
        write_sheet(
            &past,
            "Report",
            &[
                HEADER,
                &["42", "SMITH, JOHN", "LENS", "", "2024-01-01", "2024-05-31", "", "15.5", ""],
            ],
        );
        set_age(&past, 3600);

        let current = dir.join("OVXRPT_AC123456_SUB0A1_june.xlsx");
        write_sheet(
            &current,
            "Report",
            &[
                HEADER,
                &["42", "SMITH, JOHN", "LENS", "", "2024-01-01", "2024-06-30", "", "16", ""],
                &["43", "JONES, ANN", "LENS", "", "2024-01-01", "2024-06-30", "", "12", ""],
                &["44", "BROWN, AMY", "COLLAR", "1MO", "2024-06-01", "2024-06-30", "0.1", "", ""],
            ],
        );

        let config = RunConfig::default()
            .with_levels(&levels_path)
            .with_template(dir.join("template.docx"))
            .with_signature("Alex");
        let analysis = OverexposureAnalyser::analyse_at(&current, &config, 15).unwrap();

        assert_eq!(analysis.codes, ReportCodes::new("123456", "0A1"));
        assert_eq!(analysis.results.len(), 3);
        assert!(analysis.results[0].previously_notified);
        assert!(analysis.results[1].attach_template);
        assert_eq!(analysis.results[2].outcome, Outcome::NoAction);

        let email = &analysis.email;
        assert_eq!(email.subject, "0A1 Landauer Overexposure Notification");
        assert!(email.template_attached);
        assert_eq!(email.attachments, vec![current.clone(), dir.join("template.docx")]);
        assert!(email.body_text().starts_with("Good afternoon,"));
        assert!(email.body_text().contains("participant 43"));

        let without_history = config.use_history(false);
        let analysis = OverexposureAnalyser::analyse_at(&current, &without_history, 15).unwrap();
        assert!(!analysis.results[0].previously_notified);
        assert!(analysis.results[0].attach_template);
    }
}
