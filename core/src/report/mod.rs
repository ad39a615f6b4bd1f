//! Report loading
//!
//! Reads the overexposure report table (a spreadsheet export of the
//! provider's report) into [`ReportRow`]s. The table has a fixed set of
//! columns; their position may vary, so columns are located by header text.

mod codes;
pub mod normalize;

pub use codes::ReportCodes;

use crate::error::{OverxrptError, Result};
use crate::types::{parse_dose, BadgeType, DoseCategory, Period, PeriodType};
use crate::workbook::{SheetGrid, Workbook};
use log::{debug, info};
use normalize::{format_name, header_key, standardise_use, strip_newlines};
use std::path::{Path, PathBuf};

/// One dosimeter reading from the report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct ReportRow {
    /// Participant number of the wearer
    pub participant: String,

    /// Wearer name, formatted for the notification
    pub name: String,

    /// Badge position
    pub badge: BadgeType,

    /// Dose in mSv for the badge's body region
    pub dose: f64,

    /// Raw frequency code (`1MO`, `3MO`, empty for year to date)
    pub frequency: String,

    /// Begin date, `YYYY-MM-DD`
    pub begin_date: String,

    /// End date, `YYYY-MM-DD`
    pub end_date: String,

    /// Wear period derived from the frequency and dates
    pub period: Period,

    /// Account code of the report
    pub account_code: String,

    /// Subaccount code of the report
    pub subaccount_code: String,
}

impl ReportRow {
    /// Identifier used to refer to the row in notifications
    pub fn identifier(&self) -> &str {
        &self.participant
    }

    /// Wear period kind
    pub fn period_type(&self) -> PeriodType {
        self.period.period_type
    }
}

/// Named report columns, in `ALL` order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Participant,
    Name,
    Use,
    Frequency,
    BeginDate,
    EndDate,
    WholeBody,
    Lens,
    TotalExtremity,
}

impl Column {
    const ALL: [Column; 9] = [
        Column::Participant,
        Column::Name,
        Column::Use,
        Column::Frequency,
        Column::BeginDate,
        Column::EndDate,
        Column::WholeBody,
        Column::Lens,
        Column::TotalExtremity,
    ];

    fn label(&self) -> &'static str {
        match self {
            Column::Participant => "Participant",
            Column::Name => "Name",
            Column::Use => "Use",
            Column::Frequency => "Frequency",
            Column::BeginDate => "Begin Date",
            Column::EndDate => "End Date",
            Column::WholeBody => "Whole Body",
            Column::Lens => "Lens",
            Column::TotalExtremity => "Total Extremity",
        }
    }

    /// Whether a normalised header cell names this column
    fn matches(&self, key: &str) -> bool {
        match self {
            Column::Participant => key.contains("participant"),
            Column::Name => key == "name",
            Column::Use => key == "use",
            Column::Frequency => key == "frequency",
            Column::BeginDate => key.contains("begin date"),
            Column::EndDate => key.contains("end date"),
            Column::WholeBody => key.contains("whole body"),
            Column::Lens => key.contains("lens"),
            Column::TotalExtremity => key.contains("total extremity"),
        }
    }

    fn for_dose(badge: BadgeType) -> Column {
        match badge.category() {
            DoseCategory::WholeBody => Column::WholeBody,
            DoseCategory::Extremity => Column::TotalExtremity,
            DoseCategory::Lens => Column::Lens,
        }
    }
}

/// Column positions found in the header row
struct ColumnMap {
    header_row: usize,
    positions: [usize; Column::ALL.len()],
}

impl ColumnMap {
    /// Locates the header row and every required column
    ///
    /// The header row is the first row with both a `Name` and a `Use` cell.
    fn locate(grid: &SheetGrid) -> Result<Self> {
        let header_row = (0..grid.height())
            .find(|&r| {
                let keys: Vec<String> = grid.row(r).iter().map(|c| header_key(c)).collect();
                keys.iter().any(|k| Column::Name.matches(k))
                    && keys.iter().any(|k| Column::Use.matches(k))
            })
            .ok_or_else(|| {
                OverxrptError::MalformedInput(format!(
                    "sheet '{}' has no header row with 'Name' and 'Use' columns",
                    grid.name()
                ))
            })?;

        let keys: Vec<String> = grid.row(header_row).iter().map(|c| header_key(c)).collect();
        let mut positions = [0usize; Column::ALL.len()];
        let mut missing = Vec::new();

        for (slot, column) in Column::ALL.iter().enumerate() {
            match keys.iter().position(|k| column.matches(k)) {
                Some(pos) => positions[slot] = pos,
                None => missing.push(column.label()),
            }
        }

        if !missing.is_empty() {
            return Err(OverxrptError::MalformedInput(format!(
                "sheet '{}' is missing report columns: {}",
                grid.name(),
                missing.join(", ")
            )));
        }

        Ok(Self {
            header_row,
            positions,
        })
    }

    fn get<'a>(&self, grid: &'a SheetGrid, row: usize, column: Column) -> &'a str {
        grid.cell(row, self.positions[column as usize])
    }
}

/// A loaded overexposure report
#[derive(Debug, Clone)]
pub struct Report {
    /// File the report was read from, if any
    pub path: Option<PathBuf>,

    /// Account and subaccount of the report
    pub codes: ReportCodes,

    /// Report rows in table order
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Loads a report from the first sheet of a workbook
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be read, a required column is
    /// missing, or a row holds an unreadable dose, date or badge use.
    pub fn load(path: &Path, codes: &ReportCodes) -> Result<Self> {
        info!("Loading report: {}", path.display());
        let mut workbook = Workbook::open(path)?;
        let grid = workbook.first_grid()?;
        let mut report = Self::from_grid(&grid, codes)?;
        report.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Builds a report from an already-read sheet
    ///
    /// Participant and name cells are filled down (a wearer with several
    /// badges only has them on the first line) and notes rows, which carry
    /// no frequency and no dates, are skipped.
    pub fn from_grid(grid: &SheetGrid, codes: &ReportCodes) -> Result<Self> {
        let columns = ColumnMap::locate(grid)?;
        let mut rows = Vec::new();
        let mut participant = String::new();
        let mut name = String::new();

        for r in (columns.header_row + 1)..grid.height() {
            let cell = |column: Column| strip_newlines(columns.get(grid, r, column));

            let frequency = cell(Column::Frequency);
            let begin_date = cell(Column::BeginDate);
            let end_date = cell(Column::EndDate);
            if frequency.is_empty() && begin_date.is_empty() && end_date.is_empty() {
                debug!("Skipping notes row {}", r + 1);
                continue;
            }

            let current_participant = cell(Column::Participant);
            if !current_participant.is_empty() {
                participant = current_participant;
            }
            let current_name = cell(Column::Name);
            if !current_name.is_empty() {
                name = current_name;
            }

            let row_context = |e: OverxrptError| {
                OverxrptError::MalformedInput(format!("report row {}: {}", r + 1, e))
            };

            if name.is_empty() {
                return Err(row_context(OverxrptError::from("no wearer name")));
            }

            let badge: BadgeType = standardise_use(columns.get(grid, r, Column::Use))
                .parse()
                .map_err(row_context)?;
            let dose = parse_dose(&cell(Column::for_dose(badge))).map_err(row_context)?;
            let period_type = PeriodType::from_frequency(&frequency).map_err(row_context)?;
            let period =
                Period::from_dates(period_type, &begin_date, &end_date).map_err(row_context)?;

            rows.push(ReportRow {
                participant: participant.clone(),
                name: format_name(&name),
                badge,
                dose,
                frequency,
                begin_date,
                end_date,
                period,
                account_code: codes.account.clone(),
                subaccount_code: codes.subaccount.clone(),
            });
        }

        info!("Read {} report rows from sheet '{}'", rows.len(), grid.name());

        Ok(Self {
            path: None,
            codes: codes.clone(),
            rows,
        })
    }
}
