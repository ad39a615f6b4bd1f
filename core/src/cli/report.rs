use crate::api::OverexposureAnalysis;
use std::fmt;

/// Text summary of an analysis, one line per report row
pub struct TextReport<'a> {
    analysis: &'a OverexposureAnalysis,
}

impl<'a> TextReport<'a> {
    /// Creates a new text report
    pub fn new(analysis: &'a OverexposureAnalysis) -> Self {
        Self { analysis }
    }
}

impl<'a> fmt::Display for TextReport<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Overexposure Analysis")?;
        writeln!(f, "=====================")?;
        writeln!(f)?;
        writeln!(f, "Account:        {}", self.analysis.codes.account)?;
        writeln!(f, "Subaccount:     {}", self.analysis.codes.subaccount)?;
        writeln!(f, "Levels sheet:   {}", self.analysis.levels_sheet)?;
        writeln!(
            f,
            "Rows:           {} ({} need investigation)",
            self.analysis.results.len(),
            self.analysis.investigation_count()
        )?;
        writeln!(f, "Urgent:         {}", self.analysis.is_urgent())?;
        writeln!(f)?;

        writeln!(
            f,
            "{:<12} {:<16} {:<18} {:<22} {:>8} {:>8}  Outcome",
            "Participant", "Badge", "Period", "Level column", "Dose", "Level"
        )?;
        writeln!(f, "{}", "-".repeat(112))?;
        for result in &self.analysis.results {
            let mut flags = Vec::new();
            if result.urgent {
                flags.push("urgent");
            }
            if result.previously_notified {
                flags.push("already notified");
            }
            if result.attach_template {
                flags.push("template");
            }

            write!(
                f,
                "{:<12} {:<16} {:<18} {:<22} {:>8} {:>8}  {}",
                result.row.participant,
                result.row.badge.simple_name(),
                result.row.period.label,
                result.levels.header.to_string(),
                result.row.dose,
                result.levels.level,
                result.outcome
            )?;
            if !flags.is_empty() {
                write!(f, " ({})", flags.join(", "))?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}
