//! Notification email composition
//!
//! Turns comparison results into an [`EmailDraft`] for a person to review
//! and send. Nothing here sends mail.

use crate::comparator::ComparisonResult;
use crate::types::{Outcome, PeriodType};
use log::{debug, warn};
use std::fmt;
use std::path::PathBuf;

const TEMPLATE_SENTENCE: &str = "I have attached our report template for the exceedance of the \
     annual investigation level as a suggestion for the investigation.";

const INVESTIGATE_REQUEST: &str =
    "Please investigate the reasons behind these high doses and report back to us.";

const NOTHING_EXCEEDED: &str = "None of the alerts in this report exceed a local investigation level.";

/// Wording for the repeated subject of a merged bullet
const SAME_WEARER: &str = "Also for this wearer";

/// Notification draft for one report
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize))]
pub struct EmailDraft {
    /// Mailbox the email is sent on behalf of
    pub sender: Option<String>,
    pub to: String,
    pub cc: Option<String>,
    pub subject: String,

    /// At least one dose reached an urgent level
    pub urgent: bool,

    pub greeting: String,
    pub introduction: String,

    /// One bullet per wearer with rows needing investigation
    pub investigation: Vec<String>,

    /// One bullet per wearer with rows needing no action
    pub no_action: Vec<String>,

    /// The investigation template is among the attachments
    pub template_attached: bool,

    pub signature: Option<String>,
    pub attachments: Vec<PathBuf>,
}

impl EmailDraft {
    /// Renders the draft as an HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::from("<html>\n<body>\n");
        html.push_str(&format!("<p>{},</p>\n", escape(&self.greeting)));
        html.push_str(&format!("<p>{}</p>\n", escape(&self.introduction)));

        if self.investigation.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape(NOTHING_EXCEEDED)));
        } else {
            html.push_str("<p><b>The following dose thresholds have been exceeded:</b></p>\n<ul>\n");
            for bullet in &self.investigation {
                html.push_str(&format!("<li><b>{}</b></li>\n", escape(bullet)));
            }
            html.push_str("</ul>\n");
        }

        if !self.no_action.is_empty() {
            html.push_str("<p>The following alerts need no action:</p>\n<ul>\n");
            for bullet in &self.no_action {
                html.push_str(&format!("<li>{}</li>\n", escape(bullet)));
            }
            html.push_str("</ul>\n");
        }

        if !self.investigation.is_empty() {
            html.push_str(&format!("<p>{}</p>\n", escape(INVESTIGATE_REQUEST)));
        }
        if self.template_attached {
            html.push_str(&format!("<p>{}</p>\n", escape(TEMPLATE_SENTENCE)));
        }

        html.push_str("<p>Kind regards,</p>\n");
        if let Some(signature) = &self.signature {
            html.push_str(&format!("<p>{}</p>\n", escape(signature)));
        }
        html.push_str("</body>\n</html>\n");
        html
    }

    /// Body text without the header lines
    pub fn body_text(&self) -> String {
        let mut body = format!("{},\n\n{}\n\n", self.greeting, self.introduction);

        if self.investigation.is_empty() {
            body.push_str(NOTHING_EXCEEDED);
            body.push_str("\n\n");
        } else {
            body.push_str("The following dose thresholds have been exceeded:\n");
            for bullet in &self.investigation {
                body.push_str(&format!("  * {}\n", bullet));
            }
            body.push('\n');
        }

        if !self.no_action.is_empty() {
            body.push_str("The following alerts need no action:\n");
            for bullet in &self.no_action {
                body.push_str(&format!("  * {}\n", bullet));
            }
            body.push('\n');
        }

        if !self.investigation.is_empty() {
            body.push_str(INVESTIGATE_REQUEST);
            body.push_str("\n\n");
        }
        if self.template_attached {
            body.push_str(TEMPLATE_SENTENCE);
            body.push_str("\n\n");
        }

        body.push_str("Kind regards,\n");
        if let Some(signature) = &self.signature {
            body.push_str(signature);
            body.push('\n');
        }
        body
    }
}

impl fmt::Display for EmailDraft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(sender) = &self.sender {
            writeln!(f, "From: {}", sender)?;
        }
        writeln!(f, "To: {}", self.to)?;
        if let Some(cc) = &self.cc {
            writeln!(f, "Cc: {}", cc)?;
        }
        writeln!(f, "Subject: {}", self.subject)?;
        if !self.attachments.is_empty() {
            let names: Vec<String> = self
                .attachments
                .iter()
                .map(|p| p.display().to_string())
                .collect();
            writeln!(f, "Attachments: {}", names.join(", "))?;
        }
        writeln!(f)?;
        write!(f, "{}", self.body_text())
    }
}

/// Builds notification drafts for one subaccount
#[derive(Debug, Clone)]
pub struct EmailComposer {
    pub subaccount: String,
    pub provider: String,
    pub to: String,
    pub cc: Option<String>,
    pub sender: Option<String>,
    pub report_path: PathBuf,
    pub template: Option<PathBuf>,
    pub signature: Option<String>,
}

impl EmailComposer {
    /// Composes the draft for a report's results
    ///
    /// `hour` is the local hour of day (0-23) and picks the greeting.
    pub fn compose(&self, results: &[ComparisonResult], hour: u32) -> EmailDraft {
        let urgent = results.iter().any(|r| r.urgent);
        let subject = format!(
            "{}{} {} Overexposure Notification",
            if urgent { "URGENT: " } else { "" },
            self.subaccount,
            self.provider
        );

        let (flagged, cleared): (Vec<&ComparisonResult>, Vec<&ComparisonResult>) =
            results.iter().partition(|r| r.requires_investigation());

        let wants_template = results.iter().any(|r| r.attach_template);
        let mut attachments = vec![self.report_path.clone()];
        let template_attached = match (&self.template, wants_template) {
            (Some(template), true) => {
                attachments.push(template.clone());
                true
            }
            (None, true) => {
                warn!("A new annual exceedance needs the investigation template, but none is configured");
                false
            }
            _ => false,
        };

        let investigation = bullets(&flagged);
        let no_action = bullets(&cleared);
        debug!(
            "Composed {} investigation and {} no action bullets for subaccount {}",
            investigation.len(),
            no_action.len(),
            self.subaccount
        );

        EmailDraft {
            sender: self.sender.clone(),
            to: self.to.clone(),
            cc: self.cc.clone(),
            subject,
            urgent,
            greeting: greeting(hour).to_string(),
            introduction: format!(
                "Please find attached an overexposure notification from {} for subaccount {}.",
                self.provider, self.subaccount
            ),
            investigation,
            no_action,
            template_attached,
            signature: self.signature.clone(),
            attachments,
        }
    }
}

/// Greeting for the local hour of day
pub fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else {
        "Good afternoon"
    }
}

/// Full sentence describing one result
pub fn response_sentence(result: &ComparisonResult) -> String {
    format!("{}{}", wearer_subject(result), response_tail(result))
}

fn wearer_subject(result: &ComparisonResult) -> String {
    format!(
        "For wearer {} (participant {})",
        result.row.name,
        result.row.identifier()
    )
}

/// Sentence text following the wearer
fn response_tail(result: &ComparisonResult) -> String {
    let row = &result.row;
    let level = result.levels.level;
    let badge = row.badge;

    let mut tail = match (row.period_type(), result.outcome) {
        (PeriodType::Monthly, Outcome::InvestigationRequired) => format!(
            " in the month of {}, they received {} mSv on their {} badge, exceeding the monthly local review level of {} mSv.",
            row.period, row.dose, badge, level
        ),
        (PeriodType::Monthly, Outcome::NoAction) => format!(
            " in the month of {}, the {} badge alert can be ignored as the monthly local review level is {} mSv.",
            row.period, badge, level
        ),
        (PeriodType::Quarterly, Outcome::InvestigationRequired) => format!(
            " in the {}, they received {} mSv on their {} badge, exceeding the quarterly local review level of {} mSv.",
            row.period, row.dose, badge, level
        ),
        (PeriodType::Quarterly, Outcome::NoAction) => format!(
            " in the {}, the {} badge alert can be ignored as the quarterly local review level is {} mSv.",
            row.period, badge, level
        ),
        (PeriodType::YearToDate, Outcome::InvestigationRequired) if result.previously_notified => format!(
            ", no further investigation is required on the {} badge year to date alert as this should have already been communicated and investigated.",
            badge
        ),
        (PeriodType::YearToDate, Outcome::InvestigationRequired) => format!(
            ", they have now received {} mSv on their {} badge this year, exceeding the annual formal investigation level of {} mSv.",
            row.dose, badge, level
        ),
        (PeriodType::YearToDate, Outcome::NoAction) => format!(
            ", the year to date alert on this report can be ignored as the annual formal investigation level is {} mSv on their {} badge.",
            level, badge
        ),
    };

    if result.urgent {
        if let Some(urgent) = result.levels.urgent {
            tail.push_str(&format!(" This reaches the urgent level of {} mSv.", urgent));
        }
    }
    tail
}

/// Merges sentences per wearer, keeping first-appearance order
fn bullets(results: &[&ComparisonResult]) -> Vec<String> {
    let mut groups: Vec<(&str, String)> = Vec::new();
    for result in results {
        let key = result.row.identifier();
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, bullet)) => {
                bullet.push(' ');
                bullet.push_str(SAME_WEARER);
                bullet.push_str(&response_tail(result));
            }
            None => groups.push((key, response_sentence(result))),
        }
    }
    groups.into_iter().map(|(_, bullet)| bullet).collect()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
