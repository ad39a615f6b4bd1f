//! Core type definitions for overexposure report analysis
//!
//! This module provides the fundamental types used throughout the overxrpt library:
//! - [`BadgeType`]: Dosimeter badge position (collar, chest, left finger, ...)
//! - [`DoseCategory`]: Body region a badge reports on (whole body, extremity, lens)
//! - [`PeriodType`]: Wear period kind (monthly, quarterly, year to date)
//! - [`Period`]: Wear period with its display label
//! - [`Outcome`]: Result of comparing a dose against its investigation level
//! - [`BoundaryPolicy`]: Treatment of a dose exactly at the level
//! - [`parse_dose`]: Dose cell parsing

mod dose;
mod enums;
mod period;

pub use dose::{parse_dose, MINIMAL_DOSE};
pub use enums::{BadgeType, BoundaryPolicy, DoseCategory, Outcome, PeriodType};
pub use period::{parse_date, Period};
