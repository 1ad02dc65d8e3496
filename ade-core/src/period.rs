//! Temporal window for objective periods.
//!
//! Objectives may only be created or modified for a month that lies within a
//! sliding window around the current month: by default from three months back
//! up to two months ahead, both ends inclusive. Boundaries are computed with
//! calendar month arithmetic, never by counting days.
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A (year, month) pair, `month` in `1..=12`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectivePeriod {
    pub year: i32,
    pub month: u32,
}

impl ObjectivePeriod {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Months elapsed since January of year zero.
    fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Self {
        Self {
            year: index.div_euclid(12) as i32,
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    pub fn shifted(&self, months: i64) -> Self {
        Self::from_index(self.index() + months)
    }
}

impl std::fmt::Display for ObjectivePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}/{}", self.month, self.year)
    }
}

/// Outcome of [`ObjectiveWindow::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowCheck {
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveWindow {
    pub months_back: u32,
    pub months_ahead: u32,
}

impl Default for ObjectiveWindow {
    fn default() -> Self {
        Self {
            months_back: 3,
            months_ahead: 2,
        }
    }
}

impl ObjectiveWindow {
    /// Earliest and latest allowed periods, relative to `today`'s month.
    pub fn bounds(&self, today: NaiveDate) -> (ObjectivePeriod, ObjectivePeriod) {
        let current = ObjectivePeriod::from_date(today);
        (
            current.shifted(-i64::from(self.months_back)),
            current.shifted(i64::from(self.months_ahead)),
        )
    }

    pub fn validate(&self, year: i32, month: u32, today: NaiveDate) -> WindowCheck {
        let mut errors = Vec::new();

        if !(1..=12).contains(&month) {
            errors.push(format!("Mois invalide : {month}"));
            return WindowCheck {
                valid: false,
                errors,
            };
        }

        let candidate = ObjectivePeriod::new(year, month);
        let (earliest, latest) = self.bounds(today);

        if candidate < earliest {
            errors.push(format!(
                "Impossible de définir un objectif pour une période antérieure à {earliest} \
                 ({} mois maximum dans le passé)",
                self.months_back
            ));
        }

        if candidate > latest {
            errors.push(format!(
                "Impossible de définir un objectif pour une période supérieure à {} mois \
                 dans le futur (limite : {latest})",
                self.months_ahead
            ));
        }

        WindowCheck {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validate a period against the default window.
pub fn validate_objective_period(year: i32, month: u32, today: NaiveDate) -> WindowCheck {
    ObjectiveWindow::default().validate(year, month, today)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_concrete_scenario_mid_june() {
        let today = date(2025, 6, 15);

        assert!(validate_objective_period(2025, 3, today).valid);
        assert!(validate_objective_period(2025, 8, today).valid);

        let too_early = validate_objective_period(2025, 2, today);
        assert!(!too_early.valid);
        assert_eq!(too_early.errors.len(), 1);
        assert!(too_early.errors[0].contains("période antérieure"));
        assert!(too_early.errors[0].contains("03/2025"));

        let too_late = validate_objective_period(2025, 9, today);
        assert!(!too_late.valid);
        assert_eq!(too_late.errors.len(), 1);
        assert!(too_late.errors[0].contains("supérieure à 2 mois"));
        assert!(too_late.errors[0].contains("08/2025"));
    }

    #[test]
    fn test_current_month_is_valid() {
        let check = validate_objective_period(2025, 6, date(2025, 6, 30));
        assert!(check.valid);
        assert!(check.errors.is_empty());
    }

    #[test]
    fn test_bounds_roll_over_year_backwards() {
        let today = date(2025, 1, 31);
        let (earliest, latest) = ObjectiveWindow::default().bounds(today);
        assert_eq!(earliest, ObjectivePeriod::new(2024, 10));
        assert_eq!(latest, ObjectivePeriod::new(2025, 3));

        assert!(validate_objective_period(2024, 10, today).valid);
        assert!(!validate_objective_period(2024, 9, today).valid);
    }

    #[test]
    fn test_bounds_roll_over_year_forwards() {
        let today = date(2025, 11, 1);
        assert!(validate_objective_period(2026, 1, today).valid);
        assert!(!validate_objective_period(2026, 2, today).valid);
        assert!(validate_objective_period(2025, 8, today).valid);
        assert!(!validate_objective_period(2025, 7, today).valid);
    }

    #[test]
    fn test_day_of_month_does_not_matter() {
        // Month arithmetic only: the 31st of a month still allows three months back.
        let today = date(2025, 5, 31);
        assert!(validate_objective_period(2025, 2, today).valid);
        assert!(!validate_objective_period(2025, 1, today).valid);
    }

    #[test]
    fn test_invalid_month_is_reported() {
        let check = validate_objective_period(2025, 13, date(2025, 6, 15));
        assert!(!check.valid);
        assert_eq!(check.errors, vec!["Mois invalide : 13".to_string()]);
    }

    #[test]
    fn test_custom_window() {
        let window = ObjectiveWindow {
            months_back: 0,
            months_ahead: 0,
        };
        let today = date(2025, 6, 15);
        assert!(window.validate(2025, 6, today).valid);
        assert!(!window.validate(2025, 5, today).valid);
        assert!(!window.validate(2025, 7, today).valid);
    }

    #[test]
    fn test_period_display_and_shift() {
        let period = ObjectivePeriod::new(2025, 1);
        assert_eq!(period.shifted(-1), ObjectivePeriod::new(2024, 12));
        assert_eq!(period.shifted(12), ObjectivePeriod::new(2026, 1));
        assert_eq!(period.to_string(), "01/2025");
    }
}
