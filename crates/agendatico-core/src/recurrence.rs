//! Expansion of a recurring event submission into its occurrence timestamps.
//!
//! The same enumeration runs on the API client (for immediate feedback) and on
//! the server (authoritative gate), so it lives here and nowhere else. The
//! walk is bounded twice: a computation cap of 30 steps that protects against
//! pathological end dates, and a business ceiling of 20 occurrences past
//! which the whole submission is rejected.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Most occurrences a single recurring submission may create.
pub const OCCURRENCE_CEILING: usize = 20;

/// Hard stop for the expansion walk, independent of the business ceiling.
/// With the initial occurrence counted before the cap check, the reported
/// count can reach at most `EXPANSION_ITERATION_CAP + 1`.
pub const EXPANSION_ITERATION_CAP: usize = 30;

/// How far apart consecutive occurrences are.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Weekly,
    Monthly,
}

impl RecurrenceFrequency {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for RecurrenceFrequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RecurrenceFrequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(CoreError::ParseError(format!(
                "unknown recurrence frequency: {other}"
            ))),
        }
    }
}

/// Transient recurrence input attached to one event submission. Never
/// persisted; consumed entirely while expanding the submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    pub frequency: RecurrenceFrequency,
    pub end_date: NaiveDate,
}

impl RecurrenceRule {
    /// ## Summary
    /// Enumerates the occurrence start timestamps this rule produces from
    /// `starts_at`, the initial occurrence included.
    ///
    /// The cursor advances by exactly 7 calendar days (weekly) or by one
    /// calendar month (monthly) and keeps emitting while its calendar date is
    /// on or before `end_date`. Monthly steps clamp to the last day of the
    /// target month and continue from the clamped date, so Jan 31 walks
    /// Feb 28, Mar 28, Apr 28. An `end_date` not strictly after the start
    /// date yields no occurrences at all.
    #[must_use]
    pub fn occurrences(&self, starts_at: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        if self.end_date <= starts_at.date_naive() {
            return Vec::new();
        }

        let mut out = Vec::new();
        let mut cursor = starts_at;

        while cursor.date_naive() <= self.end_date && out.len() <= EXPANSION_ITERATION_CAP {
            out.push(cursor);

            let next = match self.frequency {
                RecurrenceFrequency::Weekly => cursor.checked_add_days(Days::new(7)),
                RecurrenceFrequency::Monthly => cursor.checked_add_months(Months::new(1)),
            };
            let Some(next) = next else { break };
            cursor = next;
        }

        out
    }

    /// ## Summary
    /// Counts the occurrences this rule would create from `starts_at`.
    ///
    /// Zero means "not actually recurring" and callers fall back to a single
    /// event. Due to the computation cap the result never exceeds 31.
    #[must_use]
    pub fn occurrence_count(&self, starts_at: DateTime<Utc>) -> usize {
        self.occurrences(starts_at).len()
    }
}

/// ## Summary
/// Rejects a computed occurrence count that exceeds the business ceiling.
///
/// The message names the literal computed count; clients display it inline
/// next to the recurrence controls.
///
/// ## Errors
/// Returns `ValidationError` when `count > OCCURRENCE_CEILING`.
pub fn enforce_occurrence_ceiling(count: usize) -> CoreResult<()> {
    if count > OCCURRENCE_CEILING {
        return Err(CoreError::ValidationError(format!(
            "No se pueden crear más de {OCCURRENCE_CEILING} eventos de forma periódica. \
             Esta configuración crearía {count} eventos."
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    #[test]
    fn end_date_equal_to_start_yields_nothing() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: date(2025, 1, 1),
        };
        assert_eq!(rule.occurrence_count(utc(2025, 1, 1, 0)), 0);
    }

    #[test]
    fn end_date_before_start_yields_nothing() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Monthly,
            end_date: date(2024, 12, 31),
        };
        assert_eq!(rule.occurrence_count(utc(2025, 1, 1, 10)), 0);
    }

    #[test]
    fn weekly_counts_both_boundary_days() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: date(2025, 1, 8),
        };
        let occurrences = rule.occurrences(utc(2025, 1, 1, 19));
        assert_eq!(
            occurrences,
            vec![utc(2025, 1, 1, 19), utc(2025, 1, 8, 19)]
        );
    }

    #[test]
    fn weekly_keeps_time_of_day() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: date(2025, 2, 1),
        };
        for occurrence in rule.occurrences(utc(2025, 1, 3, 21)) {
            assert_eq!(occurrence.time(), utc(2025, 1, 3, 21).time());
        }
    }

    #[test]
    fn monthly_clamps_to_end_of_february_and_stays_clamped() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Monthly,
            end_date: date(2025, 4, 30),
        };
        let occurrences = rule.occurrences(utc(2025, 1, 31, 18));
        assert_eq!(
            occurrences,
            vec![
                utc(2025, 1, 31, 18),
                utc(2025, 2, 28, 18),
                utc(2025, 3, 28, 18),
                utc(2025, 4, 28, 18),
            ]
        );
    }

    #[test]
    fn computation_cap_bounds_far_future_end_dates() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: date(2035, 1, 1),
        };
        assert_eq!(
            rule.occurrence_count(utc(2025, 1, 1, 0)),
            EXPANSION_ITERATION_CAP + 1
        );
    }

    #[test]
    fn ceiling_allows_exactly_twenty() {
        assert!(enforce_occurrence_ceiling(OCCURRENCE_CEILING).is_ok());
    }

    #[test]
    fn ceiling_violation_names_the_computed_count() {
        let err = enforce_occurrence_ceiling(23).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("crearía 23 eventos"), "{message}");
    }

    #[test]
    fn six_weeks_has_seven_occurrences() {
        let rule = RecurrenceRule {
            frequency: RecurrenceFrequency::Weekly,
            end_date: date(2025, 2, 12),
        };
        assert_eq!(rule.occurrence_count(utc(2025, 1, 1, 9)), 7);
    }
}
