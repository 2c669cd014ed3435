//! Follow-up dose dates for multi-dose vaccines.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

use crate::{BookingSummary, DoseSchedule};

/// Dates of doses `2..=dose_count`, each `interval_days` after the previous
/// one and pushed forward past weekends.
///
/// Returns an empty list for `dose_count <= 1`. Inputs are not validated.
pub fn derive_dose_dates(first: NaiveDate, dose_count: u32, interval_days: u32) -> Vec<NaiveDate> {
    let follow_ups = dose_count.saturating_sub(1) as usize;
    let mut dates = Vec::new();
    let mut previous = first;

    for _ in 0..follow_ups {
        let Some(candidate) = previous.checked_add_signed(Duration::days(i64::from(interval_days)))
        else {
            break;
        };
        previous = next_weekday(candidate);
        dates.push(previous);
    }

    dates
}

/// The date itself when it is a weekday, otherwise the following Monday.
pub fn next_weekday(date: NaiveDate) -> NaiveDate {
    let mut current = date;
    while is_weekend(current) {
        match current.succ_opt() {
            Some(next) => current = next,
            None => break,
        }
    }
    current
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Follow-up appointments for the summary's vaccine and first dose date.
///
/// Each entry inherits the summary's time and center. Empty when either the
/// vaccine or the first dose date is missing.
pub fn derive_dose_schedule(summary: &BookingSummary) -> Vec<DoseSchedule> {
    let (Some(vaccine), Some(first)) = (summary.vaccine.as_ref(), summary.first_dose_date) else {
        return Vec::new();
    };
    if !vaccine.has_valid_dosage() {
        log::warn!("vaccine {} has unsupported dosage {}", vaccine.id, vaccine.dosage);
        return Vec::new();
    }

    let center_id = summary.center.as_ref().map(|center| center.id.clone());
    let schedules: Vec<DoseSchedule> = derive_dose_dates(first, vaccine.dosage, vaccine.duration)
        .into_iter()
        .map(|date| DoseSchedule {
            date: Some(date),
            time: summary.time,
            center_id: center_id.clone(),
        })
        .collect();

    log::debug!(
        "derived {} follow-up doses for vaccine {} from {first}",
        schedules.len(),
        vaccine.id
    );
    schedules
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Center, Vaccine};
    use chrono::NaiveTime;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn friday_plus_one_day_lands_on_monday() {
        let friday = date(2024, 5, 3);
        assert_eq!(derive_dose_dates(friday, 2, 1), vec![date(2024, 5, 6)]);
    }

    #[test]
    fn returns_one_date_per_follow_up_dose() {
        for (dosage, duration) in [(1, 7), (2, 21), (3, 28), (5, 1), (4, 0)] {
            let first = date(2024, 1, 10);
            let dates = derive_dose_dates(first, dosage, duration);
            assert_eq!(dates.len(), dosage as usize - 1);

            let mut previous = first;
            for current in dates {
                assert!(current >= previous + Duration::days(i64::from(duration)));
                assert!(!is_weekend(current), "{current} falls on a weekend");
                previous = current;
            }
        }
    }

    #[test]
    fn zero_doses_yield_nothing() {
        assert!(derive_dose_dates(date(2024, 1, 10), 0, 30).is_empty());
    }

    #[test]
    fn weekend_shift_carries_into_following_doses() {
        // Wed + 3 = Sat -> Mon 15th, Mon + 3 = Thu 18th.
        let dates = derive_dose_dates(date(2024, 1, 10), 3, 3);
        assert_eq!(dates, vec![date(2024, 1, 15), date(2024, 1, 18)]);
    }

    #[test]
    fn next_weekday_keeps_weekdays() {
        assert_eq!(next_weekday(date(2024, 5, 1)), date(2024, 5, 1));
        assert_eq!(next_weekday(date(2024, 5, 4)), date(2024, 5, 6));
        assert_eq!(next_weekday(date(2024, 5, 5)), date(2024, 5, 6));
    }

    #[test]
    fn schedule_entries_inherit_time_and_center() {
        let summary = BookingSummary {
            vaccine: Some(Vaccine {
                id: "v".into(),
                name: "HPV".into(),
                price: 50.0,
                dosage: 3,
                duration: 60,
                description: None,
            }),
            first_dose_date: Some(date(2024, 2, 1)),
            time: NaiveTime::from_hms_opt(8, 0, 0),
            center: Some(Center {
                id: "c-9".into(),
                name: "District 1".into(),
                address: None,
            }),
            ..BookingSummary::default()
        };

        let schedule = derive_dose_schedule(&summary);
        assert_eq!(schedule.len(), 2);
        assert!(schedule
            .iter()
            .all(|dose| dose.center_id.as_deref() == Some("c-9") && dose.time == summary.time));
    }

    #[test]
    fn schedule_is_empty_for_unsupported_dosage() {
        let summary = BookingSummary {
            vaccine: Some(Vaccine {
                id: "v".into(),
                name: "Bogus".into(),
                price: 1.0,
                dosage: u32::MAX,
                duration: 1,
                description: None,
            }),
            first_dose_date: Some(date(2024, 2, 1)),
            ..BookingSummary::default()
        };
        assert!(derive_dose_schedule(&summary).is_empty());
    }

    #[test]
    fn schedule_is_empty_without_first_date() {
        assert!(derive_dose_schedule(&BookingSummary::default()).is_empty());
    }
}
