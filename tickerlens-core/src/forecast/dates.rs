//! Unified forecast-date generation.
//!
//! Every model aligns its output to the same future dates so results for the
//! same horizon can be overlaid. Dates start the calendar day after the last
//! historical bar and advance one calendar day per step.

use chrono::{Duration, NaiveDate};
use tracing::warn;

/// Generate `days` consecutive calendar dates starting the day after
/// `last_date`.
///
/// A `last_date` beyond `today` indicates a provider clock skew; the base is
/// clamped back to `today` with a warning so the forecast stays anchored in
/// the present instead of failing. `today` is an argument so callers pin it
/// in tests.
pub fn forecast_dates(last_date: NaiveDate, days: usize, today: NaiveDate) -> Vec<NaiveDate> {
    let base = if last_date > today {
        warn!(%last_date, %today, "last historical date is in the future, clamping forecast base");
        today
    } else {
        last_date
    };

    (1..=days as i64).map(|i| base + Duration::days(i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn dates_start_the_day_after_the_last_bar() {
        let dates = forecast_dates(date(2024, 3, 15), 3, date(2024, 6, 1));
        assert_eq!(
            dates,
            vec![date(2024, 3, 16), date(2024, 3, 17), date(2024, 3, 18)]
        );
    }

    #[test]
    fn dates_cross_month_boundaries() {
        let dates = forecast_dates(date(2024, 1, 30), 4, date(2024, 6, 1));
        assert_eq!(
            dates,
            vec![
                date(2024, 1, 31),
                date(2024, 2, 1),
                date(2024, 2, 2),
                date(2024, 2, 3)
            ]
        );
    }

    #[test]
    fn dates_are_strictly_increasing() {
        let dates = forecast_dates(date(2024, 2, 27), 10, date(2024, 6, 1));
        for pair in dates.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn future_last_bar_clamps_to_today() {
        let today = date(2024, 5, 10);
        let dates = forecast_dates(date(2024, 5, 20), 2, today);
        assert_eq!(dates, vec![date(2024, 5, 11), date(2024, 5, 12)]);
    }

    #[test]
    fn zero_days_yields_no_dates() {
        assert!(forecast_dates(date(2024, 3, 15), 0, date(2024, 6, 1)).is_empty());
    }
}
