use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::models::{weekday_or_default, Booking, Cadence, Schedule};

/// Compute the next occurrence of a recurring booking, normalized to
/// midnight. `today` is the injected clock value and is only consulted on
/// the first-scheduling branch (`basis` absent); after a completion the
/// projection runs purely off `basis`.
pub fn next_occurrence(
    preferred_day: Weekday,
    cadence: Cadence,
    basis: Option<NaiveDate>,
    today: NaiveDate,
) -> NaiveDateTime {
    let date = match basis {
        None => first_occurrence(preferred_day, cadence, today),
        Some(basis) => projected_occurrence(preferred_day, cadence, basis),
    };
    date.and_time(NaiveTime::MIN)
}

/// The derived "next scheduled date" shown and filtered on. One-time
/// bookings bypass the calculator: the stored date is the answer,
/// unconditionally.
pub fn next_scheduled_date(booking: &Booking, today: NaiveDate) -> NaiveDateTime {
    match &booking.schedule {
        Schedule::OneTime { date, .. } => date.and_time(NaiveTime::MIN),
        Schedule::Recurring { cadence, day, .. } => next_occurrence(
            weekday_or_default(day),
            *cadence,
            booking.last_completed_date.map(|dt| dt.date()),
            today,
        ),
    }
}

fn first_occurrence(preferred_day: Weekday, cadence: Cadence, today: NaiveDate) -> NaiveDate {
    match cadence {
        Cadence::Weekly | Cadence::Biweekly => {
            let delta = preferred_day.num_days_from_monday() as i64
                - today.weekday().num_days_from_monday() as i64;
            // Same day counts as already passed: push a full week out.
            let days = if delta <= 0 { delta + 7 } else { delta };
            today + Duration::days(days)
        }
        Cadence::Monthly => {
            let candidate = first_weekday_of_month(today.year(), today.month(), preferred_day);
            if candidate.day() < today.day() {
                let (year, month) = month_after(today.year(), today.month());
                first_weekday_of_month(year, month, preferred_day)
            } else {
                candidate
            }
        }
    }
}

fn projected_occurrence(preferred_day: Weekday, cadence: Cadence, basis: NaiveDate) -> NaiveDate {
    match cadence {
        Cadence::Weekly => basis + Duration::days(7),
        Cadence::Biweekly => basis + Duration::days(14),
        // Monthly always lands in the month after the basis, never the same
        // month, regardless of where the basis sat within its month.
        Cadence::Monthly => {
            let (year, month) = month_after(basis.year(), basis.month());
            first_weekday_of_month(year, month, preferred_day)
        }
    }
}

fn first_weekday_of_month(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or_default();
    let offset = (weekday.num_days_from_monday() as i64
        - first.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    first + Duration::days(offset)
}

fn month_after(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    // ── First scheduling (no basis) ──

    #[test]
    fn test_weekly_first_same_day_pushes_full_week() {
        // 2024-11-20 is a Wednesday; same-day counts as already passed.
        let next = next_occurrence(Weekday::Wed, Cadence::Weekly, None, d("2024-11-20"));
        assert_eq!(next, dt("2024-11-27 00:00:00"));
    }

    #[test]
    fn test_weekly_first_later_in_week() {
        // Wednesday asking for Friday: two days out.
        let next = next_occurrence(Weekday::Fri, Cadence::Weekly, None, d("2024-11-20"));
        assert_eq!(next, dt("2024-11-22 00:00:00"));
    }

    #[test]
    fn test_weekly_first_earlier_in_week_wraps() {
        // Wednesday asking for Monday: wraps to next week's Monday.
        let next = next_occurrence(Weekday::Mon, Cadence::Weekly, None, d("2024-11-20"));
        assert_eq!(next, dt("2024-11-25 00:00:00"));
    }

    #[test]
    fn test_biweekly_first_matches_weekly_first() {
        // First scheduling ignores the cadence gap; it only finds the
        // nearest strictly-future weekday.
        let weekly = next_occurrence(Weekday::Sat, Cadence::Weekly, None, d("2024-11-20"));
        let biweekly = next_occurrence(Weekday::Sat, Cadence::Biweekly, None, d("2024-11-20"));
        assert_eq!(weekly, biweekly);
        assert_eq!(weekly, dt("2024-11-23 00:00:00"));
    }

    #[test]
    fn test_monthly_first_not_yet_passed() {
        // First Friday of Nov 2024 is the 1st; on the 1st it has not passed.
        let next = next_occurrence(Weekday::Fri, Cadence::Monthly, None, d("2024-11-01"));
        assert_eq!(next, dt("2024-11-01 00:00:00"));
    }

    #[test]
    fn test_monthly_first_already_passed_rolls_over() {
        // First Friday of Nov 2024 (the 1st) is behind the 20th, so the
        // occurrence moves to the first Friday of December.
        let next = next_occurrence(Weekday::Fri, Cadence::Monthly, None, d("2024-11-20"));
        assert_eq!(next, dt("2024-12-06 00:00:00"));
    }

    #[test]
    fn test_monthly_first_later_in_month_stays() {
        // First Saturday of Nov 2024 is the 2nd, still ahead of the 1st.
        let next = next_occurrence(Weekday::Sat, Cadence::Monthly, None, d("2024-11-01"));
        assert_eq!(next, dt("2024-11-02 00:00:00"));
    }

    #[test]
    fn test_monthly_first_december_rolls_into_january() {
        // First Monday of Dec 2024 is the 2nd; by the 15th it has passed.
        let next = next_occurrence(Weekday::Mon, Cadence::Monthly, None, d("2024-12-15"));
        assert_eq!(next, dt("2025-01-06 00:00:00"));
    }

    // ── Projection from a completion basis ──

    #[test]
    fn test_weekly_projection_adds_seven_days() {
        let next = next_occurrence(
            Weekday::Wed,
            Cadence::Weekly,
            Some(d("2024-11-20")),
            d("2024-11-20"),
        );
        assert_eq!(next, dt("2024-11-27 00:00:00"));
    }

    #[test]
    fn test_biweekly_projection_adds_fourteen_days() {
        let next = next_occurrence(
            Weekday::Wed,
            Cadence::Biweekly,
            Some(d("2024-11-20")),
            d("2024-11-20"),
        );
        assert_eq!(next, dt("2024-12-04 00:00:00"));
    }

    #[test]
    fn test_weekly_projection_ignores_today() {
        // With a basis, the clock plays no part at all.
        let a = next_occurrence(
            Weekday::Mon,
            Cadence::Weekly,
            Some(d("2024-11-04")),
            d("2024-11-05"),
        );
        let b = next_occurrence(
            Weekday::Mon,
            Cadence::Weekly,
            Some(d("2024-11-04")),
            d("2025-06-01"),
        );
        assert_eq!(a, b);
        assert_eq!(a, dt("2024-11-11 00:00:00"));
    }

    #[test]
    fn test_monthly_projection_lands_in_following_month() {
        // Basis late in November, preferred Friday: first Friday of
        // December (the 6th) — earlier in its month than the basis's 25th,
        // but still strictly the following month.
        let next = next_occurrence(
            Weekday::Fri,
            Cadence::Monthly,
            Some(d("2024-11-25")),
            d("2024-11-25"),
        );
        assert_eq!(next, dt("2024-12-06 00:00:00"));
    }

    #[test]
    fn test_monthly_projection_december_to_january() {
        let next = next_occurrence(
            Weekday::Tue,
            Cadence::Monthly,
            Some(d("2024-12-10")),
            d("2024-12-10"),
        );
        assert_eq!(next, dt("2025-01-07 00:00:00"));
    }

    #[test]
    fn test_monthly_projection_never_same_month() {
        // Even a basis on the 1st moves to the next month.
        let next = next_occurrence(
            Weekday::Fri,
            Cadence::Monthly,
            Some(d("2024-11-01")),
            d("2024-11-01"),
        );
        assert_eq!(next, dt("2024-12-06 00:00:00"));
    }

    #[test]
    fn test_determinism() {
        for _ in 0..3 {
            assert_eq!(
                next_occurrence(Weekday::Thu, Cadence::Biweekly, Some(d("2025-02-06")), d("2025-03-01")),
                dt("2025-02-20 00:00:00"),
            );
        }
    }

    #[test]
    fn test_result_is_midnight() {
        let next = next_occurrence(Weekday::Sun, Cadence::Weekly, None, d("2024-11-20"));
        assert_eq!(next.time(), NaiveTime::MIN);
    }

    // ── next_scheduled_date over bookings ──

    use crate::models::{
        Booking, BookingStatus, CustomerSnapshot, ProviderSnapshot, Schedule, ServiceKind,
    };

    fn booking_with(schedule: Schedule, last_completed: Option<NaiveDateTime>) -> Booking {
        let now = dt("2024-11-01 08:00:00");
        Booking {
            id: "bk-1".to_string(),
            customer: CustomerSnapshot {
                id: "cust-1".to_string(),
                name: "Alice".to_string(),
                phone: "+15551110000".to_string(),
                photo_url: None,
            },
            provider: ProviderSnapshot {
                id: "prov-1".to_string(),
                name: "Maria".to_string(),
                phone: "+15552220000".to_string(),
                photo_url: None,
                hourly_rate: 35.0,
            },
            service: ServiceKind::StandardCleaning,
            schedule,
            last_completed_date: last_completed,
            status: BookingStatus::Confirmed,
            instructions: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_one_time_bypasses_calculator() {
        let booking = booking_with(
            Schedule::OneTime {
                date: d("2024-11-03"),
                time: "14:00".to_string(),
            },
            None,
        );
        // Stored date wins even though it is behind "today".
        assert_eq!(
            next_scheduled_date(&booking, d("2024-12-25")),
            dt("2024-11-03 00:00:00"),
        );
    }

    #[test]
    fn test_recurring_never_completed_projects_from_today() {
        let booking = booking_with(
            Schedule::Recurring {
                cadence: Cadence::Weekly,
                day: "wednesday".to_string(),
                hour: "09:00".to_string(),
            },
            None,
        );
        assert_eq!(
            next_scheduled_date(&booking, d("2024-11-20")),
            dt("2024-11-27 00:00:00"),
        );
    }

    #[test]
    fn test_recurring_completed_projects_from_basis() {
        let booking = booking_with(
            Schedule::Recurring {
                cadence: Cadence::Biweekly,
                day: "wednesday".to_string(),
                hour: "09:00".to_string(),
            },
            Some(dt("2024-11-20 16:45:00")),
        );
        // Basis date (not its time-of-day) plus fourteen days.
        assert_eq!(
            next_scheduled_date(&booking, d("2024-11-21")),
            dt("2024-12-04 00:00:00"),
        );
    }

    #[test]
    fn test_recurring_bad_weekday_degrades_to_monday() {
        let booking = booking_with(
            Schedule::Recurring {
                cadence: Cadence::Weekly,
                day: "caturday".to_string(),
                hour: "09:00".to_string(),
            },
            None,
        );
        // 2024-11-20 is a Wednesday; next Monday is the 25th.
        assert_eq!(
            next_scheduled_date(&booking, d("2024-11-20")),
            dt("2024-11-25 00:00:00"),
        );
    }
}
