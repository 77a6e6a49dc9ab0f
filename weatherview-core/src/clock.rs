use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::fmt::Debug;

/// Offset of the fixed display timezone (Brasília, no daylight saving).
pub const UTC_OFFSET_HOURS: i64 = -3;

/// Source of the current instant.
pub trait Clock: Send + Sync + Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date at the display timezone.
    fn today(&self) -> NaiveDate {
        let now = self.now();
        local_date(now).unwrap_or_else(|| now.date_naive())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Calendar date of `instant` at the display timezone, or `None` when the
/// shift leaves chrono's representable range.
pub fn local_date(instant: DateTime<Utc>) -> Option<NaiveDate> {
    instant
        .checked_add_signed(Duration::hours(UTC_OFFSET_HOURS))
        .map(|local| local.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_date_lags_utc_late_at_night() {
        let instant = Utc.with_ymd_and_hms(2026, 10, 20, 2, 0, 0).unwrap();
        assert_eq!(local_date(instant), NaiveDate::from_ymd_opt(2026, 10, 19));
    }

    #[test]
    fn local_date_at_the_range_floor_is_none() {
        assert_eq!(local_date(DateTime::<Utc>::MIN_UTC), None);
        assert!(local_date(DateTime::<Utc>::MAX_UTC).is_some());
    }

    #[test]
    fn clock_at_the_range_floor_still_has_a_today() {
        let clock = FixedClock(DateTime::<Utc>::MIN_UTC);
        assert_eq!(clock.today(), DateTime::<Utc>::MIN_UTC.date_naive());
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2026, 3, 5, 15, 0, 0).unwrap());
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
    }
}
