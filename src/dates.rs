use chrono::{Datelike, Days, Local, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

use crate::error::{Result, TallyError};

/// Seconds since the epoch for a wall-clock time in the local timezone.
pub fn local_timestamp(dt: NaiveDateTime) -> Result<i64> {
    Local
        .from_local_datetime(&dt)
        .earliest()
        .map(|d| d.timestamp())
        .ok_or_else(|| TallyError::InvalidDate(format!("{dt} does not exist in the local timezone")))
}

/// Seconds since the epoch for local midnight of `date`.
pub fn start_of_day(date: NaiveDate) -> Result<i64> {
    local_timestamp(date.and_time(NaiveTime::default()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| TallyError::InvalidDate(format!("'{raw}' (use YYYY-MM-DD)")))
}

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(TallyError::InvalidDate(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Timestamp bounds covering `start` 00:00:00 through `end` 23:59:59.
    pub fn timestamp_bounds(&self) -> Result<(i64, i64)> {
        let lower = start_of_day(self.start)?;
        let next_day = self
            .end
            .checked_add_days(Days::new(1))
            .ok_or_else(|| TallyError::InvalidDate(format!("{} is out of range", self.end)))?;
        Ok((lower, start_of_day(next_day)? - 1))
    }
}

/// How the user picked the reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Between(NaiveDate, NaiveDate),
    ThisMonth,
    LastMonth,
    LastWeek,
}

impl Period {
    /// Resolve against `today`. "This month" begins on `cycle_start_day`.
    pub fn resolve(&self, today: NaiveDate, cycle_start_day: u32) -> Result<DateRange> {
        match *self {
            Period::Between(start, end) => DateRange::new(start, end),
            Period::LastMonth => DateRange::new(today - Days::new(31), today),
            Period::LastWeek => DateRange::new(today - Days::new(7), today),
            Period::ThisMonth => DateRange::new(cycle_start(today, cycle_start_day)?, today),
        }
    }
}

fn cycle_start(today: NaiveDate, day: u32) -> Result<NaiveDate> {
    let bad_day = || TallyError::Settings(format!("cycle_start_day {day} must be between 1 and 28"));
    if !(1..=28).contains(&day) {
        return Err(bad_day());
    }
    let this_month = today.with_day(day).ok_or_else(bad_day)?;
    if this_month <= today {
        return Ok(this_month);
    }
    this_month
        .checked_sub_months(Months::new(1))
        .ok_or_else(|| TallyError::InvalidDate(format!("no cycle start before {today}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(d("2025-09-01"), NaiveDate::from_ymd_opt(2025, 9, 1).unwrap());
        assert!(parse_date("09/01/2025").is_err());
        assert!(parse_date("2025-02-30").is_err());
    }

    #[test]
    fn test_range_rejects_reversed_dates() {
        assert!(DateRange::new(d("2025-09-15"), d("2025-09-01")).is_err());
        assert!(DateRange::new(d("2025-09-01"), d("2025-09-01")).is_ok());
    }

    #[test]
    fn test_bounds_cover_whole_end_day() {
        let range = DateRange::new(d("2025-09-01"), d("2025-09-15")).unwrap();
        let (lower, upper) = range.timestamp_bounds().unwrap();
        assert_eq!(lower, start_of_day(d("2025-09-01")).unwrap());
        assert_eq!(upper + 1, start_of_day(d("2025-09-16")).unwrap());
        let last_second = local_timestamp(d("2025-09-15").and_hms_opt(23, 59, 59).unwrap()).unwrap();
        assert_eq!(upper, last_second);
    }

    #[test]
    fn test_relative_periods() {
        let today = d("2025-09-20");
        let week = Period::LastWeek.resolve(today, 3).unwrap();
        assert_eq!((week.start(), week.end()), (d("2025-09-13"), today));
        let month = Period::LastMonth.resolve(today, 3).unwrap();
        assert_eq!(month.start(), d("2025-08-20"));
    }

    #[test]
    fn test_this_month_uses_cycle_day() {
        let range = Period::ThisMonth.resolve(d("2025-09-20"), 3).unwrap();
        assert_eq!(range.start(), d("2025-09-03"));
        let early = Period::ThisMonth.resolve(d("2025-09-02"), 3).unwrap();
        assert_eq!(early.start(), d("2025-08-03"));
        let january = Period::ThisMonth.resolve(d("2025-01-01"), 3).unwrap();
        assert_eq!(january.start(), d("2024-12-03"));
    }

    #[test]
    fn test_cycle_day_out_of_range() {
        assert!(Period::ThisMonth.resolve(d("2025-09-20"), 31).is_err());
        assert!(Period::ThisMonth.resolve(d("2025-09-20"), 0).is_err());
    }
}
