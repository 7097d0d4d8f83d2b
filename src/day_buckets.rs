//! Today / yesterday grouping for list screens.
//!
//! Days are calendar days in the caller's time zone, never a rolling 24h window:
//! a record stamped at 00:01 today belongs to today even if "now" is 23:59.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

/// Anything carrying a creation instant.
pub trait Timestamped {
    /// `None` when the timestamp is missing or could not be decoded.
    fn created_at(&self) -> Option<DateTime<Utc>>;
}

impl<T: Timestamped + ?Sized> Timestamped for &T {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        (**self).created_at()
    }
}

/// Records created today and yesterday, input order preserved in each.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBuckets<T> {
    pub today: Vec<T>,
    pub yesterday: Vec<T>,
}

impl<T> Default for DayBuckets<T> {
    fn default() -> Self {
        Self {
            today: Vec::new(),
            yesterday: Vec::new(),
        }
    }
}

impl<T> DayBuckets<T> {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.yesterday.is_empty()
    }
}

/// Group by the device's local calendar day.
pub fn group_by_day<T, I>(records: I) -> DayBuckets<T>
where
    T: Timestamped,
    I: IntoIterator<Item = T>,
{
    group_by_day_at(records, &Local::now())
}

/// Group by calendar day in `now`'s time zone.
///
/// Records from any other day, or without a timestamp, are dropped.
pub fn group_by_day_at<T, I, Tz>(records: I, now: &DateTime<Tz>) -> DayBuckets<T>
where
    T: Timestamped,
    I: IntoIterator<Item = T>,
    Tz: TimeZone,
{
    let tz = now.timezone();
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut buckets = DayBuckets::default();
    for record in records {
        let Some(created) = record.created_at() else {
            continue;
        };
        let day = created.with_timezone(&tz).date_naive();
        if day == today {
            buckets.today.push(record);
        } else if Some(day) == yesterday {
            buckets.yesterday.push(record);
        }
    }
    buckets
}

/// Heading shown above the lists, e.g. "Monday, October 19".
pub fn formatted_today<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%A, %B %-d").to_string()
}

/// Inclusive UTC bounds covering `start` 00:00:00 through `end` 23:59:59.999
/// in `tz`. Returns `None` if a bound does not exist in that zone.
pub fn local_day_range<Tz: TimeZone>(
    start: NaiveDate,
    end: NaiveDate,
    tz: &Tz,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    let last_instant = NaiveTime::from_hms_milli_opt(23, 59, 59, 999)?;
    let from = tz
        .from_local_datetime(&start.and_time(midnight))
        .earliest()?;
    let to = tz.from_local_datetime(&end.and_time(last_instant)).latest()?;
    Some((from.with_timezone(&Utc), to.with_timezone(&Utc)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use chrono_tz::Tz;

    struct Entry {
        name: &'static str,
        at: Option<DateTime<Utc>>,
    }

    impl Timestamped for Entry {
        fn created_at(&self) -> Option<DateTime<Utc>> {
            self.at
        }
    }

    fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn names(v: &[&Entry]) -> Vec<&'static str> {
        v.iter().map(|e| e.name).collect()
    }

    #[test]
    fn test_today_yesterday_and_older() {
        let tz = chrono_tz::Europe::London;
        let now = tz.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).single().unwrap();
        let entries = vec![
            Entry { name: "a", at: Some(at(tz, 2026, 10, 19, 10, 0)) },
            Entry { name: "b", at: Some(at(tz, 2026, 10, 19, 23, 59)) },
            Entry { name: "c", at: Some(at(tz, 2026, 10, 18, 0, 1)) },
            Entry { name: "d", at: Some(at(tz, 2026, 10, 16, 12, 0)) },
        ];

        let buckets = group_by_day_at(&entries, &now);
        assert_eq!(names(&buckets.today), vec!["a", "b"]);
        assert_eq!(names(&buckets.yesterday), vec!["c"]);
    }

    #[test]
    fn test_preserves_input_order() {
        let tz = chrono_tz::America::New_York;
        let now = tz.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).single().unwrap();
        let entries = vec![
            Entry { name: "late", at: Some(at(tz, 2026, 3, 2, 8, 30)) },
            Entry { name: "y2", at: Some(at(tz, 2026, 3, 1, 22, 0)) },
            Entry { name: "early", at: Some(at(tz, 2026, 3, 2, 0, 5)) },
            Entry { name: "y1", at: Some(at(tz, 2026, 3, 1, 6, 0)) },
        ];

        let buckets = group_by_day_at(&entries, &now);
        assert_eq!(names(&buckets.today), vec!["late", "early"]);
        assert_eq!(names(&buckets.yesterday), vec!["y2", "y1"]);
    }

    #[test]
    fn test_uses_local_calendar_not_utc() {
        // 23:30 in Los Angeles on Oct 18 is already Oct 19 in UTC.
        let tz = chrono_tz::America::Los_Angeles;
        let now = tz.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).single().unwrap();
        let entries = vec![Entry { name: "night", at: Some(at(tz, 2026, 10, 18, 23, 30)) }];

        let buckets = group_by_day_at(&entries, &now);
        assert!(buckets.today.is_empty());
        assert_eq!(names(&buckets.yesterday), vec!["night"]);
    }

    #[test]
    fn test_calendar_day_not_rolling_window() {
        // 00:30 today: 23:00 last night is under an hour ago but still yesterday,
        // and 00:40 two days ago is under 48h ago but excluded.
        let tz = chrono_tz::Europe::Berlin;
        let now = tz.with_ymd_and_hms(2026, 6, 10, 0, 30, 0).single().unwrap();
        let entries = vec![
            Entry { name: "last-night", at: Some(at(tz, 2026, 6, 9, 23, 0)) },
            Entry { name: "two-days", at: Some(at(tz, 2026, 6, 8, 0, 40)) },
        ];

        let buckets = group_by_day_at(&entries, &now);
        assert!(buckets.today.is_empty());
        assert_eq!(names(&buckets.yesterday), vec!["last-night"]);
    }

    #[test]
    fn test_missing_timestamps_are_dropped() {
        let now = Utc::now();
        let entries = vec![
            Entry { name: "none", at: None },
            Entry { name: "now", at: Some(now) },
        ];
        let buckets = group_by_day_at(&entries, &now);
        assert_eq!(names(&buckets.today), vec!["now"]);
        assert!(buckets.yesterday.is_empty());
    }

    #[test]
    fn test_owned_records_and_local_clock() {
        let now = Utc::now();
        let entries = vec![
            Entry { name: "a", at: Some(now) },
            Entry { name: "old", at: Some(now - Duration::days(5)) },
        ];
        let buckets = group_by_day(entries);
        assert_eq!(buckets.today.len(), 1);
        assert_eq!(buckets.today[0].name, "a");
        assert!(buckets.yesterday.is_empty());
    }

    #[test]
    fn test_formatted_today() {
        let tz = chrono_tz::Europe::London;
        let now = tz.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).single().unwrap();
        assert_eq!(formatted_today(&now), "Monday, October 19");
    }

    #[test]
    fn test_local_day_range_bounds() {
        let tz = chrono_tz::Europe::London;
        let start = NaiveDate::from_ymd_opt(2026, 7, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2026, 7, 3).unwrap();
        let (from, to) = local_day_range(start, end, &tz).unwrap();
        // BST is UTC+1
        assert_eq!(from.to_rfc3339(), "2026-06-30T23:00:00+00:00");
        assert_eq!(to, at(tz, 2026, 7, 3, 23, 59) + Duration::milliseconds(59_999));
    }
}
