//! Windowed report counts and dashboard stats assembly.
//!
//! Counts are taken over calendar windows in the time zone of the caller's `now`:
//! - **today**: reports whose local date is `now`'s date
//! - **this week**: reports on or after Monday of `now`'s ISO week
//! - **this month**: reports on or after the 1st of `now`'s month
//! - **by day**: per-date counts over a trailing window, newest first
//!
//! Windows only have a lower bound, so reports timestamped after `now` still count
//! toward the week, month and by-day figures.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeZone, Utc};
use log::info;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{top_zones, ReportPoint, Zone, ZoneConfig};

/// A report location with its creation time.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TimedReport {
    pub point: ReportPoint,
    pub created_at: DateTime<Utc>,
}

impl TimedReport {
    pub fn new(point: ReportPoint, created_at: DateTime<Utc>) -> Self {
        Self { point, created_at }
    }
}

/// Number of reports created on one local date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Configuration for dashboard stats.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StatsConfig {
    /// Trailing window for the by-day series, in days before today.
    /// Default: 30
    pub by_day_window_days: u32,

    /// Zone clustering settings for the top zones list.
    pub zones: ZoneConfig,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            by_day_window_days: 30,
            zones: ZoneConfig::default(),
        }
    }
}

/// Aggregate figures shown on the admin dashboard.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DashboardStats {
    pub total_reports: u32,
    pub today: u32,
    pub this_week: u32,
    pub this_month: u32,
    /// Newest date first
    pub by_day: Vec<DayCount>,
    /// Ranked and labeled
    pub top_zones: Vec<Zone>,
}

impl DashboardStats {
    /// Compute every dashboard figure from one snapshot of reports.
    ///
    /// `now` anchors the windows and supplies the time zone that report
    /// timestamps are converted into before taking their calendar date.
    ///
    /// # Example
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use report_hotspots::{DashboardStats, ReportPoint, StatsConfig, TimedReport};
    ///
    /// let now = Utc.with_ymd_and_hms(2024, 5, 15, 12, 0, 0).unwrap();
    /// let reports = vec![
    ///     TimedReport::new(ReportPoint::new(19.4326, -99.1332), now),
    ///     TimedReport::new(ReportPoint::new(19.4327, -99.1333), now),
    /// ];
    ///
    /// let stats = DashboardStats::compute(&reports, &now, &StatsConfig::default());
    /// assert_eq!(stats.today, 2);
    /// assert_eq!(stats.top_zones[0].count, 2);
    /// ```
    pub fn compute<Tz: TimeZone>(
        reports: &[TimedReport],
        now: &DateTime<Tz>,
        config: &StatsConfig,
    ) -> Self {
        let start = std::time::Instant::now();
        let tz = now.timezone();
        let today = now.date_naive();

        let points: Vec<ReportPoint> = reports.iter().map(|r| r.point.clone()).collect();

        let stats = Self {
            total_reports: reports.len() as u32,
            today: count_on(reports, today, &tz),
            this_week: count_since(reports, week_start(today), &tz),
            this_month: count_since(reports, month_start(today), &tz),
            by_day: count_by_day(reports, today, config.by_day_window_days, &tz),
            top_zones: top_zones(&points, &config.zones),
        };

        info!(
            "Dashboard stats: {} total, {} today, {} this week, {} this month, {} days, {} zones in {:?}",
            stats.total_reports,
            stats.today,
            stats.this_week,
            stats.this_month,
            stats.by_day.len(),
            stats.top_zones.len(),
            start.elapsed()
        );

        stats
    }
}

fn local_date<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(NaiveDate::MIN)
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Count reports created on `date` (local to `tz`).
pub fn count_on<Tz: TimeZone>(reports: &[TimedReport], date: NaiveDate, tz: &Tz) -> u32 {
    reports
        .iter()
        .filter(|r| local_date(&r.created_at, tz) == date)
        .count() as u32
}

/// Count reports created on or after the start of `since` (local to `tz`).
pub fn count_since<Tz: TimeZone>(reports: &[TimedReport], since: NaiveDate, tz: &Tz) -> u32 {
    reports
        .iter()
        .filter(|r| local_date(&r.created_at, tz) >= since)
        .count() as u32
}

/// Per-date report counts for dates on or after `today - window_days`, newest first.
///
/// Dates without reports are omitted.
pub fn count_by_day<Tz: TimeZone>(
    reports: &[TimedReport],
    today: NaiveDate,
    window_days: u32,
    tz: &Tz,
) -> Vec<DayCount> {
    let first_day = today
        .checked_sub_days(Days::new(u64::from(window_days)))
        .unwrap_or(NaiveDate::MIN);

    let mut days: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for report in reports {
        let date = local_date(&report.created_at, tz);
        if date >= first_day {
            *days.entry(date).or_insert(0) += 1;
        }
    }

    days.into_iter()
        .rev()
        .map(|(date, count)| DayCount { date, count })
        .collect()
}
