use crate::domain::entities::{Holiday, HolidayKind, OperationalHours};
use chrono::{
    DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Non-working dates.
///
/// An active concrete row blocks its date. An active recurring template
/// blocks its (month, day) in every year without a concrete row on that
/// date; a disabled concrete row overrides the template for its year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: BTreeSet<NaiveDate>,
    overridden: BTreeSet<NaiveDate>,
    templates: BTreeSet<(u32, u32)>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from every stored row, active or not
    pub fn from_holidays<'a>(holidays: impl IntoIterator<Item = &'a Holiday>) -> Self {
        let mut calendar = Self::new();
        for holiday in holidays {
            match (holiday.kind, holiday.is_active) {
                (HolidayKind::Concrete { date }, true) => {
                    calendar.dates.insert(date);
                }
                (HolidayKind::Concrete { date }, false) => {
                    calendar.overridden.insert(date);
                }
                (HolidayKind::RecurringTemplate { month, day }, true) => {
                    calendar.templates.insert((month, day));
                }
                (HolidayKind::RecurringTemplate { .. }, false) => {}
            }
        }
        calendar
    }

    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        if self.dates.contains(&date) {
            return true;
        }
        if self.overridden.contains(&date) {
            return false;
        }
        self.templates.contains(&(date.month(), date.day()))
    }

    /// Number of blocking entries: active dates plus active templates
    pub fn len(&self) -> usize {
        self.dates.len() + self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.templates.is_empty()
    }
}

/// Working interval `[start, end)` in business-timezone wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl LocalWindow {
    pub fn contains(&self, moment: NaiveDateTime) -> bool {
        self.start <= moment && moment < self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Immutable inputs of one due-date calculation: the weekly schedule, the
/// holidays and the business timezone offset.
///
/// Cloning is cheap; the schedule and holidays are shared snapshots.
#[derive(Debug, Clone)]
pub struct CalculationContext {
    hours: Arc<OperationalHours>,
    holidays: Arc<HolidayCalendar>,
    offset: FixedOffset,
    operational_hours_enabled: bool,
}

impl CalculationContext {
    pub fn new(
        hours: Arc<OperationalHours>,
        holidays: Arc<HolidayCalendar>,
        offset: FixedOffset,
    ) -> Self {
        Self {
            hours,
            holidays,
            offset,
            operational_hours_enabled: true,
        }
    }

    /// Toggle business-hours accounting; disabled means elapsed time
    pub fn with_operational_hours(mut self, enabled: bool) -> Self {
        self.operational_hours_enabled = enabled;
        self
    }

    pub fn operational_hours(&self) -> &OperationalHours {
        &self.hours
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn operational_hours_enabled(&self) -> bool {
        self.operational_hours_enabled
    }

    /// Wall-clock time in the business timezone
    pub fn to_local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        instant.with_timezone(&self.offset).naive_local()
    }

    pub fn to_utc(&self, local: NaiveDateTime) -> DateTime<Utc> {
        let utc = local - Duration::seconds(i64::from(self.offset.local_minus_utc()));
        Utc.from_utc_datetime(&utc)
    }

    /// Working sub-intervals of a business-timezone date, in order. Empty on
    /// disabled weekdays and active holidays.
    pub fn working_windows_on(&self, date: NaiveDate) -> Vec<LocalWindow> {
        if self.holidays.is_holiday(date) {
            return Vec::new();
        }

        let midnight = NaiveDateTime::new(date, NaiveTime::MIN);
        self.hours
            .windows_for_weekday(date.weekday())
            .into_iter()
            .map(|w| LocalWindow {
                start: midnight + Duration::seconds(i64::from(w.start.seconds())),
                end: midnight + Duration::seconds(i64::from(w.end.seconds())),
            })
            .collect()
    }

    pub fn daily_working_hours(&self, date: NaiveDate) -> f64 {
        let seconds: i64 = self
            .working_windows_on(date)
            .iter()
            .map(|w| w.duration().num_seconds())
            .sum();
        seconds as f64 / 3600.0
    }

    pub fn is_working_moment(&self, instant: DateTime<Utc>) -> bool {
        let local = self.to_local(instant);
        self.working_windows_on(local.date())
            .iter()
            .any(|w| w.contains(local))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::OperationalHoursConfig;
    use chrono::Weekday;

    fn weekdays() -> Vec<Weekday> {
        vec![Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
    }

    fn context(holidays: HolidayCalendar, offset_hours: i32) -> CalculationContext {
        let config = OperationalHoursConfig::standard("08:00", "17:00", &weekdays())
            .with_standard_break("12:00", "13:00");
        CalculationContext::new(
            Arc::new(OperationalHours::from_config(&config).unwrap()),
            Arc::new(holidays),
            FixedOffset::east_opt(offset_hours * 3600).unwrap(),
        )
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_windows_exclude_breaks() {
        let ctx = context(HolidayCalendar::new(), 0);
        // 2026-10-19 is a Monday
        let windows = ctx.working_windows_on(date(2026, 10, 19));
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, date(2026, 10, 19).and_hms_opt(8, 0, 0).unwrap());
        assert_eq!(windows[0].end, date(2026, 10, 19).and_hms_opt(12, 0, 0).unwrap());
        assert_eq!(windows[1].start, date(2026, 10, 19).and_hms_opt(13, 0, 0).unwrap());
        assert_eq!(ctx.daily_working_hours(date(2026, 10, 19)), 8.0);
    }

    #[test]
    fn test_disabled_day_and_holiday_have_no_hours() {
        let ctx = context(HolidayCalendar::from_dates([date(2026, 10, 20)]), 0);
        assert_eq!(ctx.daily_working_hours(date(2026, 10, 18)), 0.0); // Sunday
        assert_eq!(ctx.daily_working_hours(date(2026, 10, 20)), 0.0); // holiday
        assert!(ctx.working_windows_on(date(2026, 10, 20)).is_empty());
    }

    #[test]
    fn test_active_template_blocks_every_year() {
        let template = Holiday::recurring("Christmas".into(), None, 12, 25).unwrap();
        let offsite = Holiday::new("Offsite".into(), None, date(2026, 10, 22));

        let calendar = HolidayCalendar::from_holidays(&[template, offsite]);
        assert_eq!(calendar.len(), 2);
        assert!(calendar.is_holiday(date(2026, 10, 22)));
        assert!(!calendar.is_holiday(date(2027, 10, 22)));
        assert!(calendar.is_holiday(date(2026, 12, 25)));
        assert!(calendar.is_holiday(date(2030, 12, 25)));
        assert!(!calendar.is_holiday(date(2026, 12, 24)));
    }

    #[test]
    fn test_disabled_rows_do_not_block() {
        let mut closed = Holiday::new("Closed".into(), None, date(2026, 10, 21));
        closed.is_active = false;
        let mut retired = Holiday::recurring("Retired".into(), None, 3, 3).unwrap();
        retired.is_active = false;

        let calendar = HolidayCalendar::from_holidays(&[closed, retired]);
        assert!(calendar.is_empty());
        assert!(!calendar.is_holiday(date(2026, 10, 21)));
        assert!(!calendar.is_holiday(date(2026, 3, 3)));
    }

    #[test]
    fn test_disabled_instance_overrides_template_for_its_year() {
        let template = Holiday::recurring("Christmas".into(), None, 12, 25).unwrap();
        let mut skipped = template.materialize(2026).unwrap();
        skipped.is_active = false;
        // An active row on the same date still wins
        let mut also_skipped = template.materialize(2027).unwrap();
        also_skipped.is_active = false;
        let reinstated = Holiday::new("Christmas".into(), None, date(2027, 12, 25));

        let calendar =
            HolidayCalendar::from_holidays(&[template, skipped, also_skipped, reinstated]);
        assert!(!calendar.is_holiday(date(2026, 12, 25)));
        assert!(calendar.is_holiday(date(2027, 12, 25)));
        assert!(calendar.is_holiday(date(2028, 12, 25)));
    }

    #[test]
    fn test_walker_skips_template_day() {
        let template = Holiday::recurring("Christmas".into(), None, 12, 25).unwrap();
        let ctx = context(HolidayCalendar::from_holidays(&[template]), 0);

        // Thursday 2026-12-24 16:00 + 2h: 1h Thursday, Friday is Christmas
        let start = Utc.with_ymd_and_hms(2026, 12, 24, 16, 0, 0).unwrap();
        let due = crate::domain::services::calculate_due_date(start, 2.0, &ctx).unwrap();
        assert_eq!(due, Utc.with_ymd_and_hms(2026, 12, 28, 9, 0, 0).unwrap());
    }

    #[test]
    fn test_is_working_moment_uses_business_offset() {
        // Business timezone UTC+3: 06:00Z is 09:00 local on Monday
        let ctx = context(HolidayCalendar::new(), 3);
        let monday_0600z = Utc.with_ymd_and_hms(2026, 10, 19, 6, 0, 0).unwrap();
        assert!(ctx.is_working_moment(monday_0600z));

        // 14:00Z is 17:00 local: exactly at close is outside
        let monday_1400z = Utc.with_ymd_and_hms(2026, 10, 19, 14, 0, 0).unwrap();
        assert!(!ctx.is_working_moment(monday_1400z));

        // 09:30Z is 12:30 local, inside the lunch break
        let lunch = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        assert!(!ctx.is_working_moment(lunch));
    }

    #[test]
    fn test_local_round_trip() {
        let ctx = context(HolidayCalendar::new(), -5);
        let instant = Utc.with_ymd_and_hms(2026, 1, 1, 3, 15, 0).unwrap();
        let local = ctx.to_local(instant);
        assert_eq!(local, date(2025, 12, 31).and_hms_opt(22, 15, 0).unwrap());
        assert_eq!(ctx.to_utc(local), instant);
    }
}
