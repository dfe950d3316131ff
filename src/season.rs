//! Calendar windows that drive the `automatic` colour mode.

use chrono::{Datelike, Duration, NaiveDate};

use crate::palette::Theme;

/// Western Easter Sunday (Meeus/Jones/Butcher).
pub fn easter(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = (19 * a + b - b / 4 - ((b - (b + 8) / 25 + 1) / 3) + 15).rem_euclid(30);
    let e = (32 + 2 * (b % 4) + 2 * (c / 4) - d - (c % 4)).rem_euclid(7);
    let f = d + e - 7 * ((a + 11 * d + 22 * e) / 451) + 114;
    NaiveDate::from_ymd_opt(year, (f / 31) as u32, (f % 31 + 1) as u32)
}

/// Monday..=Sunday week that contains `month/day` of `year`.
fn week_of(year: i32, month: u32, day: u32) -> Option<(NaiveDate, NaiveDate)> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let start = date - Duration::days(i64::from(date.weekday().num_days_from_monday()));
    Some((start, start + Duration::days(6)))
}

fn within(date: NaiveDate, window: Option<(NaiveDate, NaiveDate)>) -> bool {
    window.is_some_and(|(start, end)| start <= date && date <= end)
}

/// Last day of the New Year stretch in January: the day before the first
/// Monday on or after Jan 1. `None` when Jan 1 itself is a Monday.
fn new_year_tail(year: i32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let to_monday = (7 - jan1.weekday().num_days_from_monday()) % 7;
    if to_monday == 0 {
        return None;
    }
    Some(jan1 + Duration::days(i64::from(to_monday) - 1))
}

/// Resolve the theme for `date`. First matching window wins.
pub fn seasonal_theme(date: NaiveDate) -> Theme {
    let year = date.year();
    let month = date.month();
    let day = date.day();

    if month == 12 && day <= 26 {
        return Theme::Christmas;
    }
    if month == 12 || new_year_tail(year).is_some_and(|end| date <= end) {
        return Theme::NewYears;
    }
    if within(date, week_of(year, 2, 14)) {
        return Theme::Valentine;
    }
    if within(date, week_of(year, 3, 17)) {
        return Theme::StPatrick;
    }
    if let Some(sunday) = easter(year)
        && within(date, Some((sunday - Duration::days(14), sunday + Duration::days(7))))
    {
        return Theme::Easter;
    }
    if within(date, week_of(year, 7, 4)) {
        return Theme::Fourth;
    }
    match month {
        10 => Theme::Halloween,
        11 => Theme::Thanksgiving,
        1 | 4 | 5 | 6 | 8 | 9 | 12 => Theme::Rainbow,
        _ => Theme::Random,
    }
}
