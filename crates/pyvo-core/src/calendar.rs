//! Month grids for the calendar view.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::event::Event;
use crate::holidays::{Holiday, HolidayCalendar};
use crate::recurrence::next_occurrences;
use crate::root::Root;
use crate::series::Series;
use crate::time::start_of_day;

/// One cell of a month grid.
#[derive(Debug, Clone)]
pub struct Day<'a> {
    pub date: NaiveDate,
    /// Recorded events on this date. Always empty for alien days.
    pub events: Vec<&'a Event>,
    pub holiday: Option<Holiday>,
    pub weekend: bool,
    /// Series whose recurrence rule projects an occurrence on this date.
    pub projected: Vec<&'a Series>,
    /// The date belongs to a neighbouring month.
    pub alien: bool,
}

/// Monday-first weeks covering one month.
#[derive(Debug, Clone)]
pub struct MonthGrid<'a> {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<[Day<'a>; 7]>,
}

/// Step `offset` months from `year`/`month`, carrying into the year.
/// `month` may be out of the 1..=12 range. `None` when the result does not
/// fit in an `i32` year.
pub fn shift_month(year: i32, month: i32, offset: i32) -> Option<(i32, u32)> {
    let total = year
        .checked_mul(12)?
        .checked_add(month.checked_sub(1)?)?
        .checked_add(offset)?;
    Some((total.div_euclid(12), total.rem_euclid(12) as u32 + 1))
}

/// First month of a window of `num_months` roughly centred on `today`.
pub fn default_window(today: NaiveDate, num_months: u32) -> (i32, u32) {
    let back = i32::try_from(num_months / 2).unwrap_or(i32::MAX);
    shift_month(today.year(), today.month() as i32, -back)
        .unwrap_or((today.year(), today.month()))
}

/// Build month grids for `num_months` months starting at
/// `first_year`/`first_month`.
///
/// `series_filter` restricts both recorded and projected events to the given
/// series slugs; unknown slugs are ignored. All grids in one call have the
/// same number of weeks: shorter months are padded with trailing alien weeks.
/// Windows reaching past the representable date range yield no grids.
pub fn get_calendar<'a>(
    root: &'a Root,
    first_year: i32,
    first_month: i32,
    num_months: u32,
    series_filter: Option<&[&str]>,
    holidays: &dyn HolidayCalendar,
) -> BTreeMap<(i32, u32), MonthGrid<'a>> {
    let firsts: Vec<NaiveDate> = (0..num_months as i32)
        .filter_map(|offset| {
            let (year, month) = shift_month(first_year, first_month, offset)?;
            NaiveDate::from_ymd_opt(year, month, 1)
        })
        .collect();
    let (Some(&start), Some(last_first)) = (firsts.first(), firsts.last()) else {
        return BTreeMap::new();
    };
    let Some(end) = last_first.checked_add_months(Months::new(1)) else {
        return BTreeMap::new();
    };
    // Padding weeks must stay representable too.
    if firsts.len() != num_months as usize
        || start.checked_sub_days(Days::new(7)).is_none()
        || end.checked_add_days(Days::new(14)).is_none()
    {
        return BTreeMap::new();
    }

    let series: Vec<&Series> = match series_filter {
        Some(slugs) => slugs
            .iter()
            .filter_map(|slug| root.series_by_slug(slug))
            .collect(),
        None => root.all_series().iter().collect(),
    };

    let mut events: HashMap<NaiveDate, Vec<&Event>> = HashMap::new();
    for event in root.events() {
        let date = event.date();
        if date < start || date >= end {
            continue;
        }
        if series_filter.is_some() && !series.iter().any(|s| s.slug == root.series_of(event).slug)
        {
            continue;
        }
        events.entry(date).or_default().push(event);
    }

    let mut projected: HashMap<NaiveDate, Vec<&Series>> = HashMap::new();
    if let Some(after_end) = end.succ_opt() {
        for s in &series {
            let occurrences = next_occurrences(root, s, None, None);
            for occurrence in occurrences.between(start_of_day(start), start_of_day(after_end)) {
                projected.entry(occurrence.date_naive()).or_default().push(*s);
            }
        }
    }

    let rows = firsts.iter().map(|first| rows_needed(*first)).max().unwrap_or(0);
    let mut holiday_cache: HashMap<i32, Vec<Holiday>> = HashMap::new();

    let mut months = BTreeMap::new();
    for first in firsts {
        let grid_start = first - Days::new(first.weekday().num_days_from_monday() as u64);
        let mut weeks = Vec::with_capacity(rows);
        for row in 0..rows {
            let week_start = grid_start + Days::new(7 * row as u64);
            weeks.push(std::array::from_fn(|column| {
                let date = week_start + Days::new(column as u64);
                let alien = date.month() != first.month();
                let holiday = holiday_cache
                    .entry(date.year())
                    .or_insert_with(|| holidays.holidays(date.year()))
                    .iter()
                    .find(|h| h.date == date)
                    .copied();
                Day {
                    date,
                    events: if alien {
                        Vec::new()
                    } else {
                        events.get(&date).cloned().unwrap_or_default()
                    },
                    holiday,
                    weekend: matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
                    projected: projected.get(&date).cloned().unwrap_or_default(),
                    alien,
                }
            }));
        }
        months.insert(
            (first.year(), first.month()),
            MonthGrid {
                year: first.year(),
                month: first.month(),
                weeks,
            },
        );
    }
    months
}

/// Number of Monday-first weeks that touch the month starting at `first`.
fn rows_needed(first: NaiveDate) -> usize {
    let lead = first.weekday().num_days_from_monday() as usize;
    let length = first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as usize)
        .unwrap_or(31);
    (lead + length).div_ceil(7)
}
