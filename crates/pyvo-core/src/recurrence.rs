//! Projection of future event dates from a series' recurrence rule.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone};
use chrono_tz::Tz;
use regex::Regex;
use rrule::{RRule, RRuleSet, Unvalidated};

use crate::event::Event;
use crate::root::Root;
use crate::series::Series;
use crate::time::{start_of_day, TIMEZONE};

fn rrule_tz() -> rrule::Tz {
    rrule::Tz::from(TIMEZONE)
}

fn until_re() -> &'static Regex {
    static UNTIL_RE: OnceLock<Regex> = OnceLock::new();
    UNTIL_RE.get_or_init(|| {
        Regex::new(r"(?i)UNTIL=(\d{4})(\d{2})(\d{2})").expect("UNTIL pattern is valid")
    })
}

/// Start used to validate a rule: 2000-01-01, or the day before `UNTIL`
/// when the rule ends earlier.
fn reference_start(body: &str) -> NaiveDate {
    let default = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN);
    let until = until_re().captures(body).and_then(|c| {
        NaiveDate::from_ymd_opt(c[1].parse().ok()?, c[2].parse().ok()?, c[3].parse().ok()?)
    });
    match until.and_then(|u| u.checked_sub_days(Days::new(1))) {
        Some(before) if before < default => before,
        _ => default,
    }
}

/// Parse and validate a recurrence rule. A leading `RRULE:` is accepted.
pub(crate) fn parse_rule(text: &str) -> Result<RRule<Unvalidated>, String> {
    let body = text.trim();
    let body = body.strip_prefix("RRULE:").unwrap_or(body);
    let rule: RRule<Unvalidated> = body.parse().map_err(|e: rrule::RRuleError| e.to_string())?;
    let reference = reference_start(body);
    let reference = rrule_tz()
        .with_ymd_and_hms(reference.year(), reference.month(), reference.day(), 0, 0, 0)
        .earliest()
        .ok_or_else(|| "invalid reference start".to_string())?;
    rule.clone().build(reference).map_err(|e| e.to_string())?;
    Ok(rule)
}

/// Projected occurrences of a series, evaluated lazily.
///
/// Unbounded unless a count was given; callers that render a date range
/// should use [`Occurrences::between`] or [`Occurrences::until`].
pub struct Occurrences {
    set: Option<RRuleSet>,
    limit: Option<usize>,
}

impl Occurrences {
    pub fn none() -> Self {
        Self {
            set: None,
            limit: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        self.set
            .iter()
            .flat_map(|set| set.into_iter())
            .map(|dt| dt.with_timezone(&TIMEZONE))
            .take(self.limit.unwrap_or(usize::MAX))
    }

    /// Occurrences up to and including `cutoff`.
    pub fn until(&self, cutoff: DateTime<Tz>) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        self.iter().take_while(move |dt| *dt <= cutoff)
    }

    /// Occurrences in `[start, end]`.
    pub fn between(&self, start: DateTime<Tz>, end: DateTime<Tz>) -> Vec<DateTime<Tz>> {
        self.until(end).filter(|dt| *dt >= start).collect()
    }
}

impl std::fmt::Debug for Occurrences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Occurrences")
            .field("scheduled", &self.set.is_some())
            .field("limit", &self.limit)
            .finish()
    }
}

/// Planned occurrences after the last recorded event of `series`.
///
/// Projection starts the day after the last event, or the day after `since`
/// when that is later. A monthly series that already met in the starting
/// month resumes on the first of the following month. At most `count`
/// dates are produced when `count` is given.
pub fn next_occurrences(
    root: &Root,
    series: &Series,
    count: Option<usize>,
    since: Option<NaiveDate>,
) -> Occurrences {
    let Some(recurrence) = &series.recurrence else {
        return Occurrences::none();
    };
    let last = root.last_event(series).map(Event::date);
    let base = match (last, since) {
        (Some(last), Some(since)) => last.max(since),
        (Some(date), None) | (None, Some(date)) => date,
        (None, None) => return Occurrences::none(),
    };
    let Some(mut anchor) = base.succ_opt() else {
        return Occurrences::none();
    };

    if let Some(last) = last {
        if recurrence.is_monthly() && (last.year(), last.month()) == (anchor.year(), anchor.month())
        {
            match first_of_next_month(anchor) {
                Some(next) => anchor = next,
                None => return Occurrences::none(),
            }
        }
    }

    let dt_start = start_of_day(anchor).with_timezone(&rrule_tz());
    match recurrence.parsed.clone().build(dt_start) {
        Ok(set) => Occurrences {
            set: Some(set),
            limit: count,
        },
        Err(e) => {
            // e.g. an UNTIL that lies before the anchor
            tracing::debug!(series = %series.slug, "No projection from {}: {}", anchor, e);
            Occurrences::none()
        }
    }
}

fn first_of_next_month(date: NaiveDate) -> Option<NaiveDate> {
    date.with_day(1)?.checked_add_months(Months::new(1))
}
