//! Public holidays shown in the calendar.

use chrono::{Datelike, Days, NaiveDate};

/// A named public holiday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub name: &'static str,
}

/// Source of public holidays, keyed by year.
pub trait HolidayCalendar: Send + Sync {
    fn holidays(&self, year: i32) -> Vec<Holiday>;

    fn holiday_on(&self, date: NaiveDate) -> Option<Holiday> {
        self.holidays(date.year())
            .into_iter()
            .find(|h| h.date == date)
    }
}

/// Czech public holidays.
#[derive(Debug, Clone, Copy, Default)]
pub struct CzechHolidays;

const FIXED: &[(u32, u32, &str)] = &[
    (1, 1, "Den obnovy samostatného českého státu"),
    (5, 1, "Svátek práce"),
    (5, 8, "Den vítězství"),
    (7, 5, "Den slovanských věrozvěstů Cyrila a Metoděje"),
    (7, 6, "Den upálení mistra Jana Husa"),
    (9, 28, "Den české státnosti"),
    (10, 28, "Den vzniku samostatného československého státu"),
    (11, 17, "Den boje za svobodu a demokracii"),
    (12, 24, "Štědrý den"),
    (12, 25, "1. svátek vánoční"),
    (12, 26, "2. svátek vánoční"),
];

/// Good Friday became a public holiday in 2016.
const GOOD_FRIDAY_SINCE: i32 = 2016;

impl HolidayCalendar for CzechHolidays {
    fn holidays(&self, year: i32) -> Vec<Holiday> {
        let mut holidays: Vec<Holiday> = FIXED
            .iter()
            .filter_map(|(month, day, name)| {
                NaiveDate::from_ymd_opt(year, *month, *day).map(|date| Holiday {
                    date,
                    name: *name,
                })
            })
            .collect();

        if let Some(easter) = easter_sunday(year) {
            if year >= GOOD_FRIDAY_SINCE {
                if let Some(date) = easter.checked_sub_days(Days::new(2)) {
                    holidays.push(Holiday {
                        date,
                        name: "Velký pátek",
                    });
                }
            }
            if let Some(date) = easter.succ_opt() {
                holidays.push(Holiday {
                    date,
                    name: "Velikonoční pondělí",
                });
            }
        }

        holidays.sort_by_key(|h| h.date);
        holidays
    }
}

/// Gregorian Easter Sunday.
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let easter = computus::gregorian(year).ok()?;
    NaiveDate::from_ymd_opt(year, easter.month as u32, easter.day as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_easter() {
        assert_eq!(easter_sunday(2024), Some(date(2024, 3, 31)));
        assert_eq!(easter_sunday(2025), Some(date(2025, 4, 20)));
        assert_eq!(easter_sunday(2019), Some(date(2019, 4, 21)));
        assert_eq!(easter_sunday(2038), Some(date(2038, 4, 25)));
    }

    #[test]
    fn test_czech_holidays_2024() {
        let holidays = CzechHolidays.holidays(2024);
        assert_eq!(holidays.len(), 13);
        assert!(holidays.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(
            CzechHolidays.holiday_on(date(2024, 3, 29)).map(|h| h.name),
            Some("Velký pátek")
        );
        assert!(CzechHolidays.holiday_on(date(2024, 4, 1)).is_some());
        assert!(CzechHolidays.holiday_on(date(2024, 12, 24)).is_some());
        assert!(CzechHolidays.holiday_on(date(2024, 6, 27)).is_none());
    }

    #[test]
    fn test_no_good_friday_before_2016() {
        let holidays = CzechHolidays.holidays(2015);
        assert_eq!(holidays.len(), 12);
        assert!(CzechHolidays.holiday_on(date(2015, 4, 3)).is_none());
        assert!(CzechHolidays.holiday_on(date(2015, 4, 6)).is_some());
    }
}
