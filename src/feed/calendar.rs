//! Month view of the journal. Days are calendar days in UTC.

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;

use crate::{api::EntryQuery, models::Entry};

/// Entries fetched for one month view.
pub const MONTH_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// `month` is 1-based.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    pub fn containing(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first)
    }

    pub fn days(&self) -> u32 {
        self.last_day().day()
    }

    pub fn prev(&self) -> Self {
        self.first_day()
            .checked_sub_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day()
            .checked_add_months(Months::new(1))
            .map(Self::containing)
            .unwrap_or(*self)
    }

    /// First day 00:00:00 through last day 23:59:59.
    pub fn range(&self) -> (chrono::DateTime<Utc>, chrono::DateTime<Utc>) {
        let start = Utc.from_utc_datetime(&self.first_day().and_time(NaiveTime::MIN));
        let end = Utc.from_utc_datetime(&self.last_day().and_time(NaiveTime::MIN))
            + Duration::seconds(86_399);
        (start, end)
    }

    pub fn query(&self) -> EntryQuery {
        let (start, end) = self.range();
        EntryQuery::default()
            .page_size(MONTH_PAGE_SIZE)
            .between(start, end)
    }

    pub fn label(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayCell {
    pub day: u32,
    pub date: NaiveDate,
    pub is_today: bool,
    pub entries: Vec<Entry>,
}

/// Sunday-first grid: leading `None`s pad the week before the 1st.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MonthGrid {
    pub month: YearMonth,
    pub label: String,
    pub cells: Vec<Option<DayCell>>,
}

impl MonthGrid {
    pub fn build(month: YearMonth, entries: &[Entry], today: NaiveDate) -> Self {
        let leading = month.first_day().weekday().num_days_from_sunday() as usize;
        let mut cells: Vec<Option<DayCell>> = vec![None; leading];

        for date in month.first_day().iter_days().take(month.days() as usize) {
            cells.push(Some(DayCell {
                day: date.day(),
                date,
                is_today: date == today,
                entries: entries
                    .iter()
                    .filter(|entry| entry.recorded_on() == date)
                    .cloned()
                    .collect(),
            }));
        }

        Self {
            month,
            label: month.label(),
            cells,
        }
    }

    pub fn weeks(&self) -> impl Iterator<Item = &[Option<DayCell>]> {
        self.cells.chunks(7)
    }

    pub fn day(&self, day: u32) -> Option<&DayCell> {
        self.cells.iter().flatten().find(|cell| cell.day == day)
    }
}
