//! The reading grid: every participant's page range for every day of a hatim.
//!
//! Both exporters and the CLI table are rendered from this one structure, so
//! the page arithmetic lives in exactly one place.

use crate::allocator::{self, PageRange};
use crate::dates::{self, dates_in_range};
use crate::hatim::Hatim;
use crate::validation::{self, ValidationError};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

pub const NUMBER_COLUMN: &str = "#";
pub const NAME_COLUMN: &str = "İSİM SOYİSİM";
pub const PAGES_COLUMN: &str = "SAYFA SAYISI";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    /// 1-based position in the reading order.
    pub number: usize,
    pub full_name: String,
    pub pages: u32,
    pub ranges: Vec<PageRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingGrid {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<GridRow>,
}

/// One day of a single participant's schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledDay {
    pub date: NaiveDate,
    pub day_index: usize,
    pub range: PageRange,
    pub checked: bool,
}

/// Requires participants and an ordered date range.
pub fn reading_grid(hatim: &Hatim) -> Result<ReadingGrid, ValidationError> {
    validation::require_participants(&hatim.participants)?;
    let (start, end) = validation::validate_date_range(hatim.start_date, hatim.end_date)?;
    let dates = dates_in_range(start, end);

    let rows = hatim
        .participants
        .iter()
        .enumerate()
        .map(|(person_index, participant)| GridRow {
            number: person_index + 1,
            full_name: participant.full_name.clone(),
            pages: participant.pages,
            ranges: (0..dates.len())
                .filter_map(|day_index| {
                    allocator::day_range(&hatim.participants, person_index, day_index)
                })
                .collect(),
        })
        .collect();

    Ok(ReadingGrid { dates, rows })
}

/// The days one participant reads, with their read marks.
pub fn participant_schedule(
    hatim: &Hatim,
    person_index: usize,
) -> Result<Vec<ScheduledDay>, ValidationError> {
    validation::validate_participant_index(&hatim.participants, person_index)?;
    let (start, end) = validation::validate_date_range(hatim.start_date, hatim.end_date)?;
    let participant = &hatim.participants[person_index];

    Ok(dates_in_range(start, end)
        .into_iter()
        .enumerate()
        .filter_map(|(day_index, date)| {
            allocator::day_range(&hatim.participants, person_index, day_index).map(|range| {
                ScheduledDay {
                    date,
                    day_index,
                    range,
                    checked: participant.is_checked(date),
                }
            })
        })
        .collect())
}

impl ReadingGrid {
    pub fn day_count(&self) -> usize {
        self.dates.len()
    }

    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let mut columns: Vec<Column> = Vec::with_capacity(3 + self.dates.len());

        let numbers: Vec<i64> = self.rows.iter().map(|r| r.number as i64).collect();
        columns.push(Series::new(PlSmallStr::from_static(NUMBER_COLUMN), numbers).into_column());

        let names: Vec<String> = self.rows.iter().map(|r| r.full_name.clone()).collect();
        columns.push(Series::new(PlSmallStr::from_static(NAME_COLUMN), names).into_column());

        let pages: Vec<i64> = self.rows.iter().map(|r| i64::from(r.pages)).collect();
        columns.push(Series::new(PlSmallStr::from_static(PAGES_COLUMN), pages).into_column());

        for (day_index, date) in self.dates.iter().enumerate() {
            let cells: Vec<String> = self
                .rows
                .iter()
                .map(|r| {
                    r.ranges
                        .get(day_index)
                        .map(ToString::to_string)
                        .unwrap_or_default()
                })
                .collect();
            let header = format!("{} {}", dates::format_locale(*date), dates::day_name(*date));
            columns.push(Series::new(PlSmallStr::from(header.as_str()), cells).into_column());
        }

        DataFrame::new(columns)
    }
}
