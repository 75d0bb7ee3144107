use super::{ExportResult, MAX_EXPORT_DAYS, export_file_name};
use crate::dates;
use crate::grid::{self, NAME_COLUMN, NUMBER_COLUMN, PAGES_COLUMN};
use crate::hatim::Hatim;
use crate::validation;
use serde::Serialize;
use std::fmt;
use std::io::Write;

pub const SHEET_NAME: &str = "Hatim Listesi";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(i64),
    Text(String),
    Empty,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Number(n) => write!(f, "{n}"),
            CellValue::Text(text) => f.write_str(text),
            CellValue::Empty => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellStyle {
    pub bold: bool,
    pub thin_border: bool,
    pub horizontal: Alignment,
}

impl CellStyle {
    const HEADER: Self = Self {
        bold: true,
        thin_border: true,
        horizontal: Alignment::Center,
    };
    const BODY: Self = Self {
        bold: false,
        thin_border: true,
        horizontal: Alignment::Center,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl Cell {
    fn header(value: CellValue) -> Self {
        Self {
            value,
            style: CellStyle::HEADER,
        }
    }

    fn body(value: CellValue) -> Self {
        Self {
            value,
            style: CellStyle::BODY,
        }
    }
}

/// 1-based cell coordinate, rendered in A1 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellRef {
    pub row: u32,
    pub column: u32,
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CellMerge {
    pub from: CellRef,
    pub to: CellRef,
}

impl fmt::Display for CellMerge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.from, self.to)
    }
}

pub fn column_letters(mut column: u32) -> String {
    let mut letters = Vec::new();
    while column > 0 {
        let rem = (column - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        column = (column - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Full schedule table ready for a spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpreadsheetDocument {
    pub file_name: String,
    pub sheet_name: String,
    pub rows: Vec<Vec<Cell>>,
    pub merges: Vec<CellMerge>,
}

/// Two header rows (dates, weekday names) then one row per participant.
pub fn build_spreadsheet(hatim: &Hatim) -> ExportResult<SpreadsheetDocument> {
    validation::require_participants(&hatim.participants)?;
    let (start, end) = validation::validate_date_range(hatim.start_date, hatim.end_date)?;
    validation::validate_span(start, end, MAX_EXPORT_DAYS)?;
    let grid = grid::reading_grid(hatim)?;

    let mut header_dates = vec![
        Cell::header(CellValue::Text(NUMBER_COLUMN.into())),
        Cell::header(CellValue::Text(NAME_COLUMN.into())),
        Cell::header(CellValue::Text(PAGES_COLUMN.into())),
    ];
    let mut header_days = vec![
        Cell::header(CellValue::Empty),
        Cell::header(CellValue::Empty),
        Cell::header(CellValue::Empty),
    ];
    for date in &grid.dates {
        header_dates.push(Cell::header(CellValue::Text(dates::format_locale(*date))));
        header_days.push(Cell::header(CellValue::Text(dates::day_name(*date).into())));
    }

    let mut rows = vec![header_dates, header_days];
    for row in &grid.rows {
        let mut cells = vec![
            Cell::body(CellValue::Number(row.number as i64)),
            Cell::body(CellValue::Text(row.full_name.clone())),
            Cell::body(CellValue::Number(i64::from(row.pages))),
        ];
        cells.extend(
            row.ranges
                .iter()
                .map(|range| Cell::body(CellValue::Text(range.to_string()))),
        );
        rows.push(cells);
    }

    // #, name and page-count headers span both header rows
    let merges = (1..=3)
        .map(|column| CellMerge {
            from: CellRef { row: 1, column },
            to: CellRef { row: 2, column },
        })
        .collect();

    Ok(SpreadsheetDocument {
        file_name: export_file_name(&hatim.name, "csv"),
        sheet_name: SHEET_NAME.to_string(),
        rows,
        merges,
    })
}

impl SpreadsheetDocument {
    pub fn write_csv<W: Write>(&self, writer: W) -> ExportResult<()> {
        let mut writer = csv::Writer::from_writer(writer);
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.value.to_string()))?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn to_csv_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }
}
