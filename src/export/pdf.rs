//! PDF layout definitions.
//!
//! The exporter describes pages, tables and text declaratively; an external
//! PDF engine turns the JSON form of [`PdfDocDefinition`] into a file.

use super::{ExportResult, export_file_name};
use crate::allocator::{BOUNDARY_PAGE, TOTAL_PAGES};
use crate::dates;
use crate::grid;
use crate::hatim::Hatim;
use crate::validation;
use serde::Serialize;

const HEADER_FILL: &str = "#d9d9d9";
const COL_NUMBER_WIDTH: f64 = 15.0;
const COL_NAME_WIDTH: f64 = 90.0;
const COL_PAGES_WIDTH: f64 = 30.0;
const COL_DATE_WIDTH: f64 = 55.0;
const MIN_PAGE_WIDTH: f64 = 2000.0;
const MIN_PAGE_HEIGHT: f64 = 595.0;
const BODY_FONT_SIZE: f64 = 7.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PageSize {
    Named(&'static str),
    Dimensions { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    Left,
    Center,
}

/// A table cell. An all-`None` cell serializes as `{}`, the placeholder a
/// row-spanning cell above it requires.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfCell {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_span: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
}

impl PdfCell {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            font_size: Some(BODY_FONT_SIZE),
            ..Self::default()
        }
    }

    fn centered(text: impl Into<String>) -> Self {
        Self {
            alignment: Some(TextAlignment::Center),
            ..Self::text(text)
        }
    }

    fn header(text: impl Into<String>, font_size: f64) -> Self {
        Self {
            fill_color: Some(HEADER_FILL),
            font_size: Some(font_size),
            ..Self::centered(text)
        }
    }

    fn spanning_header(text: impl Into<String>) -> Self {
        Self {
            row_span: Some(2),
            font_size: None,
            ..Self::header(text, BODY_FONT_SIZE)
        }
    }

    fn placeholder() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfTable {
    pub header_rows: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub widths: Vec<f64>,
    pub body: Vec<Vec<PdfCell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfParagraph {
    pub text: String,
    pub font_size: f64,
    pub bold: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alignment: Option<TextAlignment>,
    pub margin: [f64; 4],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PdfContent {
    Paragraph(PdfParagraph),
    Table { table: PdfTable, layout: &'static str },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultStyle {
    pub font: &'static str,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfDocDefinition {
    pub page_size: PageSize,
    pub content: Vec<PdfContent>,
    pub default_style: DefaultStyle,
}

impl PdfDocDefinition {
    pub fn to_json(&self) -> ExportResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Any paragraph after the table is a footnote.
    pub fn footnotes(&self) -> impl Iterator<Item = &PdfParagraph> {
        self.content
            .iter()
            .skip_while(|c| !matches!(c, PdfContent::Table { .. }))
            .filter_map(|c| match c {
                PdfContent::Paragraph(p) => Some(p),
                PdfContent::Table { .. } => None,
            })
    }

    pub fn table(&self) -> Option<&PdfTable> {
        self.content.iter().find_map(|c| match c {
            PdfContent::Table { table, .. } => Some(table),
            PdfContent::Paragraph(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PdfExport {
    pub file_name: String,
    pub definition: PdfDocDefinition,
}

fn title(text: impl Into<String>) -> PdfContent {
    PdfContent::Paragraph(PdfParagraph {
        text: text.into(),
        font_size: 14.0,
        bold: true,
        alignment: Some(TextAlignment::Center),
        margin: [0.0, 0.0, 0.0, 10.0],
    })
}

fn default_style() -> DefaultStyle {
    DefaultStyle {
        font: "Roboto",
        font_size: BODY_FONT_SIZE,
    }
}

/// Whole-group schedule on a single oversized page.
pub fn build_schedule_pdf(hatim: &Hatim) -> ExportResult<PdfExport> {
    let grid = grid::reading_grid(hatim)?;

    let mut header_dates = vec![
        PdfCell::spanning_header(grid::NUMBER_COLUMN),
        PdfCell::spanning_header(grid::NAME_COLUMN),
        PdfCell::spanning_header("SAYFA"),
    ];
    let mut header_days = vec![
        PdfCell::placeholder(),
        PdfCell::placeholder(),
        PdfCell::placeholder(),
    ];
    for date in &grid.dates {
        header_dates.push(PdfCell::header(dates::format_locale(*date), 7.0));
        header_days.push(PdfCell::header(dates::day_name(*date), 6.0));
    }

    let mut body = vec![header_dates, header_days];
    for row in &grid.rows {
        let mut cells = vec![
            PdfCell::centered(row.number.to_string()),
            PdfCell::text(row.full_name.clone()),
            PdfCell::centered(row.pages.to_string()),
        ];
        cells.extend(row.ranges.iter().map(|r| PdfCell::centered(r.to_string())));
        body.push(cells);
    }

    let table_width = COL_NUMBER_WIDTH
        + COL_NAME_WIDTH
        + COL_PAGES_WIDTH
        + grid.day_count() as f64 * COL_DATE_WIDTH;
    let page_width = MIN_PAGE_WIDTH.max(table_width + 80.0);
    let page_height = MIN_PAGE_HEIGHT.max(grid.rows.len() as f64 * 15.0 + 200.0);

    Ok(PdfExport {
        file_name: export_file_name(&hatim.name, "pdf"),
        definition: PdfDocDefinition {
            page_size: PageSize::Dimensions {
                width: page_width,
                height: page_height,
            },
            content: vec![
                title(hatim.name.clone()),
                PdfContent::Table {
                    table: PdfTable {
                        header_rows: 2,
                        widths: Vec::new(),
                        body,
                    },
                    layout: "lightHorizontalLines",
                },
            ],
            default_style: default_style(),
        },
    })
}

/// One participant's days on an A4 page. Days whose reading touches the
/// boundary page are starred and explained in a footnote.
pub fn build_personal_pdf(hatim: &Hatim, participant_index: usize) -> ExportResult<PdfExport> {
    validation::require_participants(&hatim.participants)?;
    let days = grid::participant_schedule(hatim, participant_index)?;
    let participant = &hatim.participants[participant_index];

    let mut body = vec![vec![
        PdfCell::header("TARİH", BODY_FONT_SIZE),
        PdfCell::header("GÜN", BODY_FONT_SIZE),
        PdfCell::header("SAYFALAR", BODY_FONT_SIZE),
        PdfCell::header("OKUNDU", BODY_FONT_SIZE),
    ]];
    let mut touches_boundary = false;
    for day in &days {
        let mut pages = day.range.to_string();
        if day.range.contains(BOUNDARY_PAGE) {
            touches_boundary = true;
            pages.push_str(" *");
        }
        body.push(vec![
            PdfCell::centered(dates::format_locale(day.date)),
            PdfCell::centered(dates::day_name(day.date)),
            PdfCell::centered(pages),
            PdfCell::centered(if day.checked { "✓" } else { "" }),
        ]);
    }

    let mut content = vec![
        title(format!("{} - {}", hatim.name, participant.full_name)),
        PdfContent::Table {
            table: PdfTable {
                header_rows: 1,
                widths: vec![70.0, 70.0, 90.0, 50.0],
                body,
            },
            layout: "lightHorizontalLines",
        },
    ];
    if touches_boundary {
        content.push(PdfContent::Paragraph(PdfParagraph {
            text: format!(
                "* {BOUNDARY_PAGE}. sayfayı okuyan katılımcı, hatmi tamamlamak için {}-{TOTAL_PAGES}. sayfaları ve hatim duasını da okumalıdır.",
                BOUNDARY_PAGE + 1
            ),
            font_size: 8.0,
            bold: true,
            alignment: None,
            margin: [0.0, 10.0, 0.0, 0.0],
        }));
    }

    let file_stem = format!("{} {}", hatim.name, participant.full_name);
    Ok(PdfExport {
        file_name: export_file_name(&file_stem, "pdf"),
        definition: PdfDocDefinition {
            page_size: PageSize::Named("A4"),
            content,
            default_style: default_style(),
        },
    })
}
