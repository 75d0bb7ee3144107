use crate::participant::Participant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Pages in one full hatim. All page arithmetic wraps modulo this value.
pub const TOTAL_PAGES: u32 = 604;

/// Page whose reading carries the supplementary closing requirement.
pub const BOUNDARY_PAGE: u32 = 600;

/// A single day's reading for one participant.
///
/// `start` and `end` are wrapped independently into `[1, TOTAL_PAGES]`, so a
/// reading that crosses the end of the cycle renders backward (`602-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
    pub pages: u32,
}

impl PageRange {
    /// Zero-page participants produce `start..start-1`.
    pub fn is_empty(&self) -> bool {
        self.pages == 0
    }

    pub fn crosses_cycle(&self) -> bool {
        !self.is_empty() && self.end < self.start
    }

    pub fn contains(&self, page: u32) -> bool {
        if self.is_empty() {
            return false;
        }
        if self.pages >= TOTAL_PAGES {
            return true;
        }
        if self.crosses_cycle() {
            page >= self.start || page <= self.end
        } else {
            (self.start..=self.end).contains(&page)
        }
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Reduces a 1-based raw page number into `[1, TOTAL_PAGES]`.
pub fn wrap_page(raw: u64) -> u32 {
    let total = u64::from(TOTAL_PAGES);
    // raw == 0 only occurs for the end of a zero-page range starting on page 1
    let wrapped = (raw + total - 1) % total + 1;
    wrapped as u32
}

/// 1-based page at which participant `index` begins reading on day zero.
pub fn start_page_of(participants: &[Participant], index: usize) -> u32 {
    let preceding: u64 = participants
        .iter()
        .take(index)
        .map(|p| u64::from(p.pages))
        .sum();
    wrap_page(1 + preceding)
}

/// Pages read by participant `person_index` on the zero-based `day_index`.
pub fn day_range(
    participants: &[Participant],
    person_index: usize,
    day_index: usize,
) -> Option<PageRange> {
    let pages = participants.get(person_index)?.pages;
    let raw_start =
        u64::from(start_page_of(participants, person_index)) + day_index as u64 * u64::from(pages);
    let raw_end = raw_start + u64::from(pages) - 1;
    Some(PageRange {
        start: wrap_page(raw_start),
        end: wrap_page(raw_end),
        pages,
    })
}
