use crate::allocator::TOTAL_PAGES;
use crate::dates::inclusive_day_count;
use crate::participant::Participant;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Page totals against one hatim cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HatimStats {
    pub total: u64,
    pub remaining: u64,
    pub percentage: f64,
}

/// Sums assigned pages. An exact multiple of a full cycle counts as complete.
pub fn calculate_stats(participants: &[Participant]) -> HatimStats {
    let cycle = u64::from(TOTAL_PAGES);
    let total: u64 = participants.iter().map(|p| u64::from(p.pages)).sum();
    let cycle_used = total % cycle;
    if total > 0 && cycle_used == 0 {
        return HatimStats {
            total,
            remaining: 0,
            percentage: 100.0,
        };
    }
    HatimStats {
        total,
        remaining: cycle - cycle_used,
        percentage: cycle_used as f64 / cycle as f64 * 100.0,
    }
}

/// Share of assigned pages marked as read, capped at 100.
///
/// With a date range the denominator is every participant's pages over every
/// day of the range; without one it falls back to a single cycle.
pub fn calculate_reading_progress(
    participants: &[Participant],
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
) -> f64 {
    if participants.is_empty() {
        return 0.0;
    }

    let total_days = match (start_date, end_date) {
        (Some(start), Some(end)) => Some(inclusive_day_count(start, end)),
        _ => None,
    };

    let mut total_read = 0u64;
    let mut total_to_read = 0u64;
    for participant in participants {
        let pages = u64::from(participant.pages);
        total_read += participant.checked_days.len() as u64 * pages;
        if let Some(days) = total_days.filter(|days| *days > 0) {
            total_to_read += days as u64 * pages;
        }
    }

    let denominator = if total_days.is_none() {
        u64::from(TOTAL_PAGES)
    } else {
        total_to_read
    };
    if denominator == 0 {
        return 0.0;
    }

    (total_read as f64 / denominator as f64 * 100.0).min(100.0)
}
