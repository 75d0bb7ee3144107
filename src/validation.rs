use crate::dates::inclusive_day_count;
use crate::hatim::HatimPatch;
use crate::participant::Participant;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("add participants first")]
    NoParticipants,
    #[error("participant name must not be empty")]
    EmptyParticipantName,
    #[error("participant {index} does not exist (hatim has {len})")]
    UnknownParticipant { index: usize, len: usize },
    #[error("select a start and end date")]
    MissingDateRange,
    #[error("start date {start} must be on or before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    #[error("date range spans {days} days; at most {max} are allowed")]
    RangeTooLong { days: i64, max: i64 },
    #[error("{date} is outside the reading range {start}..{end}")]
    DateOutsideRange {
        date: NaiveDate,
        start: NaiveDate,
        end: NaiveDate,
    },
}

pub fn validate_participant(participant: &Participant) -> Result<(), ValidationError> {
    if participant.full_name.trim().is_empty() {
        return Err(ValidationError::EmptyParticipantName);
    }
    Ok(())
}

pub fn validate_participant_index(
    participants: &[Participant],
    index: usize,
) -> Result<(), ValidationError> {
    if index >= participants.len() {
        return Err(ValidationError::UnknownParticipant {
            index,
            len: participants.len(),
        });
    }
    Ok(())
}

pub fn require_participants(participants: &[Participant]) -> Result<(), ValidationError> {
    if participants.is_empty() {
        return Err(ValidationError::NoParticipants);
    }
    Ok(())
}

/// Both dates present and ordered.
pub fn validate_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ValidationError::MissingDateRange);
    };
    if start > end {
        return Err(ValidationError::InvalidDateRange { start, end });
    }
    Ok((start, end))
}

pub fn validate_span(start: NaiveDate, end: NaiveDate, max: i64) -> Result<(), ValidationError> {
    let days = inclusive_day_count(start, end);
    if days > max {
        return Err(ValidationError::RangeTooLong { days, max });
    }
    Ok(())
}

/// A checked day must fall inside the reading range when one is set.
pub fn validate_checked_day(
    date: NaiveDate,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (start, end) {
        if date < start || date > end {
            return Err(ValidationError::DateOutsideRange { date, start, end });
        }
    }
    Ok(())
}

/// Checks what `patch` would leave behind on a record currently dated
/// `start..end`: every participant named, and merged dates still ordered.
pub fn validate_patch(
    patch: &HatimPatch,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), ValidationError> {
    if let Some(participants) = &patch.participants {
        participants.iter().try_for_each(validate_participant)?;
    }
    let start = patch.start_date.unwrap_or(start);
    let end = patch.end_date.unwrap_or(end);
    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(ValidationError::InvalidDateRange { start, end });
        }
    }
    Ok(())
}
