use crate::dates::optional_date;
use crate::participant::Participant;
use crate::validation::{self, ValidationError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub const DEFAULT_HATIM_NAME: &str = "Yeni Hatim";

const LOCAL_ID_PREFIX: &str = "local_";

/// Where a hatim lives. Decided once at creation and never re-derived.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HatimId {
    Remote(String),
    Local(String),
}

impl HatimId {
    pub fn new_local() -> Self {
        Self::Local(format!("{LOCAL_ID_PREFIX}{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Remote(id) | Self::Local(id) => id,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }
}

impl fmt::Display for HatimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Restores the variant from the wire form. Only used at the HTTP/CLI edge.
impl FromStr for HatimId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with(LOCAL_ID_PREFIX) {
            Ok(Self::Local(s.to_string()))
        } else {
            Ok(Self::Remote(s.to_string()))
        }
    }
}

impl Serialize for HatimId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for HatimId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        match raw.parse::<Self>() {
            Ok(id) => Ok(id),
            Err(never) => match never {},
        }
    }
}

/// A shared reading plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hatim {
    pub id: HatimId,
    pub name: String,
    #[serde(default, alias = "startDate", with = "optional_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "endDate", with = "optional_date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub participants: Vec<Participant>,
    #[serde(default, rename = "user_id")]
    pub owner: Option<String>,
    #[serde(rename = "created_at", alias = "created")]
    pub created: DateTime<Utc>,
}

impl Hatim {
    pub fn apply(&mut self, patch: &HatimPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            self.end_date = end_date;
        }
        if let Some(participants) = &patch.participants {
            self.participants = participants.clone();
        }
    }

    pub fn participant(&self, index: usize) -> Option<&Participant> {
        self.participants.get(index)
    }

    pub fn add_participant(&mut self, participant: Participant) -> Result<(), ValidationError> {
        validation::validate_participant(&participant)?;
        self.participants.push(participant);
        Ok(())
    }

    /// Replaces name and page count, keeping the participant's checked days.
    pub fn update_participant(
        &mut self,
        index: usize,
        full_name: impl Into<String>,
        pages: u32,
    ) -> Result<(), ValidationError> {
        validation::validate_participant_index(&self.participants, index)?;
        let full_name = full_name.into();
        if full_name.trim().is_empty() {
            return Err(ValidationError::EmptyParticipantName);
        }
        let participant = &mut self.participants[index];
        participant.full_name = full_name;
        participant.pages = pages;
        Ok(())
    }

    pub fn remove_participant(&mut self, index: usize) -> Result<Participant, ValidationError> {
        validation::validate_participant_index(&self.participants, index)?;
        Ok(self.participants.remove(index))
    }

    pub fn move_participant(&mut self, from: usize, to: usize) -> Result<(), ValidationError> {
        validation::validate_participant_index(&self.participants, from)?;
        validation::validate_participant_index(&self.participants, to)?;
        let participant = self.participants.remove(from);
        self.participants.insert(to, participant);
        Ok(())
    }

    pub fn toggle_checked_day(
        &mut self,
        index: usize,
        date: NaiveDate,
    ) -> Result<bool, ValidationError> {
        validation::validate_participant_index(&self.participants, index)?;
        validation::validate_checked_day(date, self.start_date, self.end_date)?;
        Ok(self.participants[index].toggle_checked_day(date))
    }
}

/// Fields for a record the remote store has not assigned an id to yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewHatim {
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub participants: Vec<Participant>,
    pub owner: Option<String>,
    pub created: DateTime<Utc>,
}

impl NewHatim {
    pub fn named(name: &str, owner: Option<String>) -> Self {
        let name = name.trim();
        Self {
            name: if name.is_empty() {
                DEFAULT_HATIM_NAME.to_string()
            } else {
                name.to_string()
            },
            start_date: None,
            end_date: None,
            participants: Vec::new(),
            owner,
            created: Utc::now(),
        }
    }

    pub fn into_hatim(self, id: HatimId) -> Hatim {
        Hatim {
            id,
            name: self.name,
            start_date: self.start_date,
            end_date: self.end_date,
            participants: self.participants,
            owner: self.owner,
            created: self.created,
        }
    }
}

/// Partial update. `None` leaves a field untouched; `Some(None)` clears a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HatimPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "startDate",
        deserialize_with = "present_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        alias = "endDate",
        deserialize_with = "present_date",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<NaiveDate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
}

impl HatimPatch {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn dates(start_date: Option<NaiveDate>, end_date: Option<NaiveDate>) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
            ..Self::default()
        }
    }

    pub fn participants(participants: Vec<Participant>) -> Self {
        Self {
            participants: Some(participants),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
            && self.participants.is_none()
    }
}

// A key that is present maps to `Some`, even when its value is null or "".
fn present_date<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: Deserializer<'de>,
{
    optional_date::deserialize(deserializer).map(Some)
}
