use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

/// A reader in a hatim. List position defines reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub full_name: String,
    pub pages: u32,
    /// Days this participant has marked as read, kept sorted and unique.
    #[serde(default, deserialize_with = "sorted_days")]
    pub checked_days: Vec<NaiveDate>,
}

// Stored lists may be in click order or carry repeats.
fn sorted_days<'de, D>(deserializer: D) -> Result<Vec<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let mut days = Vec::<NaiveDate>::deserialize(deserializer)?;
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

impl Participant {
    pub fn new(full_name: impl Into<String>, pages: u32) -> Self {
        Self {
            full_name: full_name.into(),
            pages,
            checked_days: Vec::new(),
        }
    }

    pub fn is_checked(&self, date: NaiveDate) -> bool {
        self.checked_days.binary_search(&date).is_ok()
    }

    /// Flips the read mark for `date` and returns the new state.
    pub fn toggle_checked_day(&mut self, date: NaiveDate) -> bool {
        match self.checked_days.binary_search(&date) {
            Ok(pos) => {
                self.checked_days.remove(pos);
                false
            }
            Err(pos) => {
                self.checked_days.insert(pos, date);
                true
            }
        }
    }
}
