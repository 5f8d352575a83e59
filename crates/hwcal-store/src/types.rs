//! Entry types and request payloads.

use chrono::{DateTime, NaiveDate, Utc};
use hwcal_core::ValidationError;
use serde::{Deserialize, Deserializer, Serialize};

/// A homework entry as stored remotely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque identifier assigned by the store
    #[serde(deserialize_with = "opaque_id")]
    pub id: String,
    pub subject: String,
    pub task: String,
    pub homework_date: NaiveDate,
    /// Assigned by the store on insert
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Accept numeric and textual primary keys alike.
fn opaque_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Number(n) => n.to_string(),
    })
}

/// Row shape returned by the month date query.
#[derive(Debug, Deserialize)]
pub(crate) struct DateRow {
    pub homework_date: NaiveDate,
}

/// Request to create a new entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewEntry {
    pub subject: String,
    pub task: String,
    pub homework_date: NaiveDate,
}

impl NewEntry {
    /// Trim and check the required fields.
    pub fn new(
        subject: &str,
        task: &str,
        homework_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: required(subject, "subject")?,
            task: required(task, "task")?,
            homework_date,
        })
    }
}

/// Request to update an existing entry (partial update).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homework_date: Option<NaiveDate>,
}

impl EntryUpdate {
    /// Content edit: both fields are trimmed and required.
    pub fn content(subject: &str, task: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            subject: Some(required(subject, "subject")?),
            task: Some(required(task, "task")?),
            homework_date: None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.task.is_none() && self.homework_date.is_none()
    }

    /// Apply the supplied fields to `entry`.
    pub fn apply_to(&self, entry: &mut Entry) {
        if let Some(subject) = &self.subject {
            entry.subject = subject.clone();
        }
        if let Some(task) = &self.task {
            entry.task = task.clone();
        }
        if let Some(date) = self.homework_date {
            entry.homework_date = date;
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
