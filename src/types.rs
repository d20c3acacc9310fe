//! Typed views over the payloads the API returns.
//!
//! DESIGN
//! ======
//! The server owns these schemas; the client only renders and forwards
//! them. Decoding is therefore lenient: every field defaults when absent or
//! `null`, ids are accepted as `_id` or `id` (string or number), related
//! records may arrive as a bare id or embedded, and unknown fields are kept
//! in `extra` so printing a record loses nothing.

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// LENIENT FIELD DECODERS
// =============================================================================

pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| v.as_u64()))
}

fn first_id<'a>(object_id: Option<&'a String>, id: Option<&'a String>) -> Option<&'a str> {
    object_id.or(id).map(String::as_str)
}

// =============================================================================
// SHARED PIECES
// =============================================================================

/// A related record that may be sent as a bare id or embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Id(String),
    Record(T),
}

/// Person attached to a record (`createdBy`, `user`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserRef {
    #[serde(rename = "_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default", skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ref<UserRef> {
    /// Display name, `"User"` when unknown.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self {
            Self::Record(user) if !user.name.is_empty() => &user.name,
            _ => "User",
        }
    }
}

/// Uploaded file metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    #[serde(rename = "originalName", default, skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mimetype: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Attachment {
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.original_name
            .as_deref()
            .or(self.filename.as_deref())
            .unwrap_or("file")
    }
}

// =============================================================================
// EXERCISE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    #[serde(rename = "_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_default")]
    pub subject: String,
    #[serde(default, deserialize_with = "null_default")]
    pub difficulty: String,
    #[serde(rename = "createdBy", default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<Ref<UserRef>>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "savesCount", default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub saves_count: Option<u64>,
    #[serde(rename = "savedCount", default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub saved_count: Option<u64>,
    #[serde(rename = "commentsCount", default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub comments_count: Option<u64>,
    #[serde(rename = "solutionsCount", default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub solutions_count: Option<u64>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Exercise {
    /// Server id, preferring `_id`.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        first_id(self.object_id.as_ref(), self.id.as_ref())
    }

    /// Times saved: `savesCount`, then `savedCount`, else 0.
    #[must_use]
    pub fn saves(&self) -> u64 {
        self.saves_count.or(self.saved_count).unwrap_or(0)
    }

    /// Exercise reduced to its id, as sent when a reference is a bare string.
    #[must_use]
    pub fn from_id(id: String) -> Self {
        Self { object_id: Some(id), ..Self::default() }
    }
}

// =============================================================================
// COMMENT / SOLUTION
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Ref<UserRef>>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        first_id(self.object_id.as_ref(), self.id.as_ref())
    }
}

/// A submitted solution. Listing "my solutions" embeds or references the
/// exercise under several names depending on the server version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    #[serde(rename = "_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "exerciseTitle", default, skip_serializing_if = "Option::is_none")]
    pub exercise_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise: Option<Ref<Exercise>>,
    #[serde(rename = "exerciseId", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub exercise_id: Option<String>,
    #[serde(rename = "exercise_id", default, deserialize_with = "lenient_id", skip_serializing_if = "Option::is_none")]
    pub exercise_id_snake: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<Ref<UserRef>>,
    #[serde(default, deserialize_with = "null_default")]
    pub attachments: Vec<Attachment>,
    #[serde(rename = "createdAt", default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Solution {
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        first_id(self.object_id.as_ref(), self.id.as_ref())
    }

    fn embedded_exercise(&self) -> Option<&Exercise> {
        match &self.exercise {
            Some(Ref::Record(exercise)) => Some(exercise),
            _ => None,
        }
    }

    /// Id of the solved exercise from whichever field carries it.
    #[must_use]
    pub fn exercise_key(&self) -> Option<&str> {
        self.exercise_id
            .as_deref()
            .or(self.exercise_id_snake.as_deref())
            .or_else(|| match &self.exercise {
                Some(Ref::Id(id)) => Some(id.as_str()),
                Some(Ref::Record(exercise)) => exercise.key(),
                None => None,
            })
    }

    #[must_use]
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.exercise_title.as_deref())
            .or_else(|| self.embedded_exercise().map(|e| e.title.as_str()))
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled solution")
    }

    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject
            .as_deref()
            .or_else(|| self.embedded_exercise().map(|e| e.subject.as_str()))
            .filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<&str> {
        self.difficulty
            .as_deref()
            .or_else(|| self.embedded_exercise().map(|e| e.difficulty.as_str()))
            .filter(|d| !d.is_empty())
    }
}

// =============================================================================
// SAVED
// =============================================================================

/// One row of the saved list. The exercise lives under `exercise`, `item`
/// or `ex`, or the row is the exercise itself.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedItem {
    pub exercise: Exercise,
    pub raw: Value,
}

impl SavedItem {
    /// Normalize a raw row; a bare string is taken as an exercise id.
    ///
    /// # Errors
    ///
    /// Returns an error if the located exercise is not a JSON object.
    pub fn from_row(raw: Value) -> Result<Self, serde_json::Error> {
        let located = ["exercise", "item", "ex"]
            .iter()
            .find_map(|key| raw.get(*key).filter(|v| !v.is_null()))
            .unwrap_or(&raw);
        let exercise = match located {
            Value::String(id) => Exercise::from_id(id.clone()),
            other => Exercise::deserialize(other)?,
        };
        Ok(Self { exercise, raw })
    }

    #[must_use]
    pub fn exercise_key(&self) -> Option<&str> {
        self.exercise.key()
    }
}

impl Serialize for SavedItem {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Answer of `is-saved` and `save-toggle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveState {
    #[serde(default, deserialize_with = "null_default")]
    pub saved: bool,
    #[serde(rename = "savesCount", default, deserialize_with = "lenient_count", skip_serializing_if = "Option::is_none")]
    pub saves_count: Option<u64>,
}

// =============================================================================
// PROFILE / AUTH
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    #[serde(default, deserialize_with = "null_default")]
    pub exercises: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub solutions: u64,
    #[serde(default, deserialize_with = "null_default")]
    pub saved: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub email: String,
    #[serde(rename = "memberSince", default, skip_serializing_if = "Option::is_none")]
    pub member_since: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub stats: ProfileStats,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Login/registration answer.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<crate::session::SessionUser>,
}
