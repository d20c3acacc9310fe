//! Presentation helpers: initials, relative times, difficulty buckets and
//! dashboard filtering.

#[cfg(test)]
#[path = "display_test.rs"]
mod tests;

use std::fmt;
use std::str::FromStr;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::types::Exercise;

/// Subjects offered when creating an exercise.
pub const SUBJECTS: &[&str] = &[
    "Algebra",
    "Linear Algebra",
    "Calculus",
    "Discrete Mathematics",
    "Statistics",
    "Probability",
    "Math",
    "Algorithms",
    "Data Structures",
    "Programming",
    "Object-Oriented Programming",
    "Software Engineering",
    "Web Development",
    "Mobile Development",
    "Databases",
    "Operating Systems",
    "Networks",
    "Computer Architecture",
    "Cybersecurity",
    "Artificial Intelligence",
    "Machine Learning",
    "Economics",
    "Management",
    "Accounting",
    "Finance",
    "Marketing",
    "Operations Management",
    "Physics",
    "English",
    "French",
    "Project Management",
    "Education",
];

// =============================================================================
// INITIALS
// =============================================================================

/// First letters of the first two words, uppercased; `"??"` for a blank name.
#[must_use]
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() { "??".to_owned() } else { letters }
}

// =============================================================================
// RELATIVE TIME
// =============================================================================

/// Coarse age of an RFC 3339 timestamp relative to `now`.
///
/// Empty for a missing or unparseable timestamp. Future timestamps read as
/// `0 min ago`.
#[must_use]
pub fn time_ago(created_at: Option<&str>, now: OffsetDateTime) -> String {
    let Some(created) = created_at.and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok()) else {
        return String::new();
    };
    let minutes = (now - created).whole_minutes().max(0);
    let hours = minutes / 60;
    let days = hours / 24;
    let weeks = days / 7;

    if minutes < 60 {
        format!("{minutes} min ago")
    } else if hours < 24 {
        format!("{hours}h ago")
    } else if days < 7 {
        format!("{days} days ago")
    } else {
        format!("{weeks} weeks ago")
    }
}

// =============================================================================
// DIFFICULTY
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Bucket a free-form label by substring (`begin`, `inter`, `adv`).
    #[must_use]
    pub fn classify(label: &str) -> Option<Self> {
        let raw = label.to_lowercase();
        if raw.contains("begin") {
            Some(Self::Beginner)
        } else if raw.contains("inter") {
            Some(Self::Intermediate)
        } else if raw.contains("adv") {
            Some(Self::Advanced)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Beginner => "Beginner",
            Self::Intermediate => "Intermediate",
            Self::Advanced => "Advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::classify(raw).ok_or_else(|| format!("unknown difficulty '{raw}' (expected Beginner, Intermediate or Advanced)"))
    }
}

// =============================================================================
// FILTER
// =============================================================================

/// Dashboard search box plus subject pill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExerciseFilter {
    pub query: Option<String>,
    pub subject: Option<String>,
}

impl ExerciseFilter {
    #[must_use]
    pub fn matches(&self, exercise: &Exercise) -> bool {
        let subject_ok = self
            .subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .is_none_or(|wanted| exercise.subject.trim().eq_ignore_ascii_case(wanted.trim()));

        let query_ok = self
            .query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .is_none_or(|needle| {
                let needle = needle.to_lowercase();
                [&exercise.title, &exercise.description, &exercise.subject]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            });

        subject_ok && query_ok
    }

    #[must_use]
    pub fn apply(&self, exercises: Vec<Exercise>) -> Vec<Exercise> {
        exercises.into_iter().filter(|e| self.matches(e)).collect()
    }
}
