use chrono::{DateTime, Utc};
use regex::Regex;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use crate::common::{DEFAULT_DURATION, DEFAULT_THUMBNAIL};

/// Fixed category set. Anything blank or unrecognized collapses to
/// `NotCategorized`, so a hand-edited catalog document never poisons a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Educational,
    Documentary,
    Animation,
    Live,
    Movies,
    #[default]
    NotCategorized,
}

impl Category {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed {
            _ if trimmed.eq_ignore_ascii_case("Educational") => Category::Educational,
            _ if trimmed.eq_ignore_ascii_case("Documentary") => Category::Documentary,
            _ if trimmed.eq_ignore_ascii_case("Animation") => Category::Animation,
            _ if trimmed.eq_ignore_ascii_case("Live") => Category::Live,
            _ if trimmed.eq_ignore_ascii_case("Movies") => Category::Movies,
            _ => Category::NotCategorized,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Educational => "Educational",
            Category::Documentary => "Documentary",
            Category::Animation => "Animation",
            Category::Live => "Live",
            Category::Movies => "Movies",
            Category::NotCategorized => "Not Categorized",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Category::parse(&raw))
    }
}

/// One catalog entry. Wire shape is camelCase JSON inside the persisted
/// `{"videos": [...]}` document and in every API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "default_duration")]
    pub duration: String,
    pub filename: String,
    #[serde(default = "default_thumbnail")]
    pub thumbnail_filename: String,
    #[serde(default)]
    pub views: u64,
    pub upload_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub size_label: String,
    #[serde(default)]
    pub externally_imported: bool,
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

fn default_thumbnail() -> String {
    DEFAULT_THUMBNAIL.to_string()
}

impl VideoRecord {
    pub fn has_custom_thumbnail(&self) -> bool {
        self.thumbnail_filename != DEFAULT_THUMBNAIL
    }

    /// Case-insensitive substring match against title, description and
    /// category. `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.label().to_lowercase().contains(needle)
    }
}

static DURATION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,2}:\d{2}(:\d{2})?$").expect("valid duration pattern"));

/// Accepts `M:SS`, `MM:SS` and `H:MM:SS` display durations.
pub fn is_valid_duration(raw: &str) -> bool {
    DURATION_PATTERN.is_match(raw.trim())
}

/// Title for a file discovered in storage: strip the extension, turn `_`/`-`
/// into spaces, drop anything else non-alphanumeric and title-case each word.
pub fn title_from_filename(filename: &str) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename);
    let spaced: String = stem
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    let title = spaced
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_ascii_uppercase().to_string() + &chars.as_str().to_ascii_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() {
        "Untitled".to_string()
    } else {
        title
    }
}
