use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// YouTube privacy setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Unlisted,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Unlisted => "unlisted",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "public" => Ok(Visibility::Public),
            "unlisted" => Ok(Visibility::Unlisted),
            "private" => Ok(Visibility::Private),
            other => Err(format!("Unknown visibility '{}'", other)),
        }
    }
}

/// How column A is compared against the requested file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_insensitive: bool,
    pub trim: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            trim: true,
        }
    }
}

impl MatchOptions {
    pub fn matches(&self, cell: &str, file_name: &str) -> bool {
        let (cell, file_name) = if self.trim {
            (cell.trim(), file_name.trim())
        } else {
            (cell, file_name)
        };

        if self.case_insensitive {
            cell.to_lowercase() == file_name.to_lowercase()
        } else {
            cell == file_name
        }
    }
}

/// Values used when a sheet cell is blank
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDefaults {
    pub category_id: String,
    pub visibility: Visibility,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            category_id: "22".to_string(), // People & Blogs
            visibility: Visibility::Unlisted,
        }
    }
}

/// Publishing attributes for one video, read from a spreadsheet row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub file_name: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    /// Drive file id of the thumbnail image
    pub thumbnail: Option<String>,
    pub category_id: String,
    pub visibility: Visibility,
    pub playlist_id: Option<String>,
}

impl VideoMetadata {
    /// Maps columns A..H of one row. Missing trailing cells count as blank.
    pub fn from_row(row: &[String], defaults: &MetadataDefaults) -> Self {
        let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");
        let optional = |idx: usize| Some(cell(idx)).filter(|c| !c.is_empty()).map(str::to_string);

        let visibility = match cell(6) {
            "" => defaults.visibility,
            raw => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}; using {}", e, defaults.visibility);
                defaults.visibility
            }),
        };

        Self {
            file_name: cell(0).to_string(),
            title: cell(1).to_string(),
            description: row.get(2).cloned().unwrap_or_default(),
            tags: parse_tags(cell(3)),
            thumbnail: optional(4),
            category_id: optional(5).unwrap_or_else(|| defaults.category_id.clone()),
            visibility,
            playlist_id: optional(7),
        }
    }
}

/// Comma separated tag cell into an ordered list, blanks dropped
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_full_row_mapping() {
        let metadata = VideoMetadata::from_row(
            &row(&["a.mp4", "Title", "Desc", "one, two ,three", "THUMB1", "10", "Public", "PL1"]),
            &MetadataDefaults::default(),
        );

        assert_eq!(metadata.file_name, "a.mp4");
        assert_eq!(metadata.title, "Title");
        assert_eq!(metadata.description, "Desc");
        assert_eq!(metadata.tags, vec!["one", "two", "three"]);
        assert_eq!(metadata.thumbnail.as_deref(), Some("THUMB1"));
        assert_eq!(metadata.category_id, "10");
        assert_eq!(metadata.visibility, Visibility::Public);
        assert_eq!(metadata.playlist_id.as_deref(), Some("PL1"));
    }

    #[test]
    fn test_short_row_uses_defaults() {
        let metadata = VideoMetadata::from_row(&row(&["a.mp4", "Title"]), &MetadataDefaults::default());

        assert!(metadata.tags.is_empty());
        assert_eq!(metadata.thumbnail, None);
        assert_eq!(metadata.category_id, "22");
        assert_eq!(metadata.visibility, Visibility::Unlisted);
        assert_eq!(metadata.playlist_id, None);
    }

    #[test]
    fn test_unknown_visibility_falls_back() {
        let defaults = MetadataDefaults {
            category_id: "22".to_string(),
            visibility: Visibility::Private,
        };
        let metadata = VideoMetadata::from_row(
            &row(&["a.mp4", "T", "", "", "", "", "friends-only"]),
            &defaults,
        );
        assert_eq!(metadata.visibility, Visibility::Private);
    }

    #[test]
    fn test_match_options() {
        let relaxed = MatchOptions::default();
        assert!(relaxed.matches("  A.MP4 ", "a.mp4"));

        let strict = MatchOptions {
            case_insensitive: false,
            trim: false,
        };
        assert!(!strict.matches("A.mp4", "a.mp4"));
        assert!(!strict.matches("a.mp4 ", "a.mp4"));
        assert!(strict.matches("a.mp4", "a.mp4"));
    }

    #[test]
    fn test_visibility_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Visibility::Unlisted).unwrap(), "\"unlisted\"");
    }
}
