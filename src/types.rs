//! Records handed to the rendering layer.
//!
//! The rendering layer binds to these structurally, so field names and
//! serialized shape are a stable contract: camelCase keys, optional fields
//! omitted when absent.

use serde::{Deserialize, Serialize};

/// One navigable section of the site.
///
/// `url` is always `"/" + slug`. First-level sections have single-segment
/// slugs (`blog`); nested sections carry the full path (`blog/2024`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub slug: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A markdown file rendered as a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Slugified file stem
    pub slug: String,
    pub title: String,
    /// `"/" + slugified relative path without extension`
    pub url: String,
    /// Slug of the first-level section, empty for files in the content root
    pub directory: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Rendered body
    pub html: String,
}
