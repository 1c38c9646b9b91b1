//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and title. URLs, dates and
//! descriptions follow as indented context lines, so the output reads as a
//! content inventory first and a route table second.
//!
//! # Output Format
//!
//! ## Directories
//!
//! ```text
//! Directories
//! 001 About Us (1 item)
//!     URL: /about-us
//! 002 The Blog (3 items)
//!     URL: /blog
//!     Notes and announcements
//!     001 2024 (1 item)
//!         URL: /blog/2024
//! ```
//!
//! ## Content
//!
//! ```text
//! Content
//! 001 Hello World
//!     URL: /blog/hello-world
//!     Date: 2024-01-02
//!     Tags: intro, news
//! ```
//!
//! ## Check
//!
//! ```text
//! / → home
//! /about → about
//! /blog → directory
//! /blog/hello-world → content
//!
//! Checked 4 routes: 1 directory, 1 content page
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::loader::PageData;
use crate::preferences;
use crate::types::{ContentItem, DirectoryEntry};
use std::collections::HashMap;

const DESC_PREVIEW_LEN: usize = 60;

// ============================================================================
// Shared entity display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Format an entity header: positional index + title, with optional item count.
///
/// ```text
/// 001 The Blog (3 items)
/// 002 Docs
/// ```
fn entity_header(index: usize, title: &str, count: Option<usize>) -> String {
    match count {
        Some(n) => format!("{} {} ({})", format_index(index), title, plural(n, "item")),
        None => format!("{} {}", format_index(index), title),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

// ============================================================================
// Tree walker
// ============================================================================

/// A section placed in the tree: depth from its slug, position among siblings.
struct TreeNode<'a> {
    depth: usize,
    position: usize,
    entry: &'a DirectoryEntry,
}

/// Assign depth and per-parent positional indices to a parents-first list.
fn walk_directories(entries: &[DirectoryEntry]) -> Vec<TreeNode<'_>> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    entries
        .iter()
        .map(|entry| {
            let (parent, depth) = match entry.slug.rsplit_once('/') {
                Some((parent, _)) => (parent, entry.slug.matches('/').count()),
                None => ("", 0),
            };
            let position = positions.entry(parent).or_default();
            *position += 1;
            TreeNode {
                depth,
                position: *position,
                entry,
            }
        })
        .collect()
}

// ============================================================================
// Directories
// ============================================================================

/// Format a list of sections. Nested sections (slugs containing `/`) are
/// indented under their parent; the list must have parents first.
pub fn format_directories(entries: &[DirectoryEntry]) -> Vec<String> {
    let mut lines = vec!["Directories".to_string()];
    if entries.is_empty() {
        lines.push("    (none)".to_string());
        return lines;
    }

    for node in walk_directories(entries) {
        let base = indent(node.depth);
        let entry = node.entry;
        lines.push(format!(
            "{}{}",
            base,
            entity_header(node.position, &entry.title, entry.item_count)
        ));
        lines.push(format!("{}    URL: {}", base, entry.url));
        if let Some(desc) = &entry.description {
            let preview = truncate_desc(desc.trim(), DESC_PREVIEW_LEN);
            if !preview.is_empty() {
                lines.push(format!("{}    {}", base, preview));
            }
        }
    }
    lines
}

/// Print a section list to stdout.
pub fn print_directories(entries: &[DirectoryEntry]) {
    for line in format_directories(entries) {
        println!("{}", line);
    }
}

// ============================================================================
// Content
// ============================================================================

/// Format a list of content items.
pub fn format_content(items: &[ContentItem]) -> Vec<String> {
    let mut lines = vec!["Content".to_string()];
    if items.is_empty() {
        lines.push("    (none)".to_string());
        return lines;
    }

    for (i, item) in items.iter().enumerate() {
        lines.push(entity_header(i + 1, &item.title, None));
        lines.push(format!("    URL: {}", item.url));
        if let Some(date) = &item.date {
            lines.push(format!("    Date: {}", date));
        }
        if let Some(author) = &item.author {
            lines.push(format!("    Author: {}", author));
        }
        if !item.tags.is_empty() {
            lines.push(format!("    Tags: {}", item.tags.join(", ")));
        }
        if let Some(desc) = &item.description {
            lines.push(format!("    {}", truncate_desc(desc.trim(), DESC_PREVIEW_LEN)));
        }
    }
    lines
}

/// Print a content list to stdout.
pub fn print_content(items: &[ContentItem]) {
    for line in format_content(items) {
        println!("{}", line);
    }
}

// ============================================================================
// Routes
// ============================================================================

/// Format the prerender route list, one path per line.
pub fn format_routes(routes: &[String]) -> Vec<String> {
    let mut lines: Vec<String> = routes.to_vec();
    lines.push(String::new());
    lines.push(plural(routes.len(), "route"));
    lines
}

/// Print the route list to stdout.
pub fn print_routes(routes: &[String]) {
    for line in format_routes(routes) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

fn page_kind(page: &PageData) -> &'static str {
    match page {
        PageData::Home { .. } => "home",
        PageData::About { .. } => "about",
        PageData::Directory { .. } => "directory",
        PageData::Content { .. } => "content",
    }
}

/// Format the result of loading every prerendered route.
pub fn format_check_output(pages: &[(String, PageData)]) -> Vec<String> {
    let mut lines: Vec<String> = pages
        .iter()
        .map(|(route, page)| format!("{} \u{2192} {}", route, page_kind(page)))
        .collect();

    let directories = pages
        .iter()
        .filter(|(_, p)| matches!(p, PageData::Directory { .. }))
        .count();
    let content = pages
        .iter()
        .filter(|(_, p)| matches!(p, PageData::Content { .. }))
        .count();

    lines.push(String::new());
    lines.push(format!(
        "Checked {}: {}, {}",
        plural(pages.len(), "route"),
        if directories == 1 {
            "1 directory".to_string()
        } else {
            format!("{directories} directories")
        },
        plural(content, "content page")
    ));
    lines
}

/// Print a check report to stdout.
pub fn print_check_output(pages: &[(String, PageData)]) {
    for line in format_check_output(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// Preferences
// ============================================================================

/// Format the current font scale and the CSS it produces.
pub fn format_font_scale(scale: f64) -> Vec<String> {
    vec![
        format!("Font scale: {}", preferences::format_scale(scale)),
        format!("    {}", preferences::css_declaration(scale)),
    ]
}

pub fn print_font_scale(scale: f64) {
    for line in format_font_scale(scale) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
