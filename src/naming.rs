//! Naming rules shared by sections and content items.
//!
//! The filesystem is the source of truth for identity: a section's slug comes
//! from its folder name and a content item's slug from its file stem. This
//! module turns those names into slugs, display titles and URLs, and decides
//! which names are hidden from the site.
//!
//! ## Hidden names
//!
//! Names beginning with `.` (editor and VCS droppings) or `_` (drafts,
//! partials, private folders) never become sections or content. On top of
//! that, the configured ignore list drops exact names such as `node_modules`.
//!
//! ## Slugs and URLs
//!
//! - `about-us/` → slug `about-us`, url `/about-us`, title "About Us"
//! - `My Notes/` → slug `My-Notes`, url `/My-Notes`, title "My Notes"
//! - `getting_started.md` → slug `getting_started`, title "Getting Started"
//!
//! A URL is always `"/" + slug`, so it can be recomputed from the slug alone.

/// Prefixes that hide a file or directory from the site.
pub const HIDDEN_PREFIXES: &[char] = &['.', '_'];

const MAX_SLUG_LEN: usize = 80;

/// Whether a directory or file name is excluded from the site.
pub fn is_hidden(name: &str, ignore: &[String]) -> bool {
    name.starts_with(HIDDEN_PREFIXES) || ignore.iter().any(|i| i == name)
}

/// Make a single path segment URL-safe.
///
/// - Keeps alphanumerics (including non-ASCII letters), `-` and `_`
/// - Replaces everything else with a dash
/// - Collapses consecutive dashes and strips leading/trailing ones
/// - Truncates to `MAX_SLUG_LEN` characters, breaking at the last dash
pub fn slugify(name: &str) -> String {
    let mut collapsed = String::with_capacity(name.len());
    let mut prev_dash = false;
    for c in name.chars() {
        let c = if c.is_alphanumeric() || c == '_' {
            c
        } else {
            '-'
        };
        if c == '-' {
            if !prev_dash {
                collapsed.push('-');
            }
            prev_dash = true;
        } else {
            collapsed.push(c);
            prev_dash = false;
        }
    }

    let trimmed = collapsed.trim_matches('-');
    if trimmed.chars().count() <= MAX_SLUG_LEN {
        return trimmed.to_string();
    }

    let truncated: String = trimmed.chars().take(MAX_SLUG_LEN).collect();
    match truncated.rfind('-') {
        Some(pos) => truncated[..pos].to_string(),
        None => truncated,
    }
}

/// Human-readable title from a folder name or file stem.
///
/// Dashes and underscores become spaces and every word is capitalized.
pub fn display_title(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Navigational URL for a slug.
pub fn url_for(slug: &str) -> String {
    format!("/{slug}")
}

/// Join a parent slug and a child segment into a nested slug.
pub fn join_slug(parent: &str, segment: &str) -> String {
    if parent.is_empty() {
        segment.to_string()
    } else {
        format!("{parent}/{segment}")
    }
}
