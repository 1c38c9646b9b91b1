//! Content directory aggregation.
//!
//! Turns the first level of the content root into the site's navigation:
//! every visible directory becomes a section, described by a
//! [`DirectoryEntry`]. Nested directories are sections too and are reached
//! through [`get_subdirectories`] and [`find_directory`].
//!
//! ## Directory Structure
//!
//! ```text
//! content/                         # Content root
//! ├── index.md                     # Index files describe sections, never content
//! ├── faq.md                       # Root-level content item → /faq
//! ├── about-us/                    # Section → slug "about-us", title "About Us"
//! │   └── team.md
//! ├── blog/                        # Section
//! │   ├── index.md                 # Section title/description (front matter)
//! │   ├── hello-world.md           # Content item → /blog/hello-world
//! │   └── 2024/                    # Nested section → slug "blog/2024"
//! │       └── recap.md
//! ├── _drafts/                     # Hidden (underscore prefix)
//! ├── .git/                        # Hidden (dot prefix)
//! └── notes.txt                    # Stray file, not a section
//! ```
//!
//! ## Rules
//!
//! - Only directories are sections; stray files are skipped.
//! - Names starting with `.` or `_`, and names on the configured ignore list,
//!   are skipped.
//! - Sections are ordered lexicographically by slug. Filesystem order is
//!   never relied upon.
//! - A missing or unreadable content root is a [`ScanError::Configuration`].
//! - A child that cannot be read, or whose name is not UTF-8 or has no
//!   URL-safe characters, is skipped with a warning. One bad entry does not
//!   break navigation for the rest.
//! - When two folder names produce the same slug, the first by folder name
//!   wins and the other is skipped with a warning.
//! - Symlinked directories are sections, except a link back to the directory
//!   being listed or one of its ancestors, which is skipped with a warning.
//! - `itemCount` counts exactly the items the content listings return for
//!   the section and its subsections.
//!
//! Every call re-reads the filesystem. Nothing is cached or written, so
//! concurrent calls from a parallel prerender are safe.

use crate::config::SiteConfig;
use crate::frontmatter;
use crate::metadata;
use crate::naming;
use crate::types::DirectoryEntry;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("content root {} is missing or unreadable: {reason}", path.display())]
    Configuration { path: PathBuf, reason: String },
    #[error("no section with slug '{0}'")]
    UnknownDirectory(String),
    #[error("cannot read section {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// File that carries a section's own title and description.
pub const INDEX_STEM: &str = "index";

const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown"];

/// A section together with the directory it was read from.
#[derive(Debug, Clone)]
pub(crate) struct Section {
    pub entry: DirectoryEntry,
    pub path: PathBuf,
    /// Canonical paths from the content root down to this section.
    pub lineage: Vec<PathBuf>,
}

/// List the first-level sections of the content root.
///
/// This is the navigation list every page receives.
pub fn get_content_directories(config: &SiteConfig) -> Result<Vec<DirectoryEntry>, ScanError> {
    let root = content_root(config)?;
    let sections = list_sections(config, root, "", &root_lineage(root)?)?;
    debug!(
        root = %root.display(),
        count = sections.len(),
        "listed content directories"
    );
    Ok(sections.into_iter().map(|s| s.entry).collect())
}

/// List the sections directly below the section identified by `slug`.
pub fn get_subdirectories(
    config: &SiteConfig,
    slug: &str,
) -> Result<Vec<DirectoryEntry>, ScanError> {
    let parent = find_section(config, slug)?
        .ok_or_else(|| ScanError::UnknownDirectory(slug.to_string()))?;
    let sections = list_sections(config, &parent.path, &parent.entry.slug, &parent.lineage)?;
    Ok(sections.into_iter().map(|s| s.entry).collect())
}

/// Resolve a (possibly nested) section slug to its entry.
pub fn find_directory(
    config: &SiteConfig,
    slug: &str,
) -> Result<Option<DirectoryEntry>, ScanError> {
    Ok(find_section(config, slug)?.map(|s| s.entry))
}

/// Every section at any depth, each parent followed by its children.
pub fn get_all_directories(config: &SiteConfig) -> Result<Vec<DirectoryEntry>, ScanError> {
    Ok(all_sections(config)?.into_iter().map(|s| s.entry).collect())
}

/// Check the content root and return it.
pub(crate) fn content_root(config: &SiteConfig) -> Result<&Path, ScanError> {
    let root = config.content_root.as_path();
    let meta = fs::metadata(root).map_err(|e| ScanError::Configuration {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !meta.is_dir() {
        return Err(ScanError::Configuration {
            path: root.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(root)
}

fn root_lineage(root: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let canonical = fs::canonicalize(root).map_err(|e| ScanError::Configuration {
        path: root.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(vec![canonical])
}

pub(crate) fn find_section(config: &SiteConfig, slug: &str) -> Result<Option<Section>, ScanError> {
    let root = content_root(config)?;
    let segments: Vec<&str> = slug.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Ok(None);
    }

    let mut dir = root.to_path_buf();
    let mut lineage = root_lineage(root)?;
    let mut parent_slug = String::new();
    let mut found = None;
    for segment in segments {
        let wanted = naming::join_slug(&parent_slug, segment);
        let Some(section) = list_sections(config, &dir, &parent_slug, &lineage)?
            .into_iter()
            .find(|s| s.entry.slug == wanted)
        else {
            return Ok(None);
        };
        dir = section.path.clone();
        lineage = section.lineage.clone();
        parent_slug = wanted;
        found = Some(section);
    }
    Ok(found)
}

/// Every section in the tree, parents before children.
pub(crate) fn all_sections(config: &SiteConfig) -> Result<Vec<Section>, ScanError> {
    let root = content_root(config)?;
    let mut out = Vec::new();
    let mut pending = list_sections(config, root, "", &root_lineage(root)?)?;
    pending.reverse();
    while let Some(section) = pending.pop() {
        match list_sections(config, &section.path, &section.entry.slug, &section.lineage) {
            Ok(mut children) => {
                children.reverse();
                pending.extend(children);
            }
            Err(e) => warn!(error = %e, "skipping children of unreadable section"),
        }
        out.push(section);
    }
    Ok(out)
}

/// A directory child that passed the visibility filters.
struct Candidate {
    name: String,
    segment: String,
    path: PathBuf,
    lineage: Vec<PathBuf>,
}

/// List the visible subdirectories of `dir` as sections, sorted by slug.
///
/// `lineage` holds the canonical paths of `dir` and its ancestors.
pub(crate) fn list_sections(
    config: &SiteConfig,
    dir: &Path,
    parent_slug: &str,
    lineage: &[PathBuf],
) -> Result<Vec<Section>, ScanError> {
    let candidates = candidates(config, dir, lineage).map_err(|e| {
        if dir == config.content_root {
            ScanError::Configuration {
                path: dir.to_path_buf(),
                reason: e.to_string(),
            }
        } else {
            ScanError::Unreadable {
                path: dir.to_path_buf(),
                source: e,
            }
        }
    })?;

    let mut sections: Vec<Section> = candidates
        .into_par_iter()
        .map(|c| build_section(config, c, parent_slug))
        .collect();

    sections.sort_by(|a, b| a.entry.slug.cmp(&b.entry.slug));
    Ok(sections)
}

/// Visible, sluggable subdirectories of `dir`, one per slug, in folder-name order.
fn candidates(config: &SiteConfig, dir: &Path, lineage: &[PathBuf]) -> io::Result<Vec<Candidate>> {
    let mut candidates: Vec<Candidate> = fs::read_dir(dir)?
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter_map(|entry| candidate(config, entry, lineage))
        .collect();

    candidates.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

    let mut seen = HashSet::new();
    candidates.retain(|c| {
        let fresh = seen.insert(c.segment.clone());
        if !fresh {
            warn!(
                path = %c.path.display(),
                slug = %c.segment,
                "skipping directory whose slug is already taken"
            );
        }
        fresh
    });
    Ok(candidates)
}

/// Apply the visibility filters to one directory child.
fn candidate(config: &SiteConfig, entry: fs::DirEntry, lineage: &[PathBuf]) -> Option<Candidate> {
    let path = entry.path();
    let name = match entry.file_name().into_string() {
        Ok(name) => name,
        Err(raw) => {
            warn!(name = ?raw, "skipping entry with non-UTF-8 name");
            return None;
        }
    };
    if naming::is_hidden(&name, &config.ignore) {
        debug!(name = %name, "skipping hidden entry");
        return None;
    }

    // Follows symlinks, so a linked directory is a section.
    match fs::metadata(&path) {
        Ok(meta) if meta.is_dir() => {}
        Ok(_) => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unreadable entry");
            return None;
        }
    }

    if let Err(e) = fs::read_dir(&path) {
        warn!(path = %path.display(), error = %e, "skipping unreadable directory");
        return None;
    }

    let canonical = match fs::canonicalize(&path) {
        Ok(canonical) => canonical,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "skipping unresolvable directory");
            return None;
        }
    };
    if lineage.contains(&canonical) {
        warn!(path = %path.display(), "skipping directory link back to an ancestor");
        return None;
    }

    let segment = naming::slugify(&name);
    if segment.is_empty() {
        warn!(name = %name, "skipping directory with no URL-safe characters");
        return None;
    }

    let mut child_lineage = lineage.to_vec();
    child_lineage.push(canonical);
    Some(Candidate {
        name,
        segment,
        path,
        lineage: child_lineage,
    })
}

fn build_section(config: &SiteConfig, candidate: Candidate, parent_slug: &str) -> Section {
    let slug = naming::join_slug(parent_slug, &candidate.segment);
    let index = read_index(&candidate.path);

    let fallback = naming::display_title(&candidate.name);
    let title = metadata::resolve(&[
        index.title.as_deref(),
        index.heading.as_deref(),
        Some(&fallback),
    ])
    .unwrap_or_else(|| candidate.name.clone());

    let item_count = config
        .count_items
        .then(|| count_items(config, &candidate));

    Section {
        entry: DirectoryEntry {
            url: naming::url_for(&slug),
            slug,
            title,
            item_count,
            description: metadata::resolve(&[index.description.as_deref()]),
        },
        path: candidate.path,
        lineage: candidate.lineage,
    }
}

#[derive(Default)]
struct IndexMetadata {
    title: Option<String>,
    heading: Option<String>,
    description: Option<String>,
}

/// Read a section's `index.md`, if it has one.
fn read_index(dir: &Path) -> IndexMetadata {
    let Some(path) = MARKDOWN_EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{INDEX_STEM}.{ext}")))
        .find(|p| p.is_file())
    else {
        return IndexMetadata::default();
    };

    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cannot read section index");
            return IndexMetadata::default();
        }
    };
    match frontmatter::parse(&source) {
        Ok((front, body)) => IndexMetadata {
            title: front.title,
            heading: metadata::first_heading(body),
            description: front.description,
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring section index");
            IndexMetadata::default()
        }
    }
}

/// Number of content items listed in a section and all of its subsections.
///
/// Follows the same discovery as the content listings: only subsections that
/// are themselves listed, only published files with a URL-safe stem, and one
/// item per url.
fn count_items(config: &SiteConfig, section: &Candidate) -> usize {
    let own: HashSet<String> = item_files(config, &section.path)
        .par_iter()
        .filter_map(|path| published_slug(config, path))
        .collect();

    let nested = match candidates(config, &section.path, &section.lineage) {
        Ok(children) => children
            .par_iter()
            .map(|c| count_items(config, c))
            .sum::<usize>(),
        Err(e) => {
            warn!(path = %section.path.display(), error = %e, "cannot count nested items");
            0
        }
    };
    own.len() + nested
}

/// Whether a path names a markdown file.
pub(crate) fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|m| e.eq_ignore_ascii_case(m))
        })
        .unwrap_or(false)
}

/// Whether a markdown file is a section index rather than a content item.
pub(crate) fn is_index(path: &Path) -> bool {
    path.file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|s| s.eq_ignore_ascii_case(INDEX_STEM))
}

/// Visible markdown files directly inside `dir`, excluding index files,
/// sorted by filename.
pub(crate) fn item_files(config: &SiteConfig, dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| !naming::is_hidden(name, &config.ignore))
        })
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable path");
                None
            }
        })
        .filter(|e| e.file_type().is_file() && is_markdown(e.path()) && !is_index(e.path()))
        .map(|e| e.into_path())
        .collect()
}

/// The slug a file is published under, or `None` when it is never listed:
/// unreadable, malformed, a draft the site does not publish, or a stem with
/// no URL-safe characters.
fn published_slug(config: &SiteConfig, path: &Path) -> Option<String> {
    let slug = naming::slugify(&path.file_stem()?.to_string_lossy());
    if slug.is_empty() {
        return None;
    }
    let source = fs::read_to_string(path).ok()?;
    let (front, _) = frontmatter::parse(&source).ok()?;
    (config.include_drafts || !front.draft).then_some(slug)
}
