//! Content items: markdown files rendered as pages.
//!
//! Every visible markdown file that is not an `index.md` becomes a
//! [`ContentItem`]. Items live either directly in the content root
//! (`faq.md` → `/faq`) or in a section (`blog/hello.md` → `/blog/hello`).
//! Items are discovered section by section, so the hidden/ignored rules and
//! slug de-duplication of [`crate::scan`] apply to content URLs as well.
//!
//! ## Metadata
//!
//! - **Title**: front matter `title` → first `# heading` → file stem
//!   (`getting-started.md` → "Getting Started")
//! - **Description**: front matter `description` → first paragraph
//! - **Date, author, tags**: front matter only
//!
//! Files marked `draft: true` are left out unless `include_drafts` is set.
//! When listing many items, a file that cannot be read or has malformed
//! front matter is skipped with a warning; looking one up by URL reports
//! the error instead.

use crate::config::SiteConfig;
use crate::frontmatter::{self, FrontMatterError};
use crate::metadata;
use crate::naming;
use crate::scan::{self, ScanError};
use crate::types::ContentItem;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ContentError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
}

/// Every published content item in the site, sorted by url.
pub fn get_all_content(config: &SiteConfig) -> Result<Vec<ContentItem>, ContentError> {
    let root = scan::content_root(config)?;
    let mut dirs: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];
    dirs.extend(
        scan::all_sections(config)?
            .into_iter()
            .map(|s| (s.path, s.entry.slug)),
    );

    let mut items: Vec<ContentItem> = dirs
        .par_iter()
        .flat_map_iter(|(dir, slug)| items_in(config, dir, slug))
        .collect();
    items.sort_by(|a, b| a.url.cmp(&b.url));

    debug!(count = items.len(), "collected content");
    Ok(items)
}

/// Items stored directly in the section `slug` (not in its subsections).
pub fn get_content_by_directory(
    config: &SiteConfig,
    slug: &str,
) -> Result<Vec<ContentItem>, ContentError> {
    let section = scan::find_section(config, slug)?
        .ok_or_else(|| ScanError::UnknownDirectory(slug.to_string()))?;
    Ok(items_in(config, &section.path, &section.entry.slug))
}

/// Look up a single item by its url. Leading and trailing slashes are optional.
pub fn get_content_by_url(
    config: &SiteConfig,
    url: &str,
) -> Result<Option<ContentItem>, ContentError> {
    let trimmed = url.trim_matches('/');
    if trimmed.is_empty() {
        return Ok(None);
    }
    let wanted = naming::url_for(trimmed);
    let (parent_slug, _) = trimmed.rsplit_once('/').unwrap_or(("", trimmed));

    let dir = if parent_slug.is_empty() {
        scan::content_root(config)?.to_path_buf()
    } else {
        match scan::find_section(config, parent_slug)? {
            Some(section) => section.path,
            None => return Ok(None),
        }
    };

    // Candidates in filename order; the first one that parses wins, the same
    // rule listings apply.
    let mut first_error = None;
    for path in scan::item_files(config, &dir) {
        if item_url(&path, parent_slug).as_deref() != Some(wanted.as_str()) {
            continue;
        }
        match read_item(config, &path, parent_slug) {
            Ok(Some(item)) => return Ok(Some(item)),
            Ok(None) => {}
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

/// The most recent items: dated items newest first, then undated by url.
pub fn latest_content(
    config: &SiteConfig,
    limit: usize,
) -> Result<Vec<ContentItem>, ContentError> {
    let mut items = get_all_content(config)?;
    items.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)));
    items.truncate(limit);
    Ok(items)
}

/// Published items directly inside `dir`, sorted by url.
///
/// Unreadable and malformed files are skipped with a warning. When two files
/// produce the same url, the first by filename wins.
fn items_in(config: &SiteConfig, dir: &Path, parent_slug: &str) -> Vec<ContentItem> {
    let files = scan::item_files(config, dir);
    let parsed: Vec<ContentItem> = files
        .par_iter()
        .filter_map(|path| match read_item(config, path, parent_slug) {
            Ok(item) => item,
            Err(e) => {
                warn!(error = %e, "skipping content file");
                None
            }
        })
        .collect();

    let mut seen = HashSet::new();
    let mut items: Vec<ContentItem> = parsed
        .into_iter()
        .filter(|item| {
            let fresh = seen.insert(item.url.clone());
            if !fresh {
                warn!(url = %item.url, "skipping content whose url is already taken");
            }
            fresh
        })
        .collect();
    items.sort_by(|a, b| a.url.cmp(&b.url));
    items
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// The url a file would be published under, computed from its name alone.
fn item_url(path: &Path, parent_slug: &str) -> Option<String> {
    let slug = naming::slugify(&file_stem(path));
    (!slug.is_empty()).then(|| naming::url_for(&naming::join_slug(parent_slug, &slug)))
}

/// Parse one markdown file. `Ok(None)` for drafts and unsluggable names.
fn read_item(
    config: &SiteConfig,
    path: &Path,
    parent_slug: &str,
) -> Result<Option<ContentItem>, ContentError> {
    let source = fs::read_to_string(path).map_err(|source| ContentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (front, body) = frontmatter::parse(&source).map_err(|source| ContentError::FrontMatter {
        path: path.to_path_buf(),
        source,
    })?;

    if front.draft && !config.include_drafts {
        debug!(path = %path.display(), "skipping draft");
        return Ok(None);
    }

    let stem = file_stem(path);
    let slug = naming::slugify(&stem);
    if slug.is_empty() {
        warn!(path = %path.display(), "skipping content with no URL-safe characters");
        return Ok(None);
    }

    let fallback = naming::display_title(&stem);
    let heading = metadata::first_heading(body);
    let title = metadata::resolve(&[
        front.title.as_deref(),
        heading.as_deref(),
        Some(&fallback),
    ])
    .unwrap_or_else(|| slug.clone());

    let excerpt = metadata::excerpt(body);
    let description = metadata::resolve(&[front.description.as_deref(), excerpt.as_deref()]);

    Ok(Some(ContentItem {
        url: naming::url_for(&naming::join_slug(parent_slug, &slug)),
        directory: parent_slug.split('/').next().unwrap_or_default().to_string(),
        slug,
        title,
        description,
        date: metadata::resolve(&[front.date.as_deref()]),
        author: metadata::resolve(&[front.author.as_deref()]),
        tags: front.tags,
        html: metadata::render_html(body),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn blog_site() -> TestSite {
        SiteBuilder::new()
            .page("faq.md", "# Questions\n\nAsk away.")
            .page("index.md", "# Home")
            .page(
                "blog/hello-world.md",
                "---\ntitle: Hello World\ndate: 2024-03-01\nauthor: Jane\ntags: [intro]\n---\nFirst post body.",
            )
            .page(
                "blog/second.md",
                "---\ndate: 2024-05-10\ndescription: The sequel\n---\n# Second Post\n\nMore.",
            )
            .page("blog/draft.md", "---\ndraft: true\n---\n# Draft")
            .page("blog/index.md", "---\ntitle: Blog\n---\n")
            .page("blog/2024/recap.md", "# Recap\n\nYear in review.")
            .page("blog/_hidden.md", "# Hidden")
            .page("docs/getting-started.md", "Intro text without heading.")
            .page("_partials/nav.md", "# Nav")
            .build()
    }

    #[test]
    fn all_content_sorted_by_url() {
        let site = blog_site();
        let items = get_all_content(&site.config()).unwrap();
        assert_eq!(
            urls(&items),
            vec![
                "/blog/2024/recap",
                "/blog/hello-world",
                "/blog/second",
                "/docs/getting-started",
                "/faq",
            ]
        );
    }

    #[test]
    fn drafts_included_when_configured() {
        let site = blog_site();
        let mut config = site.config();
        config.include_drafts = true;
        let items = get_all_content(&config).unwrap();
        find_item(&items, "/blog/draft");
    }

    #[test]
    fn metadata_resolution() {
        let site = blog_site();
        let items = get_all_content(&site.config()).unwrap();

        let hello = find_item(&items, "/blog/hello-world");
        assert_eq!(hello.title, "Hello World");
        assert_eq!(hello.slug, "hello-world");
        assert_eq!(hello.directory, "blog");
        assert_eq!(hello.date.as_deref(), Some("2024-03-01"));
        assert_eq!(hello.author.as_deref(), Some("Jane"));
        assert_eq!(hello.tags, vec!["intro"]);
        assert_eq!(hello.description.as_deref(), Some("First post body."));
        assert!(hello.html.contains("<p>First post body.</p>"));

        let second = find_item(&items, "/blog/second");
        assert_eq!(second.title, "Second Post");
        assert_eq!(second.description.as_deref(), Some("The sequel"));

        let started = find_item(&items, "/docs/getting-started");
        assert_eq!(started.title, "Getting Started");

        let faq = find_item(&items, "/faq");
        assert_eq!(faq.directory, "");
        assert_eq!(faq.title, "Questions");
    }

    #[test]
    fn nested_item_belongs_to_first_level_section() {
        let site = blog_site();
        let items = get_all_content(&site.config()).unwrap();
        assert_eq!(find_item(&items, "/blog/2024/recap").directory, "blog");
    }

    #[test]
    fn content_by_directory_is_direct_children_only() {
        let site = blog_site();
        let items = get_content_by_directory(&site.config(), "blog").unwrap();
        assert_eq!(urls(&items), vec!["/blog/hello-world", "/blog/second"]);

        let nested = get_content_by_directory(&site.config(), "blog/2024").unwrap();
        assert_eq!(urls(&nested), vec!["/blog/2024/recap"]);
    }

    #[test]
    fn content_by_unknown_directory_is_error() {
        let site = blog_site();
        let result = get_content_by_directory(&site.config(), "missing");
        assert!(matches!(
            result,
            Err(ContentError::Scan(ScanError::UnknownDirectory(_)))
        ));
    }

    #[test]
    fn content_by_url_lookup() {
        let site = blog_site();
        let config = site.config();

        let item = get_content_by_url(&config, "/blog/second/").unwrap().unwrap();
        assert_eq!(item.title, "Second Post");
        assert!(get_content_by_url(&config, "faq").unwrap().is_some());
        assert!(get_content_by_url(&config, "/blog/nope").unwrap().is_none());
        assert!(get_content_by_url(&config, "/nope/x").unwrap().is_none());
        assert!(get_content_by_url(&config, "/").unwrap().is_none());
        assert!(get_content_by_url(&config, "/blog/draft").unwrap().is_none());
    }

    #[test]
    fn content_by_url_reports_malformed_file() {
        let site = SiteBuilder::new()
            .page("blog/bad.md", "---\ntitle: unterminated\n")
            .build();
        let result = get_content_by_url(&site.config(), "/blog/bad");
        assert!(matches!(result, Err(ContentError::FrontMatter { .. })));
    }

    #[test]
    fn listing_skips_malformed_file() {
        let site = SiteBuilder::new()
            .page("blog/bad.md", "---\ntitle: unterminated\n")
            .page("blog/good.md", "# Good")
            .build();
        let items = get_all_content(&site.config()).unwrap();
        assert_eq!(urls(&items), vec!["/blog/good"]);
    }

    #[test]
    fn colliding_urls_keep_first_file() {
        let site = SiteBuilder::new()
            .page("notes/a b.md", "# Spaced")
            .page("notes/a-b.md", "# Dashed")
            .build();
        let config = site.config();

        let items = get_content_by_directory(&config, "notes").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Spaced");

        let looked_up = get_content_by_url(&config, "/notes/a-b").unwrap().unwrap();
        assert_eq!(looked_up.title, "Spaced");
    }

    #[test]
    fn latest_content_newest_first_then_undated() {
        let site = blog_site();
        let latest = latest_content(&site.config(), 3).unwrap();
        assert_eq!(
            urls(&latest),
            vec!["/blog/second", "/blog/hello-world", "/blog/2024/recap"]
        );
    }

    #[test]
    fn content_fails_on_missing_root() {
        let config = SiteConfig::for_root("/definitely/not/here");
        assert!(matches!(
            get_all_content(&config),
            Err(ContentError::Scan(ScanError::Configuration { .. }))
        ));
    }
}
