//! Page data for each route of the site.
//!
//! The site has four kinds of route:
//!
//! | Route | Page data |
//! |-------|-----------|
//! | `/` | navigation + latest content |
//! | `/about` | navigation |
//! | `/<section>[/<sub>...]` | navigation + the section, its subsections and items |
//! | `/<path to item>` | navigation + one content item |
//!
//! Every page receives the navigation list from
//! [`get_content_directories`] unmodified. A path that names both a
//! section and a content item (`blog/2024/` next to `blog/2024.md`) loads
//! the section.

use crate::config::SiteConfig;
use crate::content::{self, ContentError};
use crate::naming;
use crate::scan::{self, ScanError, get_content_directories};
use crate::types::{ContentItem, DirectoryEntry};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("no page at {0}")]
    NotFound(String),
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error(transparent)]
    Content(#[from] ContentError),
}

/// A request path resolved to the kind of page it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    /// Slash-joined path segments, without leading or trailing slashes.
    Path(String),
}

impl Route {
    /// Parse a request path. Query strings, fragments, and repeated or
    /// trailing slashes are ignored.
    pub fn parse(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let joined = path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("/");
        match joined.as_str() {
            "" => Route::Home,
            "about" => Route::About,
            _ => Route::Path(joined),
        }
    }
}

/// Data the rendering layer needs for one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum PageData {
    Home {
        directories: Vec<DirectoryEntry>,
        latest: Vec<ContentItem>,
    },
    About {
        directories: Vec<DirectoryEntry>,
    },
    Directory {
        directories: Vec<DirectoryEntry>,
        directory: DirectoryEntry,
        subdirectories: Vec<DirectoryEntry>,
        content: Vec<ContentItem>,
    },
    Content {
        directories: Vec<DirectoryEntry>,
        item: ContentItem,
    },
}

/// Load the data for a request path.
pub fn load(config: &SiteConfig, path: &str) -> Result<PageData, LoadError> {
    let route = Route::parse(path);
    debug!(path, ?route, "loading page");

    let directories = get_content_directories(config)?;
    match route {
        Route::Home => Ok(PageData::Home {
            directories,
            latest: content::latest_content(config, config.latest_count)?,
        }),
        Route::About => Ok(PageData::About { directories }),
        Route::Path(slug) => {
            if let Some(directory) = scan::find_directory(config, &slug)? {
                return Ok(PageData::Directory {
                    directories,
                    subdirectories: scan::get_subdirectories(config, &slug)?,
                    content: content::get_content_by_directory(config, &slug)?,
                    directory,
                });
            }
            match content::get_content_by_url(config, &slug)? {
                Some(item) => Ok(PageData::Content { directories, item }),
                None => Err(LoadError::NotFound(naming::url_for(&slug))),
            }
        }
    }
}

/// Every path the site prerenders, sorted.
///
/// `/`, `/about`, every section at any depth, and every content item.
pub fn prerender_routes(config: &SiteConfig) -> Result<Vec<String>, LoadError> {
    let mut routes = BTreeSet::from(["/".to_string(), "/about".to_string()]);
    routes.extend(scan::all_sections(config)?.into_iter().map(|s| s.entry.url));
    routes.extend(
        content::get_all_content(config)?
            .into_iter()
            .map(|item| item.url),
    );
    Ok(routes.into_iter().collect())
}

/// Load every prerendered route in parallel.
///
/// Loads share no mutable state, so they run concurrently; the result keeps
/// the order of [`prerender_routes`].
pub fn prerender(config: &SiteConfig) -> Result<Vec<(String, PageData)>, LoadError> {
    prerender_routes(config)?
        .into_par_iter()
        .map(|route| load(config, &route).map(|data| (route, data)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;

    fn site() -> TestSite {
        SiteBuilder::new()
            .page("faq.md", "# FAQ")
            .page("blog/index.md", "---\ntitle: The Blog\n---\n")
            .page("blog/hello.md", "---\ndate: 2024-01-02\n---\n# Hello")
            .page("blog/2024/recap.md", "# Recap")
            .page("blog/2024.md", "# Shadowed by the section")
            .page("docs/intro.md", "# Intro")
            .build()
    }

    // =========================================================================
    // Route parsing
    // =========================================================================

    #[test]
    fn parse_home_variants() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(Route::parse("//?q=1"), Route::Home);
    }

    #[test]
    fn parse_about() {
        assert_eq!(Route::parse("/about/"), Route::About);
    }

    #[test]
    fn parse_paths_normalize_slashes() {
        assert_eq!(Route::parse("/blog"), Route::Path("blog".into()));
        assert_eq!(
            Route::parse("blog//2024/#top"),
            Route::Path("blog/2024".into())
        );
    }

    #[test]
    fn parse_keeps_whitespace_inside_segments() {
        assert_eq!(Route::parse("/blog/ x/"), Route::Path("blog/ x".into()));
        assert_eq!(Route::parse("/blog/%20x"), Route::Path("blog/%20x".into()));
        assert_eq!(Route::parse("/ about"), Route::Path(" about".into()));
    }

    #[test]
    fn whitespace_path_does_not_resolve_to_trimmed_page() {
        let site = site();
        assert!(matches!(
            load(&site.config(), "/docs/ intro"),
            Err(LoadError::NotFound(_))
        ));
    }

    // =========================================================================
    // load()
    // =========================================================================

    #[test]
    fn home_has_directories_and_latest() {
        let site = site();
        let PageData::Home {
            directories,
            latest,
        } = load(&site.config(), "/").unwrap()
        else {
            panic!("expected home page");
        };
        assert_eq!(slugs(&directories), vec!["blog", "docs"]);
        assert_eq!(latest[0].url, "/blog/hello");
    }

    #[test]
    fn home_latest_respects_limit() {
        let site = site();
        let mut config = site.config();
        config.latest_count = 1;
        let PageData::Home { latest, .. } = load(&config, "/").unwrap() else {
            panic!("expected home page");
        };
        assert_eq!(latest.len(), 1);
    }

    #[test]
    fn about_passes_directories_unmodified() {
        let site = site();
        let config = site.config();
        let expected = get_content_directories(&config).unwrap();
        assert_eq!(
            load(&config, "/about").unwrap(),
            PageData::About {
                directories: expected
            }
        );
    }

    #[test]
    fn directory_page() {
        let site = site();
        let PageData::Directory {
            directory,
            subdirectories,
            content,
            ..
        } = load(&site.config(), "/blog").unwrap()
        else {
            panic!("expected directory page");
        };
        assert_eq!(directory.title, "The Blog");
        assert_eq!(slugs(&subdirectories), vec!["blog/2024"]);
        assert_eq!(urls(&content), vec!["/blog/2024", "/blog/hello"]);
    }

    #[test]
    fn section_wins_over_same_named_item() {
        let site = site();
        let page = load(&site.config(), "/blog/2024/").unwrap();
        assert!(matches!(page, PageData::Directory { .. }));
    }

    #[test]
    fn content_page() {
        let site = site();
        let PageData::Content { item, directories } = load(&site.config(), "/docs/intro").unwrap()
        else {
            panic!("expected content page");
        };
        assert_eq!(item.title, "Intro");
        assert_eq!(directories.len(), 2);

        let faq = load(&site.config(), "/faq").unwrap();
        assert!(matches!(faq, PageData::Content { .. }));
    }

    #[test]
    fn unknown_path_is_not_found() {
        let site = site();
        let result = load(&site.config(), "/nope/nothing");
        assert!(matches!(result, Err(LoadError::NotFound(ref url)) if url == "/nope/nothing"));
    }

    #[test]
    fn missing_root_propagates_configuration_error() {
        let config = SiteConfig::for_root("/definitely/not/here");
        assert!(matches!(
            load(&config, "/"),
            Err(LoadError::Scan(ScanError::Configuration { .. }))
        ));
    }

    #[test]
    fn page_data_serializes_with_page_tag() {
        let site = site();
        let json = serde_json::to_value(load(&site.config(), "/about").unwrap()).unwrap();
        assert_eq!(json["page"], "about");
        assert_eq!(json["directories"][0]["slug"], "blog");
        assert_eq!(json["directories"][0]["itemCount"], 3);
    }

    // =========================================================================
    // Prerendering
    // =========================================================================

    #[test]
    fn prerender_routes_cover_sections_and_content() {
        let site = site();
        let routes = prerender_routes(&site.config()).unwrap();
        assert_eq!(
            routes,
            vec![
                "/",
                "/about",
                "/blog",
                "/blog/2024",
                "/blog/2024/recap",
                "/blog/hello",
                "/docs",
                "/docs/intro",
                "/faq",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn prerender_routes_ignore_links_back_to_ancestors() {
        let site = SiteBuilder::new().page("blog/post.md", "# Post").build();
        std::os::unix::fs::symlink("..", site.root().join("blog/up")).unwrap();

        let routes = prerender_routes(&site.config()).unwrap();
        assert_eq!(routes, vec!["/", "/about", "/blog", "/blog/post"]);
    }

    #[test]
    fn prerender_loads_every_route_in_order() {
        let site = site();
        let config = site.config();
        let pages = prerender(&config).unwrap();
        let routes: Vec<&str> = pages.iter().map(|(r, _)| r.as_str()).collect();
        assert_eq!(routes, prerender_routes(&config).unwrap());
        assert!(matches!(pages[0].1, PageData::Home { .. }));
    }
}
