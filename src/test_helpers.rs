//! Shared test utilities for the statue test suite.
//!
//! Provides a throwaway content-tree builder and lookup helpers that work
//! with the records the aggregator and content loader return.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let site = SiteBuilder::new()
//!     .page("blog/hello.md", "# Hello")
//!     .dir("docs")
//!     .build();
//!
//! let dirs = get_content_directories(&site.config()).unwrap();
//! assert_eq!(slugs(&dirs), vec!["blog", "docs"]);
//! ```

use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::config::SiteConfig;
use crate::types::{ContentItem, DirectoryEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Builds a content tree inside a temp directory.
#[derive(Default)]
pub struct SiteBuilder {
    files: Vec<(String, String)>,
    dirs: Vec<String>,
}

impl SiteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file (parent directories are created).
    pub fn page(mut self, rel_path: &str, content: &str) -> Self {
        self.files.push((rel_path.to_string(), content.to_string()));
        self
    }

    /// Add an empty directory.
    pub fn dir(mut self, rel_path: &str) -> Self {
        self.dirs.push(rel_path.to_string());
        self
    }

    pub fn build(self) -> TestSite {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("content");
        std::fs::create_dir_all(&root).unwrap();
        for dir in &self.dirs {
            std::fs::create_dir_all(root.join(dir)).unwrap();
        }
        for (rel, content) in &self.files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(path, content).unwrap();
        }
        TestSite { _tmp: tmp, root }
    }
}

/// A built content tree. The directory is removed on drop.
pub struct TestSite {
    _tmp: TempDir,
    root: PathBuf,
}

impl TestSite {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Default config pointing at this tree.
    pub fn config(&self) -> SiteConfig {
        SiteConfig::for_root(&self.root)
    }
}

/// Copy `fixtures/content/` to a temp directory and return it.
pub fn setup_fixtures() -> TestSite {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("content");
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/content");
    copy_dir_recursive(&fixtures, &root).unwrap();
    TestSite { _tmp: tmp, root }
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dst)?;
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups: panic with a clear message on miss
// =========================================================================

/// Find a section entry by slug. Panics if not found.
pub fn find_entry<'a>(entries: &'a [DirectoryEntry], slug: &str) -> &'a DirectoryEntry {
    entries.iter().find(|e| e.slug == slug).unwrap_or_else(|| {
        panic!("directory '{slug}' not found. Available: {:?}", slugs(entries))
    })
}

/// Find a content item by url. Panics if not found.
pub fn find_item<'a>(items: &'a [ContentItem], url: &str) -> &'a ContentItem {
    items.iter().find(|i| i.url == url).unwrap_or_else(|| {
        panic!("content '{url}' not found. Available: {:?}", urls(items))
    })
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// All section slugs in order.
pub fn slugs(entries: &[DirectoryEntry]) -> Vec<&str> {
    entries.iter().map(|e| e.slug.as_str()).collect()
}

/// All content urls in order.
pub fn urls(items: &[ContentItem]) -> Vec<&str> {
    items.iter().map(|i| i.url.as_str()).collect()
}
