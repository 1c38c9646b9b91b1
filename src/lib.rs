//! # Statue
//!
//! The content layer of a markdown static site. Your filesystem is the data
//! source: directories under the content root become navigable sections,
//! markdown files become pages, and every page of the site gets the same
//! navigation list.
//!
//! # Data Flow
//!
//! ```text
//! content/  →  scan     →  Vec<DirectoryEntry>   (navigation)
//!           →  content  →  Vec<ContentItem>      (pages)
//!           →  loader   →  PageData per route    (what the renderer gets)
//! ```
//!
//! Nothing is cached between calls. Each call reads the filesystem and
//! returns fresh values, so calls are safe to run in parallel while a site
//! is prerendered.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Turns the content root's directories into sorted [`types::DirectoryEntry`] records |
//! | [`content`] | Reads markdown files into [`types::ContentItem`] records |
//! | [`loader`] | Route parsing and per-page data, plus the prerender route list |
//! | [`preferences`] | Reader font scale over a pluggable key-value store |
//! | [`config`] | `statue.toml` loading, merging over stock defaults, validation |
//! | [`types`] | Records handed to the rendering layer |
//! | [`naming`] | Slugs, display titles, hidden-name rules |
//! | [`frontmatter`] | YAML front matter splitting and parsing |
//! | [`metadata`] | Title and description resolution, markdown rendering |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Lexicographic Ordering
//!
//! Sections are sorted by slug, byte-wise. `read_dir` order differs between
//! filesystems; sorting makes navigation identical on every machine.
//!
//! ## Skip, Don't Fail
//!
//! A missing content root is an error the caller must see. Anything below it
//! that cannot be read (an unreadable folder, a non-UTF-8 name, a markdown
//! file with broken front matter) is logged with `tracing` and skipped, so one
//! bad file never takes the whole navigation down.

pub mod config;
pub mod content;
pub mod frontmatter;
pub mod loader;
pub mod metadata;
pub mod naming;
pub mod output;
pub mod preferences;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
