//! `pagemacro_core` rewrites raw HTML fragments for a page-rendering
//! pipeline. Two independent pipelines share one shape: scan, filter or
//! build, render, substitute.
//!
//! ## Processing Pipelines
//!
//! ```text
//! HTML string
//!   → Token scanner (finds `${download…}` placeholder tokens, dedupes)
//!   → Download renderer (filters the catalog, renders links or lists)
//!   → Substitution (global text replace of each raw token)
//!
//! HTML document
//!   → Heading collector (selects h2–h6 up to the configured depth,
//!     assigns `#t1`, `#t2`, … anchor ids, mutates the document)
//!   → Hierarchy builder (merges heading entries with visible subpages)
//!   → TOC renderer (nested <ul>/<li> markup inside <div class="toc">)
//! ```
//!
//! ## Modules
//!
//! - [`config`] — Configuration loading from `pagemacro.toml`: customer,
//!   language, page tree, and the download catalog.
//! - [`document`] — Streaming heading collection and rewrite over an HTML
//!   fragment.
//! - [`downloads`] — Placeholder scanning and download area rendering.
//! - [`help_keys`] — Consistency checking of stored heading→help-key
//!   associations against the current headings of a page.
//! - [`toc`] — The table-of-contents macro and its page abstraction.
//!
//! ## Key Types
//!
//! - [`DownloadOccurrence`] — one matched placeholder token with its filter
//!   key and singular/plural rendering mode.
//! - [`TocMacro`] — transforms a page and exposes the rendered TOC.
//! - [`TocEntry`] — one node (heading- or subpage-derived) in the TOC tree.
//! - [`HelpKeysForHeading`] — a stored language/heading/help-keys
//!   association, owned by the host page.
//! - [`MacroConfig`] — configuration loaded from `pagemacro.toml`.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagemacro_core::Download;
//! use pagemacro_core::DownloadFile;
//! use pagemacro_core::expand_downloads;
//!
//! let catalog = vec![Download {
//! 	name: "manual".into(),
//! 	keys: vec!["pdf".into()],
//! 	customers: vec!["acme".into()],
//! 	files: vec![DownloadFile::new("docs/manual.pdf")],
//! }];
//! let provider = move |_customer: &str| catalog.clone();
//! let html = expand_downloads("<p>${download}</p>", "acme", "en", &provider);
//! assert!(html.contains("<a href=\"/download?file="));
//! ```

pub use config::*;
pub use document::*;
pub use downloads::*;
pub use error::*;
pub use help_keys::*;
pub use toc::*;

pub mod config;
mod document;
mod downloads;
mod error;
mod help_keys;
mod toc;

#[cfg(test)]
mod __fixtures;
