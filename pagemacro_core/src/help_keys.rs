use quick_xml::escape::escape;
use tracing::info;

use crate::document;
use crate::document::heading_retained;

/// A stored association of a language, a heading's literal text, and the
/// help keys attached to that heading. Owned and persisted by the host
/// page; this crate only reads and prunes the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpKeysForHeading {
	pub language: String,
	pub heading: String,
	pub help_keys: Vec<String>,
}

/// One orphaned association, prepared for display: the heading text and the
/// comma-joined help keys, both HTML-escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HelpKeyOrphan {
	pub heading: String,
	pub help_keys: String,
}

/// The help-key side of the host page abstraction.
pub trait HelpKeyPage {
	fn content(&self, lang: &str) -> String;
	fn toc_heading_depth(&self) -> u8;
	/// Help keys currently stored for a heading's exact text.
	fn heading_help_keys(&self, lang: &str, heading: &str) -> Vec<String>;
	fn help_key_associations(&self) -> &[HelpKeysForHeading];
	fn help_key_associations_mut(&mut self) -> &mut Vec<HelpKeysForHeading>;
	/// Drop the whole collection. Called by cleanup when the last
	/// association is removed, so the host can delete the stored object.
	fn clear_help_key_associations(&mut self);
}

/// Report every association in `lang` whose heading text no longer matches
/// any current depth-retained heading of the page. Advisory; nothing is
/// mutated.
#[must_use]
pub fn help_key_errors(page: &dyn HelpKeyPage, lang: &str) -> Vec<HelpKeyOrphan> {
	let headings = current_headings(page, lang);

	page.help_key_associations()
		.iter()
		.filter(|assoc| assoc.language == lang && !headings.contains(&assoc.heading))
		.map(|assoc| HelpKeyOrphan {
			heading: escape(&assoc.heading).into_owned(),
			help_keys: escape(&assoc.help_keys.join(", ")).into_owned(),
		})
		.collect()
}

/// Remove every orphaned association in `lang`, leaving other languages
/// untouched. Clears the whole collection when the last association goes.
/// Returns whether anything was removed — the signal to persist the page.
/// The caller must serialize this with any other writers of the page.
pub fn cleanup_help_keys(page: &mut dyn HelpKeyPage, lang: &str) -> bool {
	let headings = current_headings(page, lang);

	let associations = page.help_key_associations_mut();
	let before = associations.len();
	associations.retain(|assoc| {
		let orphaned = assoc.language == lang && !headings.contains(&assoc.heading);
		if orphaned {
			info!(
				language = %assoc.language,
				heading = %assoc.heading,
				help_keys = %assoc.help_keys.join(", "),
				"deleting help keys for a heading that no longer exists"
			);
		}
		!orphaned
	});

	let removed = associations.len() != before;
	let emptied = associations.is_empty();
	if removed && emptied {
		page.clear_help_key_associations();
	}
	removed
}

/// The page's current heading texts in `lang`, filtered to the configured
/// TOC heading depth. Depth 0 retains nothing, so every association counts
/// as orphaned.
fn current_headings(page: &dyn HelpKeyPage, lang: &str) -> Vec<String> {
	let depth = page.toc_heading_depth();
	document::collect_headings(&page.content(lang))
		.into_iter()
		.filter(|heading| heading_retained(heading.level, depth))
		.map(|heading| heading.text)
		.collect()
}
