use quick_xml::escape::escape;
use tracing::debug;

use crate::PagemacroError;
use crate::PagemacroResult;
use crate::document;
use crate::document::Heading;
use crate::help_keys::HelpKeyPage;

/// One node in the rendered table-of-contents tree. Built fresh per
/// transform; every entry is owned by exactly one parent or by the root
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
	/// Anchor fragment (`#t3`) for heading entries, or the page id for
	/// subpage entries.
	pub id: String,
	pub title: String,
	/// Children in document/page order.
	pub children: Vec<TocEntry>,
}

/// The host page abstraction driving TOC generation. Implemented by the
/// caller's content tree; this crate never loads or stores pages.
pub trait TocPage {
	fn id(&self) -> String;
	fn title(&self, lang: &str) -> String;
	/// Maximum heading nesting depth included in the TOC; 0 disables the
	/// heading pass entirely.
	fn toc_heading_depth(&self) -> u8;
	/// Maximum subpage nesting depth included in the TOC; 0 appends no
	/// subpage entries.
	fn toc_subpage_depth(&self) -> u8;
	fn subpages(&self, lang: &str) -> Vec<Box<dyn TocPage + '_>>;
	fn is_visible(&self, customer: &str, lang: &str) -> bool;
}

impl<T: TocPage + ?Sized> TocPage for &T {
	fn id(&self) -> String {
		(**self).id()
	}

	fn title(&self, lang: &str) -> String {
		(**self).title(lang)
	}

	fn toc_heading_depth(&self) -> u8 {
		(**self).toc_heading_depth()
	}

	fn toc_subpage_depth(&self) -> u8 {
		(**self).toc_subpage_depth()
	}

	fn subpages(&self, lang: &str) -> Vec<Box<dyn TocPage + '_>> {
		(**self).subpages(lang)
	}

	fn is_visible(&self, customer: &str, lang: &str) -> bool {
		(**self).is_visible(customer, lang)
	}
}

/// Table-of-contents macro: collects headings and subpages of one page and
/// renders the merged hierarchy.
///
/// [`TocMacro::transform`] must run before [`TocMacro::toc`]; accessing the
/// TOC first is a contract violation, not a data condition.
pub struct TocMacro<'a> {
	page: &'a dyn TocPage,
	customer: &'a str,
	lang: &'a str,
	/// Raw attribute suffix inserted verbatim into every `<li>`.
	li_style: &'a str,
	help_page: Option<&'a dyn HelpKeyPage>,
	help_keys_label: String,
	toc: Option<String>,
}

impl<'a> TocMacro<'a> {
	pub fn new(page: &'a dyn TocPage, customer: &'a str, lang: &'a str, li_style: &'a str) -> Self {
		Self {
			page,
			customer,
			lang,
			li_style,
			help_page: None,
			help_keys_label: "Hilfe-Keys".to_string(),
			toc: None,
		}
	}

	/// Attach the help-key side of the page. When set, every retained
	/// heading gets an edit anchor appended during [`TocMacro::transform`].
	pub fn set_help_page(&mut self, help_page: &'a dyn HelpKeyPage) {
		self.help_page = Some(help_page);
	}

	/// Override the label of the help-key edit anchors.
	pub fn set_help_keys_label(&mut self, label: impl Into<String>) {
		self.help_keys_label = label.into();
	}

	/// Transform a page's HTML.
	///
	/// This operation both mutates the markup and produces derived data:
	/// retained headings get `id="tN"` anchors (and, with a help page set,
	/// an edit affordance) written into the returned string, while the
	/// rendered TOC is stored for [`TocMacro::toc`]. When both depths are 0
	/// the input is returned unchanged and the stored TOC is empty.
	pub fn transform(&mut self, html: &str) -> String {
		self.toc = Some(String::new());
		let heading_depth = self.page.toc_heading_depth();
		let subpage_depth = self.page.toc_subpage_depth();
		if heading_depth == 0 && subpage_depth == 0 {
			return html.to_string();
		}

		let (rewritten, headings) = if heading_depth > 0 {
			document::rewrite_headings(html, heading_depth, |heading, ordinal| {
				self.help_page.map(|help_page| {
					let keys = help_page.heading_help_keys(self.lang, &heading.text);
					self.help_key_anchor(&keys, ordinal)
				})
			})
		} else {
			(html.to_string(), Vec::new())
		};

		let mut entries = heading_entries(&headings);
		let heading_count = entries.len();
		entries.extend(subpage_entries(
			self.page.subpages(self.lang),
			self.customer,
			self.lang,
			1,
			subpage_depth,
		));
		debug!(
			headings = heading_count,
			subpages = entries.len() - heading_count,
			"built toc entries"
		);

		if !entries.is_empty() {
			self.toc = Some(format!(
				"<div class=\"toc\">{}</div>",
				make_toc_html(&entries, heading_count, self.li_style)
			));
		}

		rewritten
	}

	/// The TOC rendered by the last [`TocMacro::transform`] call. Empty when
	/// the page produced no entries.
	pub fn toc(&self) -> PagemacroResult<&str> {
		self.toc
			.as_deref()
			.ok_or(PagemacroError::TocNotTransformed)
	}

	/// Edit affordance for the help keys of one heading: an invisible link
	/// (`edithk0`) when no keys exist yet, a visible one (`edithk1`) listing
	/// the current keys otherwise.
	fn help_key_anchor(&self, keys: &[String], ordinal: usize) -> String {
		let (css, ext) = if keys.is_empty() {
			("edithk0", String::new())
		} else {
			("edithk1", format!(": {}", keys.join(", ")))
		};
		let link = format!("{}/help-keys/{}/{}", self.page.id(), self.lang, ordinal);
		format!(
			"<a href=\"{link}\" class=\"{css}\">{}</a>",
			escape(&format!("{}{ext}", self.help_keys_label))
		)
	}
}

/// Build the nested heading hierarchy from the flat heading sequence.
///
/// A level-L heading attaches as the last child of the most recent entry
/// that was itself attached at level L−1; level 2 always becomes a root
/// entry. A heading with no eligible shallower ancestor becomes a root
/// entry without updating any level tracker, so a later deeper heading
/// cannot nest under it.
fn heading_entries(headings: &[Heading]) -> Vec<TocEntry> {
	let mut nodes: Vec<Option<TocEntry>> = Vec::with_capacity(headings.len());
	let mut children: Vec<Vec<usize>> = Vec::with_capacity(headings.len());
	let mut roots: Vec<usize> = Vec::new();
	// Most recent attached entry per level, indexed by level (2..=5 used).
	let mut last: [Option<usize>; 7] = [None; 7];

	for (index, heading) in headings.iter().enumerate() {
		nodes.push(Some(TocEntry {
			id: format!("#t{}", index + 1),
			title: heading.text.clone(),
			children: Vec::new(),
		}));
		children.push(Vec::new());

		let level = heading.level as usize;
		if level == 2 {
			roots.push(index);
			last[2] = Some(index);
		} else if let Some(parent) = last[level - 1] {
			children[parent].push(index);
			if level < 6 {
				last[level] = Some(index);
			}
		} else {
			roots.push(index);
		}
	}

	// Children always carry a larger index than their parent, so a reverse
	// pass materializes the tree bottom-up.
	for index in (0..nodes.len()).rev() {
		let kids: Vec<TocEntry> = children[index]
			.iter()
			.filter_map(|&child| nodes[child].take())
			.collect();
		if let Some(node) = nodes[index].as_mut() {
			node.children = kids;
		}
	}

	roots
		.into_iter()
		.filter_map(|root| nodes[root].take())
		.collect()
}

/// Expand visible subpages into TOC entries, one level deeper per
/// recursion, until the configured depth is exhausted.
fn subpage_entries(
	pages: Vec<Box<dyn TocPage + '_>>,
	customer: &str,
	lang: &str,
	level: u8,
	max_level: u8,
) -> Vec<TocEntry> {
	if level > max_level {
		return Vec::new();
	}

	let mut entries = Vec::new();
	for page in &pages {
		if page.is_visible(customer, lang) {
			let children = subpage_entries(page.subpages(lang), customer, lang, level + 1, max_level);
			entries.push(TocEntry {
				id: page.id(),
				title: page.title(lang),
				children,
			});
		}
	}
	entries
}

/// Serialize the merged root entry list. `<ul class="toc">` appears only at
/// the outermost level; nested lists are plain `<ul>`. Root entries at or
/// beyond `heading_count` are subpage entries — the flag propagates to
/// their whole subtrees.
fn make_toc_html(entries: &[TocEntry], heading_count: usize, li_style: &str) -> String {
	if entries.is_empty() {
		return String::new();
	}

	let mut out = String::from("\n<ul class=\"toc\">");
	for (index, entry) in entries.iter().enumerate() {
		render_entry(&mut out, entry, index >= heading_count, li_style);
	}
	out.push_str("</ul>\n");
	out
}

fn render_entry(out: &mut String, entry: &TocEntry, subpage: bool, li_style: &str) {
	let class = if subpage { " class=\"subpage\"" } else { "" };
	out.push_str(&format!(
		"<li{class}{li_style}><a href=\"{}\">{}</a>",
		escape(&entry.id),
		escape(&entry.title)
	));
	if !entry.children.is_empty() {
		out.push_str("<ul>");
		for child in &entry.children {
			render_entry(out, child, subpage, li_style);
		}
		out.push_str("</ul>");
	}
	out.push_str("</li>");
}
