use crate::Download;
use crate::DownloadFile;
use crate::DownloadOccurrence;
use crate::HelpKeyPage;
use crate::HelpKeysForHeading;
use crate::TocPage;

pub fn occurrence(raw_text: &str, key: &str, is_single: bool) -> DownloadOccurrence {
	DownloadOccurrence {
		raw_text: raw_text.to_string(),
		key: key.to_string(),
		is_single,
	}
}

pub fn download(name: &str, keys: &[&str], files: &[&str]) -> Download {
	Download {
		name: name.to_string(),
		keys: keys.iter().map(ToString::to_string).collect(),
		customers: vec!["acme".to_string()],
		files: files.iter().map(|file| DownloadFile::new(*file)).collect(),
	}
}

pub fn association(language: &str, heading: &str, help_keys: &[&str]) -> HelpKeysForHeading {
	HelpKeysForHeading {
		language: language.to_string(),
		heading: heading.to_string(),
		help_keys: help_keys.iter().map(ToString::to_string).collect(),
	}
}

/// An in-memory page tree standing in for the host content abstraction.
#[derive(Debug, Clone, Default)]
pub struct FixturePage {
	pub id: String,
	pub title: String,
	pub heading_depth: u8,
	pub subpage_depth: u8,
	/// Customers this page is hidden from.
	pub hidden_for: Vec<String>,
	pub content: String,
	pub subpages: Vec<FixturePage>,
	pub associations: Vec<HelpKeysForHeading>,
	/// Set when the whole association collection was dropped.
	pub cleared: bool,
}

impl FixturePage {
	pub fn new(id: &str, title: &str) -> Self {
		Self {
			id: id.to_string(),
			title: title.to_string(),
			..Self::default()
		}
	}

	pub fn with_depths(mut self, heading_depth: u8, subpage_depth: u8) -> Self {
		self.heading_depth = heading_depth;
		self.subpage_depth = subpage_depth;
		self
	}

	pub fn with_content(mut self, content: &str) -> Self {
		self.content = content.to_string();
		self
	}

	pub fn with_subpage(mut self, subpage: FixturePage) -> Self {
		self.subpages.push(subpage);
		self
	}

	pub fn with_association(mut self, association: HelpKeysForHeading) -> Self {
		self.associations.push(association);
		self
	}

	pub fn hidden_for(mut self, customer: &str) -> Self {
		self.hidden_for.push(customer.to_string());
		self
	}
}

impl TocPage for FixturePage {
	fn id(&self) -> String {
		self.id.clone()
	}

	fn title(&self, _lang: &str) -> String {
		self.title.clone()
	}

	fn toc_heading_depth(&self) -> u8 {
		self.heading_depth
	}

	fn toc_subpage_depth(&self) -> u8 {
		self.subpage_depth
	}

	fn subpages(&self, _lang: &str) -> Vec<Box<dyn TocPage + '_>> {
		self.subpages
			.iter()
			.map(|page| Box::new(page) as Box<dyn TocPage + '_>)
			.collect()
	}

	fn is_visible(&self, customer: &str, _lang: &str) -> bool {
		!self.hidden_for.iter().any(|c| c == customer)
	}
}

impl HelpKeyPage for FixturePage {
	fn content(&self, _lang: &str) -> String {
		self.content.clone()
	}

	fn toc_heading_depth(&self) -> u8 {
		self.heading_depth
	}

	fn heading_help_keys(&self, lang: &str, heading: &str) -> Vec<String> {
		self.associations
			.iter()
			.find(|assoc| assoc.language == lang && assoc.heading == heading)
			.map(|assoc| assoc.help_keys.clone())
			.unwrap_or_default()
	}

	fn help_key_associations(&self) -> &[HelpKeysForHeading] {
		&self.associations
	}

	fn help_key_associations_mut(&mut self) -> &mut Vec<HelpKeysForHeading> {
		&mut self.associations
	}

	fn clear_help_key_associations(&mut self) {
		self.associations.clear();
		self.cleared = true;
	}
}
