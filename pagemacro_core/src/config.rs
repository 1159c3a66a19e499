use std::path::Path;

use serde::Deserialize;

use crate::Download;
use crate::DownloadProvider;
use crate::PagemacroError;
use crate::PagemacroResult;
use crate::TocPage;

/// Configuration loaded from a `pagemacro.toml` file.
///
/// ```toml
/// customer = "acme"
/// language = "de"
///
/// [page]
/// id = "handbook"
/// title = "Handbook"
/// heading_depth = 3
/// subpage_depth = 1
///
/// [[page.subpages]]
/// id = "install"
/// title = "Installation"
///
/// [[downloads]]
/// name = "manual"
/// keys = ["pdf"]
/// customers = ["acme"]
/// files = ["docs/manual.pdf"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct MacroConfig {
	pub customer: String,
	#[serde(default = "default_language")]
	pub language: String,
	/// Raw attribute suffix for every TOC `<li>`, e.g. ` style="…"`.
	#[serde(default)]
	pub li_style: String,
	pub page: PageConfig,
	#[serde(default)]
	pub downloads: Vec<Download>,
}

/// One page of the configured page tree. Implements [`TocPage`], so a
/// config file stands in for the host content tree.
#[derive(Debug, Clone, Deserialize)]
pub struct PageConfig {
	pub id: String,
	pub title: String,
	/// Customers this page is visible to. An empty list means everyone.
	#[serde(default)]
	pub customers: Vec<String>,
	#[serde(default)]
	pub heading_depth: u8,
	#[serde(default)]
	pub subpage_depth: u8,
	#[serde(default)]
	pub subpages: Vec<PageConfig>,
}

fn default_language() -> String {
	"en".to_string()
}

impl MacroConfig {
	/// Load the config from `path`.
	pub fn load(path: &Path) -> PagemacroResult<MacroConfig> {
		let content = std::fs::read_to_string(path)?;
		toml::from_str(&content).map_err(|e| PagemacroError::ConfigParse(e.to_string()))
	}
}

impl DownloadProvider for MacroConfig {
	fn downloads(&self, customer: &str) -> Vec<Download> {
		self.downloads
			.iter()
			.filter(|d| d.customers.is_empty() || d.customers.iter().any(|c| c == customer))
			.cloned()
			.collect()
	}
}

impl TocPage for PageConfig {
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
		self.customers.is_empty() || self.customers.iter().any(|c| c == customer)
	}
}
