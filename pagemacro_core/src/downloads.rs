use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;
use percent_encoding::utf8_percent_encode;
use serde::Deserialize;
use tracing::debug;

/// Literal opening marker of a download placeholder token. The plural form
/// is the marker immediately followed by `s`.
const MARKER: &str = "${download";

/// Label used for the zip bundle when a multi-file token carries no key
/// (German).
pub const ALL_FILES_DE: &str = "alle-Dateien";
/// Label used for the zip bundle when a multi-file token carries no key
/// (English).
pub const ALL_FILES_EN: &str = "all-files";

/// Characters escaped in `file=` and `zip=` query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// One matched placeholder token instance in HTML text.
///
/// Equality is structural: two tokens with the same raw text, key, and
/// cardinality are the same occurrence no matter where in the document they
/// were found. Substitution replaces every literal occurrence of
/// `raw_text` in one pass, so structural duplicates must be dropped at scan
/// time or the replacement would run twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOccurrence {
	/// The exact matched substring, including the marker and the closing
	/// brace. Doubles as the substitution anchor.
	pub raw_text: String,
	/// Filter key extracted after `=`; empty means "all downloads".
	pub key: String,
	/// True renders one inline link, false renders an itemized list.
	pub is_single: bool,
}

/// A concrete file belonging to a download. The path is the
/// workspace-relative path used in generated links; resolution of declared
/// paths to real files happens before the catalog reaches this crate.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct DownloadFile {
	path: String,
}

impl DownloadFile {
	pub fn new(path: impl Into<String>) -> Self {
		Self { path: path.into() }
	}

	/// The full relative path, used for the `file=` query value.
	#[must_use]
	pub fn path(&self) -> &str {
		&self.path
	}

	/// The last path segment, used as the link label.
	#[must_use]
	pub fn name(&self) -> &str {
		self.path.rsplit('/').next().unwrap_or(&self.path)
	}
}

/// One entry of the download catalog, consumed read-only.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Download {
	pub name: String,
	/// Membership keys a token can filter on via `${download=<key>}`.
	#[serde(default)]
	pub keys: Vec<String>,
	/// Customers this download is available to. An empty list means every
	/// customer.
	#[serde(default)]
	pub customers: Vec<String>,
	/// Resolved files, in declared order.
	#[serde(default)]
	pub files: Vec<DownloadFile>,
}

/// Supplies the download catalog for a customer. Owned by the host;
/// retrieval and persistence are not this crate's concern.
pub trait DownloadProvider {
	fn downloads(&self, customer: &str) -> Vec<Download>;
}

impl<F> DownloadProvider for F
where
	F: Fn(&str) -> Vec<Download>,
{
	fn downloads(&self, customer: &str) -> Vec<Download> {
		self(customer)
	}
}

/// Scan an HTML string for download placeholder tokens.
///
/// Finds each literal `${download`, then the next `}` after it; the
/// inclusive substring is the raw token. A marker without a closing brace
/// ends the scan silently. The search for the next marker resumes right
/// after the current marker's prefix, not after its closing brace, so
/// adjacent tokens are all found. Structural duplicates are dropped.
#[must_use]
pub fn find_occurrences(html: &str) -> Vec<DownloadOccurrence> {
	let mut occurrences: Vec<DownloadOccurrence> = Vec::new();
	let mut from = 0;

	while let Some(offset) = html[from..].find(MARKER) {
		let start = from + offset;
		if let Some(close) = html[start..].find('}') {
			let raw = &html[start..=start + close];
			let occurrence = parse_occurrence(raw);
			if !occurrences.contains(&occurrence) {
				occurrences.push(occurrence);
			}
		}
		from = start + MARKER.len();
	}

	occurrences
}

fn parse_occurrence(raw: &str) -> DownloadOccurrence {
	let is_single = !raw[MARKER.len()..].starts_with('s');
	let key = raw
		.find('=')
		.map(|eq| raw[eq + 1..raw.len() - 1].trim().to_string())
		.unwrap_or_default();

	DownloadOccurrence {
		raw_text: raw.to_string(),
		key,
		is_single,
	}
}

/// Replace every download placeholder token in `html` with rendered
/// download markup.
///
/// The catalog is fetched once per call. For each occurrence the catalog is
/// filtered by the occurrence key; an empty filter result falls back to the
/// whole catalog rather than rendering nothing. Malformed or unmatched
/// tokens never raise an error.
#[must_use]
pub fn expand_downloads(
	html: &str,
	customer: &str,
	lang: &str,
	provider: &dyn DownloadProvider,
) -> String {
	if !html.contains(MARKER) {
		return html.to_string();
	}

	let catalog = provider.downloads(customer);
	let occurrences = find_occurrences(html);
	debug!(
		customer,
		occurrences = occurrences.len(),
		downloads = catalog.len(),
		"expanding download placeholders"
	);

	let mut result = html.to_string();
	for occurrence in occurrences {
		let filtered: Vec<&Download> = if occurrence.key.is_empty() {
			catalog.iter().collect()
		} else {
			let keyed: Vec<&Download> = catalog
				.iter()
				.filter(|d| d.keys.iter().any(|k| k == &occurrence.key))
				.collect();
			if keyed.is_empty() {
				debug!(key = %occurrence.key, "no downloads match key, falling back to full catalog");
				catalog.iter().collect()
			} else {
				keyed
			}
		};

		let fragment = render_occurrence(&occurrence, &filtered, lang);
		result = result.replace(&occurrence.raw_text, &fragment);
	}

	result
}

/// Render the HTML fragment for one occurrence against the filtered
/// catalog. Files keep catalog order, then declared file order; ordering is
/// an extension point and nothing is re-sorted here.
fn render_occurrence(occurrence: &DownloadOccurrence, downloads: &[&Download], lang: &str) -> String {
	let files: Vec<&DownloadFile> = downloads.iter().flat_map(|d| d.files.iter()).collect();

	if files.is_empty() {
		return no_downloads(lang).to_string();
	}

	if occurrence.is_single {
		if let [file] = files.as_slice() {
			return format!(
				"<a href=\"/download?file={}\">{}</a>",
				encode(file.path()),
				file.name()
			);
		}

		let key = if occurrence.key.is_empty() {
			all_files_label(lang)
		} else {
			occurrence.key.as_str()
		};
		return format!(
			"<a href=\"/download?zip={}.zip\">{key}.zip ({})</a>",
			encode(key),
			files.len()
		);
	}

	let mut items = String::new();
	for file in &files {
		items.push_str(&format!(
			"<li><a href=\"/download?file={}\">{}</a></li>\n",
			encode(file.path()),
			file.name()
		));
	}
	format!("<ul>{items}</ul>")
}

fn encode(value: &str) -> String {
	utf8_percent_encode(value, QUERY_VALUE).to_string()
}

fn all_files_label(lang: &str) -> &'static str {
	if lang == "de" { ALL_FILES_DE } else { ALL_FILES_EN }
}

fn no_downloads(lang: &str) -> &'static str {
	if lang == "de" {
		"[keine Downloads]"
	} else {
		"[no downloads]"
	}
}
