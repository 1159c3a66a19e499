use quick_xml::Reader;
use quick_xml::escape::escape;
use quick_xml::escape::resolve_html5_entity;
use quick_xml::escape::unescape_with;
use quick_xml::events::BytesCData;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use tracing::debug;

/// One `h2`–`h6` element found in a document, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
	/// Heading level, 2 through 6.
	pub level: u8,
	/// Unescaped, whitespace-normalized text content of the element,
	/// including text inside nested inline markup.
	pub text: String,
}

/// Returns whether a heading of `level` is retained at the configured
/// depth. Depth 1 keeps only `h2`, depth 2 keeps `h2`–`h3`, and so on;
/// depth 0 retains nothing.
#[must_use]
pub fn heading_retained(level: u8, depth: u8) -> bool {
	depth >= level - 1
}

/// Collect every `h2`–`h6` heading of an HTML fragment.
///
/// A heading start tag closes any heading still open, the way HTML parsers
/// auto-close heading elements; a heading still open when the input ends is
/// recorded as if closed. Markup the reader cannot parse ends the collection
/// silently; headings found up to that point are returned.
#[must_use]
pub fn collect_headings(html: &str) -> Vec<Heading> {
	let mut reader = reader_for(html);
	let mut headings = Vec::new();
	let mut open: Option<(u8, String)> = None;

	loop {
		match reader.read_event() {
			Ok(Event::Start(e)) => {
				if let Some(level) = heading_level(e.name().as_ref()) {
					if let Some((open_level, text)) = open.take() {
						headings.push(Heading {
							level: open_level,
							text: normalize_text(&text),
						});
					}
					open = Some((level, String::new()));
				}
			}
			Ok(Event::Empty(e)) => {
				if open.is_none() {
					if let Some(level) = heading_level(e.name().as_ref()) {
						headings.push(Heading {
							level,
							text: String::new(),
						});
					}
				}
			}
			Ok(Event::Text(e)) => {
				if let Some((_, text)) = open.as_mut() {
					text.push_str(&decode_text(&e));
				}
			}
			Ok(Event::CData(e)) => {
				if let Some((_, text)) = open.as_mut() {
					text.push_str(&decode_cdata(&reader, &e));
				}
			}
			Ok(Event::End(e)) => {
				let level = heading_level(e.name().as_ref());
				if let Some((open_level, text)) = open.take_if(|(l, _)| level == Some(*l)) {
					headings.push(Heading {
						level: open_level,
						text: normalize_text(&text),
					});
				}
			}
			Ok(Event::Eof) => break,
			Ok(_) => {}
			Err(err) => {
				debug!(%err, "stopping heading collection on unparsable markup");
				break;
			}
		}
	}

	if let Some((level, text)) = open.take() {
		headings.push(Heading {
			level,
			text: normalize_text(&text),
		});
	}
	headings
}

/// Rewrite the headings of an HTML fragment in place.
///
/// This operation both mutates the markup and returns derived data: every
/// heading retained at `depth` gets `id="tN"` written into its start tag
/// (N is a 1-based running ordinal over retained headings), and the markup
/// produced by `decorate` — if any — is inserted right before the closing
/// tag. Headings beyond the depth pass through untouched. Returns the
/// rewritten string together with the retained headings in document order.
///
/// A heading start tag closes any heading still open, the way HTML parsers
/// auto-close heading elements; the closed heading's decoration lands right
/// before the new tag. A heading still open when the input ends is recorded
/// like a closed one, with its decoration at the end of the output.
///
/// A parse error ends the rewrite: the remaining input is copied verbatim.
pub fn rewrite_headings<F>(html: &str, depth: u8, mut decorate: F) -> (String, Vec<Heading>)
where
	F: FnMut(&Heading, usize) -> Option<String>,
{
	let mut reader = reader_for(html);
	let mut out = String::with_capacity(html.len() + 64);
	let mut headings: Vec<Heading> = Vec::new();
	let mut copied = 0usize;
	let mut open: Option<(u8, String)> = None;

	loop {
		let event_start = reader.buffer_position() as usize;
		match reader.read_event() {
			Ok(Event::Start(e)) => {
				if let Some(level) = heading_level(e.name().as_ref()) {
					if let Some((open_level, text)) = open.take() {
						let ordinal = headings.len() + 1;
						let heading = Heading {
							level: open_level,
							text: normalize_text(&text),
						};
						out.push_str(&html[copied..event_start]);
						copied = event_start;
						if let Some(markup) = decorate(&heading, ordinal) {
							out.push_str(&markup);
						}
						headings.push(heading);
					}
					if heading_retained(level, depth) {
						let event_end = reader.buffer_position() as usize;
						out.push_str(&html[copied..event_start]);
						out.push_str(&start_tag_with_id(&e, headings.len() + 1));
						copied = event_end;
						open = Some((level, String::new()));
					}
				}
			}
			Ok(Event::Empty(e)) => {
				if open.is_none() {
					if let Some(level) = heading_level(e.name().as_ref()) {
						if heading_retained(level, depth) {
							let event_end = reader.buffer_position() as usize;
							let ordinal = headings.len() + 1;
							let heading = Heading {
								level,
								text: String::new(),
							};
							out.push_str(&html[copied..event_start]);
							out.push_str(&start_tag_with_id(&e, ordinal));
							if let Some(markup) = decorate(&heading, ordinal) {
								out.push_str(&markup);
							}
							out.push_str(&format!(
								"</{}>",
								String::from_utf8_lossy(e.name().as_ref())
							));
							copied = event_end;
							headings.push(heading);
						}
					}
				}
			}
			Ok(Event::Text(e)) => {
				if let Some((_, text)) = open.as_mut() {
					text.push_str(&decode_text(&e));
				}
			}
			Ok(Event::CData(e)) => {
				if let Some((_, text)) = open.as_mut() {
					text.push_str(&decode_cdata(&reader, &e));
				}
			}
			Ok(Event::End(e)) => {
				let level = heading_level(e.name().as_ref());
				if let Some((open_level, text)) = open.take_if(|(l, _)| level == Some(*l)) {
					let event_end = reader.buffer_position() as usize;
					let ordinal = headings.len() + 1;
					let heading = Heading {
						level: open_level,
						text: normalize_text(&text),
					};
					// Inner content stays verbatim; the decoration lands
					// between it and the closing tag.
					out.push_str(&html[copied..event_start]);
					if let Some(markup) = decorate(&heading, ordinal) {
						out.push_str(&markup);
					}
					out.push_str(&html[event_start..event_end]);
					copied = event_end;
					headings.push(heading);
				}
			}
			Ok(Event::Eof) => break,
			Ok(_) => {}
			Err(err) => {
				debug!(%err, "stopping heading rewrite on unparsable markup");
				break;
			}
		}
	}

	out.push_str(&html[copied..]);
	if let Some((level, text)) = open.take() {
		let ordinal = headings.len() + 1;
		let heading = Heading {
			level,
			text: normalize_text(&text),
		};
		if let Some(markup) = decorate(&heading, ordinal) {
			out.push_str(&markup);
		}
		headings.push(heading);
	}
	(out, headings)
}

fn reader_for(html: &str) -> Reader<&[u8]> {
	let mut reader = Reader::from_str(html);
	let config = reader.config_mut();
	config.trim_text(false);
	config.check_end_names = false;
	config.allow_unmatched_ends = true;
	reader
}

fn heading_level(name: &[u8]) -> Option<u8> {
	match name {
		[h, level] if h.eq_ignore_ascii_case(&b'h') && (b'2'..=b'6').contains(level) => {
			Some(level - b'0')
		}
		_ => None,
	}
}

/// Rebuild a heading start tag, replacing any existing `id` attribute with
/// the assigned anchor id. Attribute values are decoded and re-escaped, so
/// single-quoted source values re-serialize safely inside double quotes.
fn start_tag_with_id(start: &BytesStart<'_>, ordinal: usize) -> String {
	let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
	let mut tag = format!("<{name}");
	for attr in start.attributes().flatten() {
		if attr.key.as_ref() == b"id" {
			continue;
		}
		let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
		let value = decode_entities(&String::from_utf8_lossy(&attr.value));
		tag.push_str(&format!(" {key}=\"{}\"", escape(&value)));
	}
	tag.push_str(&format!(" id=\"t{ordinal}\">"));
	tag
}

fn decode_text(text: &BytesText<'_>) -> String {
	std::str::from_utf8(text)
		.map(decode_entities)
		.unwrap_or_default()
}

/// Resolve character references, accepting HTML named entities (`&nbsp;`
/// and friends) on top of the XML predefined set. Unknown entities stay
/// literal rather than dropping the text.
fn decode_entities(raw: &str) -> String {
	match unescape_with(raw, resolve_html5_entity) {
		Ok(unescaped) => unescaped.into_owned(),
		Err(_) => raw.to_string(),
	}
}

fn decode_cdata(reader: &Reader<&[u8]>, cdata: &BytesCData<'_>) -> String {
	reader
		.decoder()
		.decode(cdata)
		.map(|text| text.into_owned())
		.unwrap_or_default()
}

/// Collapse whitespace runs and trim, mirroring how rendered heading text
/// reads in the browser.
fn normalize_text(text: &str) -> String {
	text.split_whitespace().collect::<Vec<_>>().join(" ")
}
