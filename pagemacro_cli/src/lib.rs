use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Transform HTML pages: expand download placeholders and generate a table of contents.",
	long_about = "pagemacro rewrites HTML fragments for a page-rendering pipeline.\n\nIt expands \
	              `${download…}` placeholder tokens into markup listing downloadable files, and \
	              builds a hierarchical table of contents from a page's headings merged with its \
	              configured subpages.\n\nQuick start:\n  pagemacro render page.html   Transform a \
	              page using pagemacro.toml\n  pagemacro scan page.html     List the placeholder \
	              tokens in a file"
)]
pub struct PagemacroCli {
	#[command(subcommand)]
	pub command: Commands,

	/// Path to the pagemacro config file.
	#[arg(long, short, global = true, default_value = "pagemacro.toml")]
	pub config: PathBuf,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Expand download placeholders and generate the table of contents.
	///
	/// Reads the customer, language, page tree, and download catalog from the
	/// config file, applies both transformations to the input document, and
	/// writes the result to stdout or `--output`. The rendered TOC block is
	/// kept separate from the document; use `--toc-out` to write it.
	Render {
		/// HTML file to transform.
		input: PathBuf,

		/// Write the transformed document here instead of stdout.
		#[arg(long, short)]
		output: Option<PathBuf>,

		/// Write the rendered TOC block to this file.
		#[arg(long)]
		toc_out: Option<PathBuf>,
	},
	/// List the download placeholder tokens found in a file.
	///
	/// Shows each distinct occurrence with its filter key and rendering mode,
	/// the way the renderer will see them. Useful for checking why a
	/// placeholder does or does not expand.
	Scan {
		/// HTML file to scan.
		input: PathBuf,
	},
}
