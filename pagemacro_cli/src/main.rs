use std::fs;

use clap::Parser;
use miette::IntoDiagnostic;
use pagemacro_cli::Commands;
use pagemacro_cli::PagemacroCli;
use pagemacro_core::MacroConfig;
use pagemacro_core::TocMacro;
use pagemacro_core::expand_downloads;
use pagemacro_core::find_occurrences;
use tracing_subscriber::EnvFilter;

fn main() -> miette::Result<()> {
	let cli = PagemacroCli::parse();
	init_tracing(cli.verbose);

	match cli.command {
		Commands::Render {
			input,
			output,
			toc_out,
		} => {
			let config = MacroConfig::load(&cli.config)?;
			let html = fs::read_to_string(&input).into_diagnostic()?;

			let expanded = expand_downloads(&html, &config.customer, &config.language, &config);
			let mut toc_macro = TocMacro::new(
				&config.page,
				&config.customer,
				&config.language,
				&config.li_style,
			);
			let transformed = toc_macro.transform(&expanded);

			match output {
				Some(path) => fs::write(&path, &transformed).into_diagnostic()?,
				None => print!("{transformed}"),
			}
			if let Some(path) = toc_out {
				fs::write(&path, toc_macro.toc()?).into_diagnostic()?;
			}
		}
		Commands::Scan { input } => {
			let html = fs::read_to_string(&input).into_diagnostic()?;
			let occurrences = find_occurrences(&html);
			if occurrences.is_empty() {
				println!("no download placeholders found");
			}
			for occurrence in occurrences {
				let mode = if occurrence.is_single { "single" } else { "list" };
				let key = if occurrence.key.is_empty() {
					"(all)"
				} else {
					occurrence.key.as_str()
				};
				println!("{}  key={key}  mode={mode}", occurrence.raw_text);
			}
		}
	}

	Ok(())
}

fn init_tracing(verbose: bool) {
	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.init();
}
