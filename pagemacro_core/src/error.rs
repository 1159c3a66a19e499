use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum PagemacroError {
	#[error(transparent)]
	#[diagnostic(code(pagemacro::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(pagemacro::config_parse),
		help("check that pagemacro.toml is valid TOML with a [page] table")
	)]
	ConfigParse(String),

	#[error("table of contents accessed before transform")]
	#[diagnostic(
		code(pagemacro::toc_not_transformed),
		help("call `TocMacro::transform` before `TocMacro::toc`")
	)]
	TocNotTransformed,
}

pub type PagemacroResult<T> = Result<T, PagemacroError>;
