use assert_cmd::Command;
use predicates::prelude::PredicateBooleanExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn pagemacro_cmd() -> Command {
	Command::cargo_bin("pagemacro").expect("pagemacro binary builds")
}

const CONFIG: &str = r#"
customer = "acme"
language = "en"

[page]
id = "handbook"
title = "Handbook"
heading_depth = 3
subpage_depth = 1

[[page.subpages]]
id = "install"
title = "Installation"

[[downloads]]
name = "manual"
customers = ["acme"]
files = ["docs/manual.pdf"]
"#;

#[test]
fn render_expands_downloads_and_assigns_heading_ids() -> TestResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("pagemacro.toml"), CONFIG)?;
	std::fs::write(
		tmp.path().join("page.html"),
		"<h2>Intro</h2><p>${download}</p>",
	)?;

	let _ = pagemacro_cmd()
		.arg("render")
		.arg(tmp.path().join("page.html"))
		.arg("--config")
		.arg(tmp.path().join("pagemacro.toml"))
		.assert()
		.success()
		.stdout(
			predicates::str::contains("<h2 id=\"t1\">Intro</h2>").and(predicates::str::contains(
				"<a href=\"/download?file=docs%2Fmanual.pdf\">manual.pdf</a>",
			)),
		);

	Ok(())
}

#[test]
fn render_writes_the_toc_block_separately() -> TestResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("pagemacro.toml"), CONFIG)?;
	std::fs::write(tmp.path().join("page.html"), "<h2>Intro</h2>")?;

	let _ = pagemacro_cmd()
		.arg("render")
		.arg(tmp.path().join("page.html"))
		.arg("--config")
		.arg(tmp.path().join("pagemacro.toml"))
		.arg("--toc-out")
		.arg(tmp.path().join("toc.html"))
		.assert()
		.success();

	let toc = std::fs::read_to_string(tmp.path().join("toc.html"))?;
	assert_eq!(
		toc,
		"<div class=\"toc\">\n<ul class=\"toc\">\
		 <li><a href=\"#t1\">Intro</a></li>\
		 <li class=\"subpage\"><a href=\"install\">Installation</a></li>\
		 </ul>\n</div>"
	);

	Ok(())
}

#[test]
fn scan_lists_distinct_occurrences() -> TestResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(
		tmp.path().join("page.html"),
		"<p>${download=pdf}</p><p>${downloads}</p><p>${download=pdf}</p>",
	)?;

	let _ = pagemacro_cmd()
		.arg("scan")
		.arg(tmp.path().join("page.html"))
		.assert()
		.success()
		.stdout(
			predicates::str::contains("${download=pdf}  key=pdf  mode=single")
				.and(predicates::str::contains("${downloads}  key=(all)  mode=list"))
				.and(predicates::str::contains("${download=pdf}").count(1)),
		);

	Ok(())
}

#[test]
fn render_fails_without_a_config_file() -> TestResult {
	let tmp = tempfile::tempdir()?;
	std::fs::write(tmp.path().join("page.html"), "<h2>Intro</h2>")?;

	let _ = pagemacro_cmd()
		.arg("render")
		.arg(tmp.path().join("page.html"))
		.arg("--config")
		.arg(tmp.path().join("missing.toml"))
		.assert()
		.failure();

	Ok(())
}
