use std::{collections::HashSet, io::Write, path::PathBuf};

use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use govrag_service::{AskRequest, AskResponse, Error, GovragService, SearchRequest, SearchResponse};

const BANNER: &str = "Governance knowledge base chat";
const HELP: &str = "Type a question, 'retrieve' to toggle retrieve-only mode, or 'quit' to exit.";

#[derive(Debug, Parser)]
#[command(
	version = govrag_cli::VERSION,
	rename_all = "kebab",
	styles = govrag_cli::styles(),
)]
pub struct Args {
	/// Optional TOML config. Environment variables are layered on top.
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
	Generate,
	RetrieveOnly,
}
impl Mode {
	fn toggled(self) -> Self {
		match self {
			Self::Generate => Self::RetrieveOnly,
			Self::RetrieveOnly => Self::Generate,
		}
	}
}

enum Command<'a> {
	Skip,
	Quit,
	ToggleRetrieve,
	Query(&'a str),
}
impl<'a> Command<'a> {
	fn parse(line: &'a str) -> Self {
		let line = line.trim();

		if line.is_empty() {
			return Self::Skip;
		}
		if line.eq_ignore_ascii_case("quit") || line.eq_ignore_ascii_case("exit") {
			return Self::Quit;
		}
		if line.eq_ignore_ascii_case("retrieve") {
			return Self::ToggleRetrieve;
		}

		Self::Query(line)
	}
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = govrag_config::load_env(args.config.as_deref())?;

	govrag_cli::init_tracing(&cfg.service.log_level);

	let service = GovragService::new(cfg);
	let stdin = BufReader::new(tokio::io::stdin());
	let mut stdout = std::io::stdout();

	run_session(&service, stdin, &mut stdout, args.top_k).await
}

/// Reads queries line by line until EOF or a quit command.
///
/// Service failures are reported inline and never end the session.
pub async fn run_session<R, W>(
	service: &GovragService,
	reader: R,
	writer: &mut W,
	top_k: Option<u32>,
) -> color_eyre::Result<()>
where
	R: AsyncBufRead + Unpin,
	W: Write,
{
	let mut lines = reader.lines();
	let mut mode = Mode::Generate;
	let mut queries = 0_usize;

	writeln!(writer, "{BANNER}")?;
	writeln!(writer, "{HELP}")?;

	loop {
		write!(writer, "\nQuery: ")?;
		writer.flush()?;

		let Some(line) = lines.next_line().await? else {
			break;
		};

		match Command::parse(&line) {
			Command::Skip => continue,
			Command::Quit => {
				writeln!(writer, "Goodbye.")?;

				break;
			},
			Command::ToggleRetrieve => {
				mode = mode.toggled();

				let retrieve_only = mode == Mode::RetrieveOnly;
				let state = if retrieve_only { "on" } else { "off" };

				tracing::info!(retrieve_only, "Chat mode toggled.");

				writeln!(writer, "Retrieve-only mode: {state}")?;
			},
			Command::Query(query) => match mode {
				Mode::RetrieveOnly => {
					queries += 1;

					let req =
						SearchRequest { query: query.to_string(), top_k, ..Default::default() };

					match service.search(req).await {
						Ok(response) => {
							render_passages(writer, &response, service.cfg.search.preview_chars)?
						},
						Err(err) => report_error(writer, &err)?,
					}
				},
				Mode::Generate => {
					queries += 1;

					let req = AskRequest { query: query.to_string(), top_k, ..Default::default() };

					match service.ask(req).await {
						Ok(response) => render_answer(writer, &response)?,
						Err(err) => report_error(writer, &err)?,
					}
				},
			},
		}
	}

	tracing::info!(queries, "Chat session ended.");

	Ok(())
}

fn report_error<W: Write>(writer: &mut W, err: &Error) -> std::io::Result<()> {
	tracing::warn!(error = %err, "Query failed.");

	writeln!(writer, "Error: {err}")
}

fn render_passages<W: Write>(
	writer: &mut W,
	response: &SearchResponse,
	preview_chars: usize,
) -> std::io::Result<()> {
	if response.passages.is_empty() {
		return writeln!(writer, "No passages retrieved.");
	}

	for (rank, passage) in response.passages.iter().enumerate() {
		let preview: String = passage.content.chars().take(preview_chars).collect();

		writeln!(writer, "\n--- Chunk {} (score: {:.4}) ---", rank + 1, passage.score)?;
		writeln!(writer, "Source: {}", passage.source)?;
		writeln!(writer, "{preview}")?;
	}

	Ok(())
}

fn render_answer<W: Write>(writer: &mut W, response: &AskResponse) -> std::io::Result<()> {
	let result = &response.result;

	writeln!(writer, "\nAnswer:\n{}", result.answer)?;

	if response.large_document {
		writeln!(writer, "\n(Answered from a digest of the top document.)")?;
	}
	if result.chunks_used == 0 {
		return Ok(());
	}

	let mut seen = HashSet::new();

	writeln!(writer, "\nSources ({} chunks used):", result.chunks_used)?;

	for source in result.sources_used.iter().filter(|source| seen.insert(source.as_str())) {
		writeln!(writer, "  - {source}")?;
	}

	Ok(())
}
