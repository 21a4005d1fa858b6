use std::{
	fs,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use uuid::Uuid;

use govrag_domain::redaction;
use govrag_service::{AskRequest, AskResponse, GovragService};

const BUILTIN_DATASET: &str = "builtin";

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
	/// JSON dataset replacing the built-in cases.
	#[arg(long, short = 'd', value_name = "FILE")]
	pub dataset: Option<PathBuf>,
	#[arg(long, value_name = "N")]
	pub top_k: Option<u32>,
	#[arg(long, short = 'o', value_name = "FILE")]
	pub output: Option<PathBuf>,
	/// Retrieve without narrowing to the extracted identifier.
	#[arg(long)]
	pub no_identifier_filter: bool,
}

/// Hand-authored ground truth for one query.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EvalCase {
	pub query: String,
	/// Substrings that should appear among retrieved sources.
	#[serde(default)]
	pub expected_sources: Vec<String>,
	#[serde(default, alias = "must_contain")]
	pub must_contain_keywords: Vec<String>,
	#[serde(default, alias = "must_not_contain_sources")]
	pub must_not_contain_identifiers: Vec<String>,
}
impl EvalCase {
	fn new(query: &str, expected: &[&str], must: &[&str], must_not: &[&str]) -> Self {
		Self {
			query: query.to_string(),
			expected_sources: to_strings(expected),
			must_contain_keywords: to_strings(must),
			must_not_contain_identifiers: to_strings(must_not),
		}
	}
}

#[derive(Debug, Deserialize)]
pub struct EvalDataset {
	pub name: Option<String>,
	pub cases: Vec<EvalCase>,
}

#[derive(Clone, Copy, Debug, Serialize)]
pub struct EvalSettings {
	pub top_k: u32,
	pub identifier_filter: bool,
}

#[derive(Debug, Serialize)]
pub struct EvalOutput {
	pub run_id: Uuid,
	pub created_at: String,
	pub dataset: EvalDatasetInfo,
	pub settings: EvalSettings,
	pub summary: EvalSummary,
	pub cases: Vec<CaseReport>,
}

#[derive(Debug, Serialize)]
pub struct EvalDatasetInfo {
	pub name: String,
	pub case_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EvalSummary {
	pub case_count: usize,
	pub avg_source_recall: f64,
	pub avg_content_relevance: f64,
	pub avg_retrieval_score: f64,
	pub avg_answer_faithfulness: f64,
	pub avg_purity_score: f64,
	pub contamination_rate: f64,
	pub answer_contamination_rate: f64,
	/// Share of cases whose generator output named a banned identifier before redaction.
	pub raw_answer_contamination_rate: f64,
}

#[derive(Debug, Serialize)]
pub struct CaseReport {
	pub query: String,
	pub source_recall: f64,
	pub content_relevance: f64,
	pub mean_retrieval_score: f64,
	pub answer_faithfulness: f64,
	pub cross_contamination: bool,
	pub purity_score: f64,
	pub contaminated_sources: Vec<String>,
	pub answer_contamination: Vec<String>,
	/// Banned identifiers in the generator output before redaction rewrote them.
	pub raw_answer_contamination: Vec<String>,
	pub sources_retrieved: Vec<String>,
	pub retrieval_scores: Vec<f32>,
	pub chunks_count: usize,
	pub rag_retrieval_scores: Vec<f32>,
	pub rag_mean_score: f32,
	pub rag_source_match: bool,
	pub large_document: bool,
	pub latency_ms: f64,
	pub answer: String,
	pub raw_answer: String,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = govrag_config::load_env(args.config.as_deref())?;

	govrag_cli::init_tracing(&cfg.service.log_level);

	let (name, cases) = match &args.dataset {
		Some(path) => {
			let dataset = load_dataset(path)?;

			(dataset.name.unwrap_or_else(|| path.display().to_string()), dataset.cases)
		},
		None => (BUILTIN_DATASET.to_string(), default_cases()),
	};
	let settings = EvalSettings {
		top_k: args.top_k.unwrap_or(cfg.eval.top_k),
		identifier_filter: !args.no_identifier_filter,
	};
	let output_path = args.output.clone().unwrap_or_else(|| PathBuf::from(&cfg.eval.output));
	let service = GovragService::new(cfg);
	let output = evaluate(&service, &name, &cases, settings).await?;
	let json = write_report(&output_path, &output)?;

	println!("{json}");

	tracing::info!(path = %output_path.display(), "Evaluation report saved.");

	Ok(())
}

/// The fixed five-case battery: three framework lookups that must stay isolated from sibling
/// frameworks, plus two unconstrained queries.
pub fn default_cases() -> Vec<EvalCase> {
	vec![
		EvalCase::new(
			"List controls attached to AI-ADF-013",
			&["AI-ADF-013"],
			&["AI-ADF-013"],
			&["AI-ADF-024", "AI-ADF-016", "AI-ADF-015", "AI-ADF-018", "AI-ADF-023"],
		),
		EvalCase::new(
			"List controls attached to AI-ADF-024",
			&["AI-ADF-024"],
			&["AI-ADF-024"],
			&["AI-ADF-013", "AI-ADF-016", "AI-ADF-015"],
		),
		EvalCase::new(
			"List controls attached to AI-ADF-016",
			&["AI-ADF-016"],
			&["AI-ADF-016"],
			&["AI-ADF-013", "AI-ADF-024", "AI-ADF-015"],
		),
		EvalCase::new("What frameworks are available?", &["framework"], &["Framework"], &[]),
		EvalCase::new("Show controls at AI Maturity Level 3", &["controls/"], &["Level 3"], &[]),
	]
}

pub fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.cases.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one case."));
	}

	Ok(dataset)
}

pub async fn evaluate(
	service: &GovragService,
	dataset_name: &str,
	cases: &[EvalCase],
	settings: EvalSettings,
) -> color_eyre::Result<EvalOutput> {
	let mut reports = Vec::with_capacity(cases.len());

	for case in cases {
		let report = evaluate_case(service, case, settings).await?;

		tracing::info!(
			query = %report.query,
			source_recall = report.source_recall,
			purity_score = report.purity_score,
			cross_contamination = report.cross_contamination,
			raw_answer_contamination = report.raw_answer_contamination.len(),
			"Evaluated case."
		);

		reports.push(report);
	}

	Ok(EvalOutput {
		run_id: Uuid::new_v4(),
		created_at: OffsetDateTime::now_utc().format(&Rfc3339)?,
		dataset: EvalDatasetInfo { name: dataset_name.to_string(), case_count: cases.len() },
		settings,
		summary: summarize(&reports),
		cases: reports,
	})
}

async fn evaluate_case(
	service: &GovragService,
	case: &EvalCase,
	settings: EvalSettings,
) -> color_eyre::Result<CaseReport> {
	let start = Instant::now();
	let response = service
		.ask(AskRequest {
			query: case.query.clone(),
			top_k: Some(settings.top_k),
			identifier_filter: Some(settings.identifier_filter),
		})
		.await?;
	let latency_ms = start.elapsed().as_secs_f64() * 1_000.0;
	let AskResponse { passages, result, large_document, .. } = response;
	let sources: Vec<String> = passages.iter().map(|passage| passage.source.clone()).collect();
	let scores: Vec<f32> = passages.iter().map(|passage| passage.score).collect();
	let all_content =
		passages.iter().map(|passage| passage.content.as_str()).collect::<Vec<_>>().join(" ");
	let contaminated = contaminated_sources(&sources, &case.must_not_contain_identifiers);

	Ok(CaseReport {
		query: case.query.clone(),
		source_recall: source_recall(&case.expected_sources, &sources),
		content_relevance: keyword_fraction(&case.must_contain_keywords, &all_content),
		mean_retrieval_score: mean(&scores),
		answer_faithfulness: keyword_fraction(&case.must_contain_keywords, &result.answer),
		cross_contamination: !contaminated.is_empty(),
		purity_score: purity_score(contaminated.len(), sources.len()),
		answer_contamination: answer_contamination(
			&result.answer,
			&case.must_not_contain_identifiers,
		),
		raw_answer_contamination: answer_contamination(
			&result.raw_answer,
			&case.must_not_contain_identifiers,
		),
		contaminated_sources: contaminated,
		chunks_count: sources.len(),
		sources_retrieved: sources,
		retrieval_scores: scores,
		rag_retrieval_scores: result.retrieval_scores,
		rag_mean_score: result.mean_score,
		rag_source_match: result.source_match,
		large_document,
		latency_ms,
		answer: result.answer,
		raw_answer: result.raw_answer,
	})
}

/// Writes the pretty-printed report and returns the JSON that was written.
pub fn write_report(path: &Path, output: &EvalOutput) -> color_eyre::Result<String> {
	let json = serde_json::to_string_pretty(output)?;

	if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
		fs::create_dir_all(parent)?;
	}

	fs::write(path, &json)?;

	Ok(json)
}

/// Fraction of expected substrings found among the sources. Zero when nothing is expected.
pub fn source_recall(expected: &[String], sources: &[String]) -> f64 {
	if expected.is_empty() {
		return 0.0;
	}

	let hits = expected
		.iter()
		.filter(|expected| sources.iter().any(|source| source.contains(expected.as_str())))
		.count();

	hits as f64 / expected.len() as f64
}

/// Case-insensitive fraction of keywords present in the text. Zero when no keywords are given.
pub fn keyword_fraction(keywords: &[String], text: &str) -> f64 {
	if keywords.is_empty() {
		return 0.0;
	}

	let text = text.to_lowercase();
	let hits = keywords.iter().filter(|keyword| text.contains(&keyword.to_lowercase())).count();

	hits as f64 / keywords.len() as f64
}

/// Sources that mention any banned identifier, each listed once.
pub fn contaminated_sources(sources: &[String], banned: &[String]) -> Vec<String> {
	sources
		.iter()
		.filter(|source| banned.iter().any(|id| redaction::mentions_identifier(source, id)))
		.cloned()
		.collect()
}

pub fn purity_score(contaminated: usize, retrieved: usize) -> f64 {
	if retrieved == 0 {
		return 1.0;
	}

	1.0 - contaminated as f64 / retrieved as f64
}

pub fn answer_contamination(answer: &str, banned: &[String]) -> Vec<String> {
	banned.iter().filter(|id| redaction::mentions_identifier(answer, id)).cloned().collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
	items.iter().map(|item| item.to_string()).collect()
}

fn mean(scores: &[f32]) -> f64 {
	if scores.is_empty() {
		return 0.0;
	}

	scores.iter().map(|score| f64::from(*score)).sum::<f64>() / scores.len() as f64
}

fn summarize(reports: &[CaseReport]) -> EvalSummary {
	let count = reports.len().max(1) as f64;
	let avg = |metric: fn(&CaseReport) -> f64| reports.iter().map(metric).sum::<f64>() / count;
	let rate = |flag: fn(&CaseReport) -> bool| {
		reports.iter().filter(|report| flag(report)).count() as f64 / count
	};

	EvalSummary {
		case_count: reports.len(),
		avg_source_recall: avg(|r| r.source_recall),
		avg_content_relevance: avg(|r| r.content_relevance),
		avg_retrieval_score: avg(|r| r.mean_retrieval_score),
		avg_answer_faithfulness: avg(|r| r.answer_faithfulness),
		avg_purity_score: avg(|r| r.purity_score),
		contamination_rate: rate(|r| r.cross_contamination),
		answer_contamination_rate: rate(|r| !r.answer_contamination.is_empty()),
		raw_answer_contamination_rate: rate(|r| !r.raw_answer_contamination.is_empty()),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn recall_counts_expected_substrings() {
		let sources =
			to_strings(&["s3://kb/frameworks/AI-ADF-013.md", "s3://kb/controls/AI-CTRL-00003.md"]);

		assert_eq!(source_recall(&to_strings(&["AI-ADF-013", "controls/"]), &sources), 1.0);
		assert_eq!(source_recall(&to_strings(&["AI-ADF-013", "AI-ADF-024"]), &sources), 0.5);
		assert_eq!(source_recall(&[], &sources), 0.0);
	}

	#[test]
	fn keyword_fraction_ignores_case() {
		let keywords = to_strings(&["Framework", "Level 3"]);

		assert_eq!(keyword_fraction(&keywords, "the FRAMEWORK list"), 0.5);
		assert_eq!(keyword_fraction(&[], "anything"), 0.0);
	}

	#[test]
	fn purity_is_one_without_sources() {
		assert_eq!(purity_score(0, 0), 1.0);
		assert_eq!(purity_score(1, 4), 0.75);
	}

	#[test]
	fn contaminated_sources_are_listed_once() {
		let sources = to_strings(&[
			"s3://kb/frameworks/AI-ADF-013.md",
			"s3://kb/compare/AI-ADF-024-vs-AI-ADF-016.md",
		]);
		let banned = to_strings(&["AI-ADF-024", "AI-ADF-016"]);

		assert_eq!(
			contaminated_sources(&sources, &banned),
			to_strings(&["s3://kb/compare/AI-ADF-024-vs-AI-ADF-016.md"])
		);
	}

	#[test]
	fn answer_contamination_lists_leaked_identifiers() {
		let banned = to_strings(&["AI-ADF-024", "AI-ADF-015"]);

		assert_eq!(
			answer_contamination("See ai-adf-024 for details.", &banned),
			to_strings(&["AI-ADF-024"])
		);
	}

	#[test]
	fn dataset_cases_accept_original_field_names() {
		let dataset: EvalDataset = serde_json::from_str(
			r#"{ "cases": [{ "query": "q", "must_contain": ["x"], "must_not_contain_sources": ["y"] }] }"#,
		)
		.expect("Failed to parse dataset.");

		assert_eq!(dataset.cases[0].must_contain_keywords, to_strings(&["x"]));
		assert_eq!(dataset.cases[0].must_not_contain_identifiers, to_strings(&["y"]));
		assert!(dataset.cases[0].expected_sources.is_empty());
	}

	#[test]
	fn default_battery_has_five_cases() {
		assert_eq!(default_cases().len(), 5);
	}
}
