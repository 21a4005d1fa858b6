use serde::Serialize;

use crate::{Error, GovragService, Result};
use govrag_domain::{Identifier, redaction};
use govrag_providers::{GenerationRequest, Passage};

pub const NO_RELEVANT_INFORMATION: &str = "No relevant information found in the knowledge base.";

const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";
const ANSWER_SYSTEM_PROMPT: &str = "\
You answer questions about AI governance frameworks, controls, and use case assessments.
Rules:
- Answer only from the supplied context. If the context does not contain the answer, say so clearly instead of guessing.
- Never write internal identifiers (framework ids, control ids, inventory ids, issue keys). Name each item by its title or purpose instead.
- Whenever you discuss work stories, present each story together with its gaps and sub-tasks.
- Keep names, numeric values, and dates exactly as they appear in the context.";

pub struct AnswerRequest<'a> {
	pub query: &'a str,
	/// Every retrieved passage, in ranked order.
	pub passages: &'a [Passage],
	/// Digest of the top passage. When present, only the top passage counts as used.
	pub digest: Option<&'a str>,
	pub identifier: Option<&'a Identifier>,
	pub answer_tokens: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenerationResult {
	pub answer: String,
	pub sources_used: Vec<String>,
	/// Scores of every retrieved passage, used or not.
	pub retrieval_scores: Vec<f32>,
	pub mean_score: f32,
	pub source_match: bool,
	pub chunks_used: usize,
	/// Generator output before redaction. Never serialized into user-facing responses.
	#[serde(skip)]
	pub raw_answer: String,
}
impl GenerationResult {
	pub fn no_relevant_information() -> Self {
		Self {
			answer: NO_RELEVANT_INFORMATION.to_string(),
			sources_used: Vec::new(),
			retrieval_scores: Vec::new(),
			mean_score: 0.0,
			source_match: true,
			chunks_used: 0,
			raw_answer: NO_RELEVANT_INFORMATION.to_string(),
		}
	}
}

impl GovragService {
	pub async fn generate_answer(&self, req: AnswerRequest<'_>) -> Result<GenerationResult> {
		let Some(top) = req.passages.first() else {
			tracing::info!("No passages retrieved. Skipping generation.");

			return Ok(GenerationResult::no_relevant_information());
		};

		if req.answer_tokens == 0 {
			return Err(Error::InvalidRequest {
				message: "answer_tokens must be greater than zero.".to_string(),
			});
		}

		let used = match req.digest {
			Some(_) => std::slice::from_ref(top),
			None => req.passages,
		};
		let context = match req.digest {
			Some(digest) => label_passage(&top.source, digest),
			None => build_context(used),
		};
		let request = GenerationRequest {
			system: ANSWER_SYSTEM_PROMPT.to_string(),
			user: format!("Context:\n{context}\n\nQuestion: {}", req.query),
			temperature: self.cfg.generation.answer_temperature,
			max_tokens: req.answer_tokens,
		};
		let raw = self
			.providers
			.generation
			.generate(&self.cfg.providers.generation, &request)
			.await
			.map_err(|err| {
				tracing::warn!(error = %err, "Answer generation failed.");

				Error::generation(err)
			})?;
		let raw_answer = raw.trim().to_string();
		let sources_used: Vec<String> = used.iter().map(|passage| passage.source.clone()).collect();
		let source_match = source_match(&sources_used, req.identifier);

		Ok(GenerationResult {
			answer: redaction::redact_identifiers(&raw_answer),
			retrieval_scores: req.passages.iter().map(|passage| passage.score).collect(),
			mean_score: mean_score(used),
			source_match,
			chunks_used: used.len(),
			sources_used,
			raw_answer,
		})
	}
}

/// Labels every passage with its source and joins them in ranked order.
pub fn build_context(passages: &[Passage]) -> String {
	passages
		.iter()
		.map(|passage| label_passage(&passage.source, &passage.content))
		.collect::<Vec<_>>()
		.join(CONTEXT_SEPARATOR)
}

/// True when every used source mentions the identifier. Vacuously true without one.
pub fn source_match(sources: &[String], identifier: Option<&Identifier>) -> bool {
	let Some(identifier) = identifier else {
		return true;
	};

	sources.iter().all(|source| redaction::mentions_identifier(source, identifier.as_str()))
}

fn label_passage(source: &str, text: &str) -> String {
	format!("[Source: {source}]\n{text}")
}

fn mean_score(passages: &[Passage]) -> f32 {
	if passages.is_empty() {
		return 0.0;
	}

	passages.iter().map(|passage| passage.score).sum::<f32>() / passages.len() as f32
}
