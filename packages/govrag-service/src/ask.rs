use serde::Serialize;

use crate::{AnswerRequest, GenerationResult, GovragService, Result, SearchRequest};
use govrag_domain::{Identifier, TokenBudget, intent};
use govrag_providers::Passage;

#[derive(Clone, Debug, Default)]
pub struct AskRequest {
	pub query: String,
	pub top_k: Option<u32>,
	pub identifier_filter: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AskResponse {
	pub identifier: Option<Identifier>,
	pub filter_applied: bool,
	pub budget: TokenBudget,
	pub large_document: bool,
	pub result: GenerationResult,
	/// Everything the retriever returned, in ranked order.
	pub passages: Vec<Passage>,
}

impl GovragService {
	/// Runs the full pipeline: extract, filter, retrieve, optionally digest, then answer.
	pub async fn ask(&self, req: AskRequest) -> Result<AskResponse> {
		let search = self
			.search(SearchRequest {
				query: req.query.clone(),
				top_k: req.top_k,
				identifier_filter: req.identifier_filter,
			})
			.await?;
		let intent = intent::classify(&req.query);
		let large_document = intent.large_document && !search.passages.is_empty();

		tracing::info!(
			large_document,
			summary_tokens = intent.budget.summary_tokens,
			answer_tokens = intent.budget.answer_tokens,
			"Classified query intent."
		);

		let digest = match search.passages.first() {
			Some(top) if large_document => {
				Some(self.summarize(&top.content, &req.query, intent.budget.summary_tokens).await?)
			},
			_ => None,
		};
		let result = self
			.generate_answer(AnswerRequest {
				query: &req.query,
				passages: &search.passages,
				digest: digest.as_deref(),
				identifier: search.identifier.as_ref(),
				answer_tokens: intent.budget.answer_tokens,
			})
			.await?;

		if !result.source_match {
			tracing::warn!(
				identifier = search.identifier.as_ref().map(Identifier::as_str),
				sources = ?result.sources_used,
				"Answer used sources that do not mention the requested identifier."
			);
		}

		Ok(AskResponse {
			identifier: search.identifier,
			filter_applied: search.filter.is_some(),
			budget: intent.budget,
			large_document,
			result,
			passages: search.passages,
		})
	}
}
