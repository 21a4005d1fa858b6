use serde::Serialize;

use crate::{Error, GovragService, Result};
use govrag_domain::{Identifier, RetrievalFilter, filter, identifier};
use govrag_providers::{Passage, RetrieveRequest, SearchMode};

#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
	pub query: String,
	/// Falls back to `search.top_k`.
	pub top_k: Option<u32>,
	/// Falls back to `search.identifier_filter`.
	pub identifier_filter: Option<bool>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SearchResponse {
	pub identifier: Option<Identifier>,
	pub filter: Option<RetrievalFilter>,
	pub passages: Vec<Passage>,
}

impl GovragService {
	/// Runs one knowledge-base search. The service's ranking is returned as is.
	pub async fn retrieve(
		&self,
		query: &str,
		top_k: u32,
		filter: Option<&RetrievalFilter>,
	) -> Result<Vec<Passage>> {
		let query = query.trim();

		if query.is_empty() {
			return Err(Error::InvalidRequest { message: "query must be non-empty.".to_string() });
		}
		if top_k == 0 {
			return Err(Error::InvalidRequest {
				message: "top_k must be greater than zero.".to_string(),
			});
		}

		let request = RetrieveRequest {
			query: query.to_string(),
			top_k,
			search_mode: SearchMode::parse(&self.cfg.search.search_mode)
				.unwrap_or(SearchMode::Hybrid),
			filter: filter.cloned(),
		};
		let mut passages = self
			.providers
			.knowledge_base
			.retrieve(&self.cfg.knowledge_base, &request)
			.await
			.map_err(|err| {
				tracing::warn!(error = %err, "Knowledge base retrieval failed.");

				Error::retrieval(err)
			})?;

		passages.truncate(top_k as usize);

		tracing::info!(top_k, passages = passages.len(), "Knowledge base retrieval completed.");

		Ok(passages)
	}

	/// Extracts an identifier, narrows the search to it and retrieves without generating.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let top_k = req.top_k.unwrap_or(self.cfg.search.top_k);
		let use_filter = req.identifier_filter.unwrap_or(self.cfg.search.identifier_filter);
		let identifier = identifier::extract(&req.query);
		let filter = if use_filter { filter::build(identifier.as_ref()) } else { None };

		tracing::debug!(
			identifier = identifier.as_ref().map(Identifier::as_str),
			filter_applied = filter.is_some(),
			"Resolved retrieval filter."
		);

		let passages = self.retrieve(&req.query, top_k, filter.as_ref()).await?;

		Ok(SearchResponse { identifier, filter, passages })
	}
}
