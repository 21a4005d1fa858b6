use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};
use govrag_config::KnowledgeBaseConfig;
use govrag_domain::RetrievalFilter;

const UNKNOWN_SOURCE: &str = "N/A";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
	/// Lexical and vector matching in one ranked list.
	Hybrid,
	Semantic,
}
impl SearchMode {
	pub fn parse(raw: &str) -> Option<Self> {
		match raw.trim().to_ascii_lowercase().as_str() {
			"hybrid" => Some(Self::Hybrid),
			"semantic" => Some(Self::Semantic),
			_ => None,
		}
	}

	fn as_override(self) -> &'static str {
		match self {
			Self::Hybrid => "HYBRID",
			Self::Semantic => "SEMANTIC",
		}
	}
}

#[derive(Clone, Debug)]
pub struct RetrieveRequest {
	pub query: String,
	pub top_k: u32,
	pub search_mode: SearchMode,
	pub filter: Option<RetrievalFilter>,
}

/// One ranked unit of retrieved text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
	pub content: String,
	pub score: f32,
	/// Opaque locator, usually an object-store URI.
	pub source: String,
	#[serde(default)]
	pub metadata: Map<String, Value>,
}

pub async fn retrieve(
	cfg: &KnowledgeBaseConfig,
	request: &RetrieveRequest,
) -> Result<Vec<Passage>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}/knowledgebases/{}/retrieve", cfg.api_base, cfg.knowledge_base_id);
	let body = request_body(request);
	let res = client
		.post(&url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let passages = parse_retrieve_response(json)?;

	tracing::debug!(
		top_k = request.top_k,
		filtered = request.filter.is_some(),
		passages = passages.len(),
		"Knowledge base responded."
	);

	Ok(passages)
}

fn request_body(request: &RetrieveRequest) -> Value {
	let mut vector_search = serde_json::json!({
		"numberOfResults": request.top_k,
		"overrideSearchType": request.search_mode.as_override(),
	});

	if let (Some(filter), Some(obj)) = (&request.filter, vector_search.as_object_mut()) {
		obj.insert("filter".to_string(), filter.to_value());
	}

	serde_json::json!({
		"retrievalQuery": { "text": request.query },
		"retrievalConfiguration": { "vectorSearchConfiguration": vector_search },
	})
}

fn parse_retrieve_response(json: Value) -> Result<Vec<Passage>> {
	let results = json.get("retrievalResults").and_then(Value::as_array).ok_or_else(|| {
		Error::InvalidResponse {
			message: "Retrieve response is missing retrievalResults.".to_string(),
		}
	})?;
	let mut passages = Vec::with_capacity(results.len());

	for result in results {
		let content = result
			.get("content")
			.and_then(|content| content.get("text"))
			.and_then(Value::as_str)
			.ok_or_else(|| Error::InvalidResponse {
				message: "Retrieve result is missing content text.".to_string(),
			})?;
		let score = result.get("score").and_then(Value::as_f64).unwrap_or(0.0) as f32;
		let metadata =
			result.get("metadata").and_then(Value::as_object).cloned().unwrap_or_default();

		passages.push(Passage {
			content: content.to_string(),
			score,
			source: parse_source(result.get("location")),
			metadata,
		});
	}

	Ok(passages)
}

fn parse_source(location: Option<&Value>) -> String {
	let Some(location) = location.and_then(Value::as_object) else {
		return UNKNOWN_SOURCE.to_string();
	};

	if let Some(uri) = location
		.get("s3Location")
		.and_then(|s3| s3.get("uri"))
		.and_then(Value::as_str)
	{
		return uri.to_string();
	}

	location
		.values()
		.filter_map(Value::as_object)
		.find_map(|inner| inner.get("uri").or_else(|| inner.get("url")).and_then(Value::as_str))
		.unwrap_or(UNKNOWN_SOURCE)
		.to_string()
}

#[cfg(test)]
mod tests {
	use super::{RetrieveRequest, SearchMode, parse_retrieve_response, request_body};
	use govrag_domain::{Identifier, RetrievalFilter};

	#[test]
	fn body_carries_hybrid_mode_and_filter() {
		let request = RetrieveRequest {
			query: "List controls attached to AI-ADF-013".to_string(),
			top_k: 5,
			search_mode: SearchMode::Hybrid,
			filter: Some(RetrievalFilter::for_identifier(&Identifier::Framework(
				"AI-ADF-013".to_string(),
			))),
		};
		let body = request_body(&request);
		let vector = &body["retrievalConfiguration"]["vectorSearchConfiguration"];

		assert_eq!(body["retrievalQuery"]["text"], "List controls attached to AI-ADF-013");
		assert_eq!(vector["numberOfResults"], 5);
		assert_eq!(vector["overrideSearchType"], "HYBRID");
		assert_eq!(vector["filter"]["orAll"][0]["equals"]["key"], "frameworkId");
	}

	#[test]
	fn body_omits_filter_when_absent() {
		let request = RetrieveRequest {
			query: "What frameworks are available?".to_string(),
			top_k: 3,
			search_mode: SearchMode::Semantic,
			filter: None,
		};
		let body = request_body(&request);
		let vector = &body["retrievalConfiguration"]["vectorSearchConfiguration"];

		assert_eq!(vector["overrideSearchType"], "SEMANTIC");
		assert!(vector.get("filter").is_none());
	}

	#[test]
	fn parses_results_in_service_order() {
		let json = serde_json::json!({
			"retrievalResults": [
				{
					"content": { "text": "Framework AI-ADF-013 overview" },
					"score": 0.42,
					"location": { "s3Location": { "uri": "s3://kb/frameworks/AI-ADF-013.md" } },
					"metadata": { "frameworkId": "AI-ADF-013" }
				},
				{
					"content": { "text": "Higher score listed second" },
					"score": 0.91,
					"location": { "webLocation": { "url": "https://example.test/doc" } }
				},
				{ "content": { "text": "No location" } }
			]
		});
		let passages = parse_retrieve_response(json).expect("parse failed");

		assert_eq!(passages.len(), 3);
		assert_eq!(passages[0].source, "s3://kb/frameworks/AI-ADF-013.md");
		assert_eq!(passages[0].metadata["frameworkId"], "AI-ADF-013");
		assert!((passages[1].score - 0.91).abs() < 1e-6);
		assert_eq!(passages[1].source, "https://example.test/doc");
		assert_eq!(passages[2].source, "N/A");
		assert_eq!(passages[2].score, 0.0);
	}

	#[test]
	fn empty_results_are_not_an_error() {
		let passages = parse_retrieve_response(serde_json::json!({ "retrievalResults": [] }))
			.expect("parse failed");

		assert!(passages.is_empty());
	}

	#[test]
	fn missing_results_field_is_invalid() {
		assert!(parse_retrieve_response(serde_json::json!({ "message": "denied" })).is_err());
	}
}
