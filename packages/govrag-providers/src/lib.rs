pub mod error;
pub mod generation;
pub mod knowledge_base;

pub use error::{Error, Result};
pub use generation::GenerationRequest;
pub use knowledge_base::{Passage, RetrieveRequest, SearchMode};

use std::{future::Future, pin::Pin};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName};
use serde_json::{Map, Value};

use govrag_config::{KnowledgeBaseConfig, LlmProviderConfig};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Ranked passage search against the external knowledge base.
pub trait KnowledgeBaseProvider
where
	Self: Send + Sync,
{
	fn retrieve<'a>(
		&'a self,
		cfg: &'a KnowledgeBaseConfig,
		request: &'a RetrieveRequest,
	) -> BoxFuture<'a, Result<Vec<Passage>>>;
}

/// Single-turn text generation. Used for both digests and answers.
pub trait GenerationProvider
where
	Self: Send + Sync,
{
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a GenerationRequest,
	) -> BoxFuture<'a, Result<String>>;
}

/// HTTP-backed implementation of every provider trait.
pub struct DefaultProviders;
impl KnowledgeBaseProvider for DefaultProviders {
	fn retrieve<'a>(
		&'a self,
		cfg: &'a KnowledgeBaseConfig,
		request: &'a RetrieveRequest,
	) -> BoxFuture<'a, Result<Vec<Passage>>> {
		Box::pin(knowledge_base::retrieve(cfg, request))
	}
}
impl GenerationProvider for DefaultProviders {
	fn generate<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		request: &'a GenerationRequest,
	) -> BoxFuture<'a, Result<String>> {
		Box::pin(generation::generate(cfg, request))
	}
}

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	if !api_key.is_empty() {
		headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);
	}

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}
