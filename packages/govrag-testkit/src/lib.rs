mod corpus;

pub use corpus::{fixture_passages, passage};

use std::sync::{
	Arc, Mutex,
	atomic::{AtomicUsize, Ordering},
};

use govrag_config::{Config, KnowledgeBaseConfig, LlmProviderConfig};
use govrag_providers::{
	BoxFuture, Error, GenerationProvider, GenerationRequest, KnowledgeBaseProvider, Passage,
	Result, RetrieveRequest,
};

/// In-memory knowledge base that applies the real filter to passage metadata.
///
/// Passages are returned in insertion order, so callers control the ranking.
#[derive(Clone, Default)]
pub struct FakeKnowledgeBase {
	passages: Vec<Passage>,
	calls: Arc<AtomicUsize>,
	requests: Arc<Mutex<Vec<RetrieveRequest>>>,
}
impl FakeKnowledgeBase {
	pub fn new(passages: Vec<Passage>) -> Self {
		Self { passages, ..Default::default() }
	}

	pub fn with_fixtures() -> Self {
		Self::new(fixture_passages())
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn requests(&self) -> Vec<RetrieveRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl KnowledgeBaseProvider for FakeKnowledgeBase {
	fn retrieve<'a>(
		&'a self,
		_: &'a KnowledgeBaseConfig,
		request: &'a RetrieveRequest,
	) -> BoxFuture<'a, Result<Vec<Passage>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let passages = self
			.passages
			.iter()
			.filter(|passage| {
				request.filter.as_ref().is_none_or(|filter| filter.matches(&passage.metadata))
			})
			.take(request.top_k as usize)
			.cloned()
			.collect();

		Box::pin(async move { Ok(passages) })
	}
}

#[derive(Clone, Debug)]
pub enum Reply {
	/// Always answers with the same text.
	Fixed(String),
	/// Answers with the user message it was given, context included.
	EchoUser,
}

/// Generator that records every request and counts calls.
#[derive(Clone)]
pub struct SpyGeneration {
	reply: Reply,
	calls: Arc<AtomicUsize>,
	requests: Arc<Mutex<Vec<GenerationRequest>>>,
}
impl SpyGeneration {
	pub fn new(reply: Reply) -> Self {
		Self { reply, calls: Arc::new(AtomicUsize::new(0)), requests: Arc::default() }
	}

	pub fn fixed(text: &str) -> Self {
		Self::new(Reply::Fixed(text.to_string()))
	}

	pub fn echo() -> Self {
		Self::new(Reply::EchoUser)
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn requests(&self) -> Vec<GenerationRequest> {
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}
impl GenerationProvider for SpyGeneration {
	fn generate<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		request: &'a GenerationRequest,
	) -> BoxFuture<'a, Result<String>> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		self.requests.lock().unwrap_or_else(|err| err.into_inner()).push(request.clone());

		let text = match &self.reply {
			Reply::Fixed(text) => text.clone(),
			Reply::EchoUser => request.user.clone(),
		};

		Box::pin(async move { Ok(text) })
	}
}

/// Provider that fails every call with the given message.
#[derive(Clone)]
pub struct FailingProvider {
	message: String,
}
impl FailingProvider {
	pub fn new(message: &str) -> Self {
		Self { message: message.to_string() }
	}

	fn error(&self) -> Error {
		Error::InvalidResponse { message: self.message.clone() }
	}
}
impl KnowledgeBaseProvider for FailingProvider {
	fn retrieve<'a>(
		&'a self,
		_: &'a KnowledgeBaseConfig,
		_: &'a RetrieveRequest,
	) -> BoxFuture<'a, Result<Vec<Passage>>> {
		let err = self.error();

		Box::pin(async move { Err(err) })
	}
}
impl GenerationProvider for FailingProvider {
	fn generate<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		_: &'a GenerationRequest,
	) -> BoxFuture<'a, Result<String>> {
		let err = self.error();

		Box::pin(async move { Err(err) })
	}
}

/// A config that passes validation and points nowhere.
pub fn test_config() -> Config {
	let mut cfg = Config::default();

	cfg.knowledge_base.knowledge_base_id = "KBTEST0001".to_string();
	cfg.knowledge_base.api_base = "http://127.0.0.1:9".to_string();
	cfg.providers.generation.api_key = "test-key".to_string();
	cfg.providers.generation.api_base = "http://127.0.0.1:9".to_string();

	cfg
}
